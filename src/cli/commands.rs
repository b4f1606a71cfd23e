use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "danabot")]
#[command(author, version, about = "Trợ lý du lịch và thời tiết cho Đà Nẵng - Hội An", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question
    Ask { query: String },

    /// Start an interactive chat session
    Interactive,

    /// List the locations the assistant serves
    Locations,
}

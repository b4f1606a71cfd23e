use anyhow::Result;
use clap::Parser;
use danabot::cli::{Cli, Commands};
use danabot::policy::location::{Location, LOCATION_ALIASES};
use danabot::{ask, init_with, utils, Settings};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ask { query } => {
            init_with(settings).await?;
            handle_ask(query).await
        }
        Commands::Interactive => {
            init_with(settings).await?;
            handle_interactive().await
        }
        // Static output; no provider clients needed.
        Commands::Locations => handle_locations(),
    }
}

async fn handle_ask(query: String) -> Result<()> {
    let response = ask(&query).await?;
    println!("\n{}", response);
    Ok(())
}

async fn handle_interactive() -> Result<()> {
    utils::print_header("Danabot - Trợ lý Đà Nẵng & Hội An");
    utils::print_info("Hỏi về thời tiết, khách sạn, ẩm thực, sự kiện... (Ctrl+C để thoát)\n");

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        utils::print_prompt("Bạn: ");
        let mut input = String::new();
        if reader.read_line(&mut input).await? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match ask(input).await {
            Ok(response) => println!("\n{}\n", response),
            Err(e) => utils::print_error(&format!("Lỗi: {}", e)),
        }
    }

    Ok(())
}

fn handle_locations() -> Result<()> {
    utils::print_header("Khu vực được hỗ trợ");
    for location in [Location::DaNang, Location::HoiAn] {
        utils::print_success(&format!("• {}", location.display_name()));
        let aliases: Vec<&str> = LOCATION_ALIASES
            .iter()
            .filter(|(_, l)| *l == location)
            .map(|(alias, _)| *alias)
            .collect();
        utils::print_info(&format!("  cách viết khác: {}", aliases.join(", ")));
    }
    Ok(())
}

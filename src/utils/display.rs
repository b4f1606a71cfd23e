use colored::*;
use std::io::{self, Write};

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    // char count, not byte len: headers carry Vietnamese diacritics
    println!("{}", "=".repeat(text.chars().count()).bright_cyan());
}

pub fn print_success(text: &str) {
    println!("{}", text.green());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

/// Inline prompt; flushed so it shows before the blocking read.
pub fn print_prompt(text: &str) {
    print!("{}", text.yellow().bold());
    let _ = io::stdout().flush();
}

//! Terminal output.

pub mod table;

pub use table::Table;

use crossterm::style::Stylize;

pub fn info(msg: &str) {
    println!("  {msg}");
}

pub fn success(msg: &str) {
    println!("  {} {msg}", "✓".green());
}

pub fn warning(msg: &str) {
    eprintln!("  {} {msg}", "!".yellow().bold());
}

pub fn error(msg: &str) {
    eprintln!("  {} {msg}", "✗".red().bold());
}

pub fn step(n: usize, msg: &str) {
    println!("  {} {msg}", format!("[STEP {n}]").magenta());
}

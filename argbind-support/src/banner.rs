use colored::Colorize;

const TITLE: &str = " * * * dev * * * ";

/// Title printed before a one-time setup command runs.
pub fn title() -> String {
    let rule = "=".repeat(TITLE.len());
    format!("{}\n{}\n{}", rule.red(), TITLE.red().bold(), rule.red())
}

pub fn print_title() {
    println!("{}", title());
}

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io;

/// Operator-facing progress lines. Write errors are ignored.
fn line(color: Color, text: String) {
    let _ = execute!(
        io::stdout(),
        SetForegroundColor(color),
        Print(text),
        Print("\n"),
        ResetColor
    );
}

pub fn banner(title: &str) {
    line(Color::White, title.to_string());
    line(Color::DarkGrey, "=".repeat(title.chars().count()));
}

pub fn step(text: &str) {
    line(Color::White, format!("⏳ {}", text));
}

pub fn detail(text: &str) {
    line(Color::DarkGrey, format!("   {}", text));
}

pub fn success(text: &str) {
    line(Color::Green, format!("✅ {}", text));
}

pub fn warning(text: &str) {
    line(Color::Yellow, format!("⚠ {}", text));
}

pub fn failure(text: &str) {
    line(Color::Red, format!("❌ {}", text));
}

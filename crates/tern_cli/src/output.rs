//! Terminal output helpers with two modes: styled text for humans, structured JSON for machines.
//!
//! Uses:
//! - `console` for colors (respects NO_COLOR, auto-disables when piped)
//! - `comfy-table` for structured data
//! - `indicatif` for progress/spinners
//!
//! The chat session always renders as text; JSON mode only applies to the
//! inspection subcommands.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tern_core::ToolOutcome;

use crate::cli::OutputFormat;

// ── Global format flag ─────────────────────────────────────────────

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(format: OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        JSON_MODE.store(true, Ordering::Relaxed);
    }
}

fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

// ── JSON envelope ──────────────────────────────────────────────────

#[derive(Serialize)]
struct Msg<'a> {
    level: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a JsonValue>,
}

fn emit_json(level: &str, message: &str, data: Option<&JsonValue>) {
    let msg = Msg {
        level,
        message,
        data,
    };
    let json = serde_json::to_string(&msg)
        .unwrap_or_else(|_| format!("{{\"level\":\"{level}\",\"message\":\"{message}\"}}"));
    println!("{json}");
}

// ── Public helpers ─────────────────────────────────────────────────

pub fn header(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).bold().cyan());
    }
}

pub fn success(text: &str) {
    if is_json() {
        emit_json("success", text, None);
    } else {
        println!("{} {}", style("✓").green(), style(text).bright());
    }
}

pub fn error(text: &str) {
    if is_json() {
        let msg = Msg {
            level: "error",
            message: text,
            data: None,
        };
        let json = serde_json::to_string(&msg).unwrap_or_default();
        eprintln!("{json}");
    } else {
        eprintln!("{} {}", style("✗").red(), style(text).bright());
    }
}

pub fn warning(text: &str) {
    if is_json() {
        emit_json("warning", text, None);
    } else {
        println!("{} {}", style("!").yellow(), style(text).bright());
    }
}

pub fn dim(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).dim());
    }
}

pub fn json_pretty(value: &JsonValue) {
    if is_json() {
        emit_json("data", "", Some(value));
    } else {
        let formatted = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        println!("{formatted}");
    }
}

/// Emit an arbitrary serializable value as structured output.
pub fn data<T: Serialize>(label: &str, value: &T) {
    if is_json() {
        let json_val = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        emit_json("data", label, Some(&json_val));
    } else {
        let formatted =
            serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{label}: <?>"));
        println!("{formatted}");
    }
}

/// Print a key-value pair with styled key.
pub fn kv(key: &str, value: &str) {
    if is_json() {
        let data = serde_json::json!({ key: value });
        emit_json("info", key, Some(&data));
    } else {
        println!("  {} {}", style(key).cyan().bold(), value);
    }
}

// ── Tables ─────────────────────────────────────────────────────────

/// Create a styled table for listing items.
pub fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Add a header row to the table.
pub fn table_header(table: &mut Table, col1: &str, col2: &str) {
    table.set_header(vec![
        Cell::new(col1)
            .fg(Color::Cyan)
            .add_attribute(comfy_table::Attribute::Bold),
        Cell::new(col2)
            .fg(Color::Cyan)
            .add_attribute(comfy_table::Attribute::Bold),
    ]);
}

/// Add a row to the table.
pub fn table_row(table: &mut Table, name: &str, desc: &str) {
    table.add_row(vec![Cell::new(name).fg(Color::Green), Cell::new(desc)]);
}

/// Print a table (JSON mode emits items array instead).
pub fn table_print(table: &Table, items: &[(&str, &str)]) {
    if is_json() {
        let items: Vec<_> = items
            .iter()
            .map(|(name, desc)| serde_json::json!({ "name": name, "description": desc }))
            .collect();
        let data = serde_json::json!({ "items": items });
        emit_json("list", "", Some(&data));
    } else {
        println!("{table}");
    }
}

// ── Spinners ───────────────────────────────────────────────────────

/// Create a spinner for async operations.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Finish spinner with success message.
pub fn spinner_success(spinner: &ProgressBar, message: &str) {
    spinner.finish_and_clear();
    success(message);
}

/// Finish spinner with error message.
pub fn spinner_error(spinner: &ProgressBar, message: &str) {
    spinner.finish_and_clear();
    error(message);
}

// ── Chat session ───────────────────────────────────────────────────

fn flush() {
    let _ = std::io::stdout().flush();
}

pub fn banner() {
    println!();
    println!("{}", style("===== tern =====").bold());
    println!("{}", style("Commands:").dim());
    for (command, help) in [
        ("/clear", "Clear chat history"),
        ("/exit", "Exit the interface"),
        ("/help", "Show this help message"),
        ("/save <filename>", "Save conversation to file"),
        ("/load <filename>", "Load conversation from file"),
    ] {
        println!("  {} - {}", style(command).yellow(), help);
    }
    println!("{}", style("================").bold());
    println!();
}

pub fn user_prompt() {
    print!("{} ", style("You:").blue());
    flush();
}

pub fn assistant_label() {
    print!("\n{} ", style("Claude:").green());
    flush();
}

pub fn assistant_text(text: &str) {
    print!("{}", style(text).green());
    flush();
}

pub fn thinking(text: &str) {
    thinking_header();
    println!("{}", style(text).dim());
}

pub fn thinking_header() {
    println!("\n{}", style("[Thinking...]").dim());
}

pub fn thinking_text(text: &str) {
    print!("{}", style(text).dim());
    flush();
}

pub fn tool_use(name: &str, input: &JsonValue) {
    let input = serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string());
    println!("\n{}", style(format!("[Using Tool: {}]", name)).blue());
    println!("{}", style(format!("Input: {}", input)).blue());
}

/// An error hides any output the tool also produced.
pub fn tool_outcome(outcome: &ToolOutcome) {
    if let Some(error) = outcome.error.as_deref().filter(|e| !e.is_empty()) {
        println!("{}", style(format!("[Tool Error] {}", error)).red());
        return;
    }
    if let Some(output) = outcome.output.as_deref().filter(|o| !o.is_empty()) {
        println!("{}", style("[Tool Output]").dim());
        println!("{}", output);
    }
    if outcome.base64_image.is_some() {
        println!(
            "{}",
            style("[Tool Generated Image] (Base64 data not shown)").dim()
        );
    }
}

pub fn api_error(text: &str) {
    println!("\n{}", style(format!("API Error: {}", text)).red());
}

/// A recoverable problem inside the chat loop, e.g. a failed `/save`.
pub fn chat_error(text: &str) {
    println!("{}", style(format!("Error: {}", text)).red());
}

//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use tether_core::ResponseBody;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning to stderr.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a response body as JSON or raw text.
pub fn body(body: &ResponseBody, pretty: bool) -> Result<()> {
    match body {
        ResponseBody::Json(value) if pretty => json_pretty(value),
        ResponseBody::Json(value) => json(value),
        ResponseBody::Text(text) => {
            println!("{}", text);
            Ok(())
        }
    }
}

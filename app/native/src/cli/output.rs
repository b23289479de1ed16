//! CLI output formatting utilities.
//!
//! This module provides utilities for formatting CLI output including:
//! - JSON syntax highlighting
//! - Compact labels for geometry in tables

use colored::Colorize;

use crate::geometry::{Rect, Span};

/// Prints JSON with syntax highlighting.
///
/// Colors:
/// - Keys: Cyan
/// - Strings: Green
/// - Numbers: Yellow
/// - Booleans/Null: Magenta
/// - Brackets/Braces: White (default)
pub fn print_highlighted_json(value: &serde_json::Value) {
    let json_str = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    println!("{}", highlight_json(&json_str));
}

/// Colors a pretty-printed JSON string.
fn highlight_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len() * 2);
    let mut in_string = false;
    let mut is_key = false;
    let mut escape_next = false;
    let mut current_token = String::new();
    let mut after_colon = false;

    for ch in json.chars() {
        if escape_next {
            current_token.push(ch);
            escape_next = false;
            continue;
        }

        if ch == '\\' && in_string {
            current_token.push(ch);
            escape_next = true;
            continue;
        }

        match ch {
            '"' => {
                if in_string {
                    current_token.push(ch);
                    let colored =
                        if is_key { current_token.cyan() } else { current_token.green() };
                    out.push_str(&colored.to_string());
                    current_token.clear();
                    in_string = false;
                    is_key = false;
                } else {
                    flush_token(&mut out, &mut current_token, after_colon);
                    current_token.push(ch);
                    in_string = true;
                    // It's a key if we're not after a colon
                    is_key = !after_colon;
                    after_colon = false;
                }
            }
            ':' if !in_string => {
                flush_token(&mut out, &mut current_token, false);
                out.push_str(&":".white().to_string());
                after_colon = true;
            }
            ',' if !in_string => {
                flush_token(&mut out, &mut current_token, after_colon);
                out.push_str(&",".white().to_string());
                after_colon = false;
            }
            '{' | '}' | '[' | ']' if !in_string => {
                flush_token(&mut out, &mut current_token, after_colon);
                out.push_str(&ch.to_string().white().bold().to_string());
                after_colon = false;
            }
            _ => current_token.push(ch),
        }
    }

    flush_token(&mut out, &mut current_token, after_colon);
    out
}

/// Appends the current token with appropriate coloring.
fn flush_token(out: &mut String, token: &mut String, is_value: bool) {
    if token.is_empty() {
        return;
    }

    if is_value && !token.trim().is_empty() {
        let start = token.find(|c: char| !c.is_whitespace()).unwrap_or(0);
        let end = token.rfind(|c: char| !c.is_whitespace()).map_or(token.len(), |i| i + 1);

        let prefix = &token[..start];
        let value = &token[start..end];
        let suffix = &token[end..];

        if value == "true" || value == "false" || value == "null" {
            out.push_str(&format!("{prefix}{}{suffix}", value.magenta()));
        } else if value.parse::<f64>().is_ok() {
            out.push_str(&format!("{prefix}{}{suffix}", value.yellow()));
        } else {
            out.push_str(token);
        }
    } else {
        out.push_str(token);
    }

    token.clear();
}

/// Formats a boolean as a colored string.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

/// Formats a coordinate without a trailing `.0` for whole pixels.
#[must_use]
pub fn format_px(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e12 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// `start..end`, or `empty`.
#[must_use]
pub fn format_span(span: Span) -> String {
    if span.is_empty() {
        "empty".to_string()
    } else {
        format!("{}..{}", format_px(span.start), format_px(span.end))
    }
}

/// `WxH at (x, y)`.
#[must_use]
pub fn format_rect(rect: &Rect) -> String {
    format!(
        "{}x{} at ({}, {})",
        format_px(rect.width),
        format_px(rect.height),
        format_px(rect.x),
        format_px(rect.y)
    )
}

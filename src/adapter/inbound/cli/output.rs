//! Terminal output for CLI handlers.
//!
//! Every line goes through one of three modes: styled text for people, one
//! JSON object per line under `--json`, or nothing under `--quiet`. Errors and
//! warnings ignore `--quiet`.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::{OwoColorize, Stream};
use serde_json::{json, Value};

/// Global flags that shape CLI output.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// One JSON object per line instead of styled text.
    pub json: bool,
    pub quiet: bool,
    /// Count of `-v` flags.
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn cell() -> &'static RwLock<OutputConfig> {
    CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn current() -> OutputConfig {
    *cell().read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Install the flags parsed from the command line.
pub fn configure(config: OutputConfig) {
    *cell()
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner) = config;
}

/// Force colors on or off; `None` restores terminal detection.
pub fn set_color_override(enabled: Option<bool>) {
    match enabled {
        Some(enabled) => owo_colors::set_override(enabled),
        None => owo_colors::unset_override(),
    }
}

#[must_use]
pub fn is_json() -> bool {
    current().json
}

#[must_use]
pub fn is_quiet() -> bool {
    current().quiet
}

#[must_use]
pub fn verbosity() -> u8 {
    current().verbose
}

/// Route one line: JSON as `{"type", "payload"}`, otherwise `text` unless
/// suppressed by `--quiet`.
fn emit(kind: &str, payload: impl FnOnce() -> Value, text: impl FnOnce(), always: bool) {
    let config = current();
    if config.json {
        println!("{}", json!({ "type": kind, "payload": payload() }));
    } else if always || !config.quiet {
        text();
    }
}

/// Application name and version.
pub fn header(version: &str) {
    emit(
        "header",
        || json!({ "app": "modelplane", "version": version }),
        || {
            println!(
                "{} {}",
                "modelplane".if_supports_color(Stream::Stdout, |t| t.bold()),
                version.if_supports_color(Stream::Stdout, |t| t.dimmed())
            );
            println!();
        },
        false,
    );
}

/// Aligned `label  value` line.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit(
        "field",
        || json!({ "label": label, "value": value }),
        || {
            let label = format!("{label:<14}");
            println!(
                "  {} {value}",
                label.if_supports_color(Stream::Stdout, |t| t.dimmed())
            );
        },
        false,
    );
}

pub fn section(title: &str) {
    emit(
        "section",
        || json!({ "title": title }),
        || {
            println!();
            println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
        },
        false,
    );
}

pub fn success(message: &str) {
    emit(
        "success",
        || json!({ "message": message }),
        || {
            println!(
                "  {} {message}",
                "✓".if_supports_color(Stream::Stdout, |t| t.green())
            );
        },
        false,
    );
}

pub fn warning(message: &str) {
    emit(
        "warning",
        || json!({ "message": message }),
        || {
            println!(
                "  {} {message}",
                "⚠".if_supports_color(Stream::Stdout, |t| t.yellow())
            );
        },
        true,
    );
}

/// Error line on stderr, in both modes.
pub fn error(message: &str) {
    if is_json() {
        eprintln!(
            "{}",
            json!({ "type": "error", "payload": { "message": message } })
        );
    } else {
        eprintln!(
            "  {} {message}",
            "×".if_supports_color(Stream::Stderr, |t| t.red())
        );
    }
}

pub fn note(message: &str) {
    emit(
        "note",
        || json!({ "message": message }),
        || println!("  {}", message.if_supports_color(Stream::Stdout, |t| t.dimmed())),
        false,
    );
}

pub fn hint(message: &str) {
    emit(
        "hint",
        || json!({ "message": message }),
        || {
            println!(
                "  {}: {}",
                "hint".if_supports_color(Stream::Stdout, |t| t.cyan()),
                message.if_supports_color(Stream::Stdout, |t| t.dimmed())
            );
        },
        false,
    );
}

/// Print a complete JSON document, for commands with their own schema.
pub fn json_output(value: Value) {
    println!("{value}");
}

fn styled(value: impl Display, style: fn(&String) -> String) -> String {
    let value = value.to_string();
    if is_json() {
        value
    } else {
        style(&value)
    }
}

pub fn positive(value: impl Display) -> String {
    styled(value, |v| {
        v.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    })
}

pub fn negative(value: impl Display) -> String {
    styled(value, |v| {
        v.if_supports_color(Stream::Stdout, |t| t.red())
            .to_string()
    })
}

pub fn muted(value: impl Display) -> String {
    styled(value, |v| {
        v.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    })
}

fn padded<'a>(cells: impl IntoIterator<Item = (&'a str, usize)>) -> String {
    let mut line = String::from("  ");
    for (cell, width) in cells {
        line.push_str(&format!("{cell:<width$} "));
    }
    line
}

pub fn table_header(columns: &[(&str, usize)]) {
    emit(
        "table_header",
        || json!({ "columns": columns.iter().map(|(name, _)| *name).collect::<Vec<_>>() }),
        || {
            let line = padded(columns.iter().copied());
            println!("{}", line.if_supports_color(Stream::Stdout, |t| t.dimmed()));
        },
        false,
    );
}

/// Rule under a table header; text mode only.
pub fn table_separator(widths: &[usize]) {
    let config = current();
    if config.json || config.quiet {
        return;
    }
    let rules: Vec<String> = widths.iter().map(|width| "─".repeat(*width)).collect();
    let line = padded(rules.iter().map(String::as_str).zip(widths.iter().copied()));
    println!("{}", line.if_supports_color(Stream::Stdout, |t| t.dimmed()));
}

pub fn table_row(cells: &[String], widths: &[usize]) {
    emit(
        "table_row",
        || json!({ "cells": cells }),
        || println!("{}", padded(cells.iter().map(String::as_str).zip(widths.iter().copied()))),
        false,
    );
}

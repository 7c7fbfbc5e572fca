use chrono::Local;
use colored::*;
use serde::Serialize;
use std::io::{self, Write};
#[cfg(test)]
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
    Debug,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Error => "ERROR",
            Level::Debug => "DEBUG",
        }
    }
}

/// Sink for progress and failure messages.
///
/// Components receive a `&dyn Diagnostics` instead of writing to a global
/// logger so tests can capture what was reported.
pub trait Diagnostics {
    fn emit(&self, level: Level, code: &str, message: &str);

    fn info(&self, code: &str, message: &str) {
        self.emit(Level::Info, code, message);
    }

    fn error(&self, code: &str, message: &str) {
        self.emit(Level::Error, code, message);
    }

    fn debug(&self, code: &str, message: &str) {
        self.emit(Level::Debug, code, message);
    }
}

#[derive(Serialize)]
struct Event<'a> {
    timestamp: &'a str,
    level: &'a str,
    code: &'a str,
    message: &'a str,
}

/// Writes `<timestamp> - <LEVEL> - <message>` lines (or JSON events) to stderr.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub format: OutputFormat,
    pub color: bool,
    pub debug: bool,
}

impl Terminal {
    pub fn new(format: OutputFormat, color: bool, debug: bool) -> Self {
        Self {
            format,
            color,
            debug,
        }
    }

    fn render(&self, level: Level, code: &str, message: &str) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S,%3f").to_string();
        match self.format {
            OutputFormat::Text => format_line(
                &timestamp,
                &colorize(level, level.as_str(), self.color),
                message,
            ),
            OutputFormat::Json => {
                let ev = Event {
                    timestamp: &timestamp,
                    level: level.as_str(),
                    code,
                    message,
                };
                // Serializing plain string fields cannot fail; keep the line anyway if it does.
                serde_json::to_string(&ev)
                    .unwrap_or_else(|_| format_line(&timestamp, level.as_str(), message))
            }
        }
    }
}

impl Diagnostics for Terminal {
    fn emit(&self, level: Level, code: &str, message: &str) {
        if level == Level::Debug && !self.debug {
            return;
        }
        let line = self.render(level, code, message);
        let _ = writeln!(io::stderr().lock(), "{}", line);
    }
}

fn format_line(timestamp: &str, level: &str, message: &str) -> String {
    format!("{} - {} - {}", timestamp, level, message)
}

fn colorize(level: Level, s: &str, enable: bool) -> String {
    if !enable {
        return s.to_string();
    }
    match level {
        Level::Info => s.normal().to_string(),
        Level::Error => s.red().bold().to_string(),
        Level::Debug => s.cyan().to_string(),
    }
}

/// In-memory sink used by tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<(Level, String, String)>>,
}

#[cfg(test)]
impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Level, String, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(l, _, _)| *l == level)
            .map(|(_, _, message)| message)
            .collect()
    }

    pub fn contains(&self, level: Level, message: &str) -> bool {
        self.messages(level).iter().any(|m| m == message)
    }
}

#[cfg(test)]
impl Diagnostics for Recorder {
    fn emit(&self, level: Level, code: &str, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((level, code.to_string(), message.to_string()));
        }
    }
}

pub mod prelude {
    pub use super::{Diagnostics, OutputFormat, Terminal};
}

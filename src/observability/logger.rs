//! Structured JSON logger
//!
//! One event per line: `{"event":..,"severity":..,<fields sorted by key>}`.
//! INFO and below go to stdout, WARN and above to stderr. Writes are
//! synchronous and unbuffered.

use std::fmt;
use std::io::{self, Write};

use super::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Logger;

impl Logger {
    pub fn log(severity: Severity, event: Event, fields: &[(&str, &str)]) {
        let line = Self::format_line(severity, event, fields);
        if severity >= Severity::Warn {
            Self::emit(&mut io::stderr(), &line);
        } else {
            Self::emit(&mut io::stdout(), &line);
        }
    }

    pub fn trace(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }

    pub fn fatal(event: Event, fields: &[(&str, &str)]) {
        Self::log(Severity::Fatal, event, fields);
    }

    /// Builds the log line, newline included.
    pub fn format_line(severity: Severity, event: Event, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        let mut line = String::with_capacity(128);
        line.push_str("{\"event\":");
        push_json_str(&mut line, event.as_str());
        line.push_str(",\"severity\":");
        push_json_str(&mut line, severity.as_str());

        for (key, value) in sorted {
            line.push(',');
            push_json_str(&mut line, key);
            line.push(':');
            push_json_str(&mut line, value);
        }

        line.push_str("}\n");
        line
    }

    fn emit<W: Write>(writer: &mut W, line: &str) {
        // Write failures are dropped.
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }
}

fn push_json_str(out: &mut String, s: &str) {
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str("\"\""),
    }
}

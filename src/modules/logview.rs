use std::fmt;

use derive_more::with_trait::Display;
use serde::Deserialize;

use crate::modules::markup::escape_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LogTag {
    #[display("WL")]
    Whitelist,
    #[display("BL")]
    Blacklist,
    #[display("RG")]
    Regular,
}

impl LogTag {
    fn parse(field: &str) -> Option<Self> {
        match field {
            "WL" => Some(LogTag::Whitelist),
            "BL" => Some(LogTag::Blacklist),
            "RG" => Some(LogTag::Regular),
            _ => None,
        }
    }
}

/// One line of the access log. The tag is the field right after the timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    Timestamped { tag: LogTag, line: String },
    Plain(String),
}

impl LogLine {
    pub fn parse(line: &str) -> Self {
        if line.trim().is_empty() {
            return LogLine::Plain(line.to_string());
        }
        match line.split(' ').nth(1).and_then(LogTag::parse) {
            Some(tag) => LogLine::Timestamped {
                tag,
                line: line.to_string(),
            },
            None => LogLine::Plain(line.to_string()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            LogLine::Timestamped { line, .. } | LogLine::Plain(line) => line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    #[default]
    Classified,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogView {
    pub mode: LogMode,
    pub lines: Vec<LogLine>,
}

impl Default for LogView {
    fn default() -> Self {
        Self {
            mode: LogMode::Classified,
            lines: Vec::new(),
        }
    }
}

pub fn render(text: &str, mode: LogMode) -> LogView {
    let lines = match mode {
        LogMode::Classified => text.split('\n').map(LogLine::parse).collect(),
        LogMode::Plain => text.split('\n').map(|l| LogLine::Plain(l.to_string())).collect(),
    };
    LogView { mode, lines }
}

impl LogView {
    pub fn to_html(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line {
                LogLine::Timestamped { tag, line } => {
                    format!(r#"<span class="log-{tag}">{}</span>"#, escape_html(line))
                }
                LogLine::Plain(line) => escape_html(line),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for LogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: Vec<&str> = self.lines.iter().map(LogLine::text).collect();
        write!(f, "{}", text.join("\n"))
    }
}

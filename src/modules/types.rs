use clap::ValueEnum;
use derive_more::with_trait::Display;
use serde::Deserialize;

/// One `domain #note` line of a whitelist or blacklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub domain: String,
    pub note: String,
}

impl ListEntry {
    pub fn new(domain: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            note: note.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Deserialize, ValueEnum)]
#[serde(from = "String")]
pub enum ListStatus {
    #[display("✅")]
    Whitelisted,
    #[display("🚫")]
    Blacklisted,
    #[display("❓")]
    Unknown,
}

impl ListStatus {
    /// CSS class used for the status cell.
    pub fn class(self) -> &'static str {
        match self {
            ListStatus::Whitelisted => "whitelist",
            ListStatus::Blacklisted => "blacklist",
            ListStatus::Unknown => "unknown",
        }
    }
}

// The backend reports status as a glyph. Older builds used ❌ for blacklisted.
impl From<String> for ListStatus {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "✅" | "whitelisted" | "whitelist" => ListStatus::Whitelisted,
            "🚫" | "❌" | "blacklisted" | "blacklist" => ListStatus::Blacklisted,
            _ => ListStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummaryRow {
    pub domain: String,
    pub count: u64,
    pub status: ListStatus,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryData {
    #[serde(default)]
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, ValueEnum)]
pub enum ListKind {
    #[display("whitelist")]
    Whitelist,
    #[display("blacklist")]
    Blacklist,
}

impl ListKind {
    pub fn opposite(self) -> Self {
        match self {
            ListKind::Whitelist => ListKind::Blacklist,
            ListKind::Blacklist => ListKind::Whitelist,
        }
    }
}

/// Destination of a move. `Unknown` removes the domain from both lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Target {
    #[display("whitelist")]
    Whitelist,
    #[display("blacklist")]
    Blacklist,
    #[display("unknown")]
    Unknown,
}

impl From<ListKind> for Target {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Whitelist => Target::Whitelist,
            ListKind::Blacklist => Target::Blacklist,
        }
    }
}

/// Which rows of the summary table are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filters {
    pub show_whitelisted: bool,
    pub show_blacklisted: bool,
    pub show_unknown: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            show_whitelisted: true,
            show_blacklisted: true,
            show_unknown: true,
        }
    }
}

impl Filters {
    pub fn shows(&self, status: ListStatus) -> bool {
        match status {
            ListStatus::Whitelisted => self.show_whitelisted,
            ListStatus::Blacklisted => self.show_blacklisted,
            ListStatus::Unknown => self.show_unknown,
        }
    }

    pub fn toggle(&mut self, status: ListStatus) {
        match status {
            ListStatus::Whitelisted => self.show_whitelisted = !self.show_whitelisted,
            ListStatus::Blacklisted => self.show_blacklisted = !self.show_blacklisted,
            ListStatus::Unknown => self.show_unknown = !self.show_unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, ValueEnum)]
pub enum ClearScope {
    #[display("all")]
    All,
    #[display("whitelist")]
    Whitelist,
    #[display("blacklist")]
    Blacklist,
    #[display("regular")]
    Regular,
}

impl ClearScope {
    pub fn path(self) -> &'static str {
        match self {
            ClearScope::All => "clear-all-logs",
            ClearScope::Whitelist => "clear-whitelist",
            ClearScope::Blacklist => "clear-blacklist",
            ClearScope::Regular => "clear-regular",
        }
    }
}

/// Raw text of both lists as served by `/lists`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Lists {
    #[serde(default)]
    pub whitelist: String,
    #[serde(default)]
    pub blacklist: String,
}

/// Reply to `/move-domain`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoveReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl MoveReply {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Reply to the clear, reload and setpoint endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub setpoint: Option<String>,
}

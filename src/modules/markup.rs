use std::fmt::Write;

use crate::modules::types::{ListKind, Target};

pub const TO_WHITELIST: &str = "👉✅";
pub const TO_BLACKLIST: &str = "👉🚫";
pub const TRASH: &str = "🗑️";

/// What a control does when activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Move from the summary table. The note comes from the page note draft.
    MoveFromSummary { domain: String, to: ListKind },
    /// Move out of a list table, keeping the entry's note.
    MoveFromList {
        domain: String,
        from: ListKind,
        to: ListKind,
        note: String,
    },
    Remove { domain: String, from: ListKind },
}

impl Action {
    pub fn domain(&self) -> &str {
        match self {
            Action::MoveFromSummary { domain, .. }
            | Action::MoveFromList { domain, .. }
            | Action::Remove { domain, .. } => domain,
        }
    }

    pub fn target(&self) -> Target {
        match self {
            Action::MoveFromSummary { to, .. } | Action::MoveFromList { to, .. } => (*to).into(),
            Action::Remove { .. } => Target::Unknown,
        }
    }
}

/// A button in a rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: &'static str,
    pub class: &'static str,
    pub action: Action,
}

impl Control {
    pub fn move_to(to: ListKind, action: Action) -> Self {
        let (label, class) = match to {
            ListKind::Whitelist => (TO_WHITELIST, "action-btn wl"),
            ListKind::Blacklist => (TO_BLACKLIST, "action-btn bl"),
        };
        Self {
            label,
            class,
            action,
        }
    }

    pub fn remove(domain: &str, from: ListKind) -> Self {
        Self {
            label: TRASH,
            class: "remove-btn",
            action: Action::Remove {
                domain: domain.to_string(),
                from,
            },
        }
    }

    /// Button markup. The domain only ever lands in an escaped attribute.
    pub fn write_html(&self, out: &mut String) {
        let verb = match self.action {
            Action::Remove { .. } => "remove",
            _ => "move",
        };
        let _ = write!(
            out,
            r#"<button type="button" class="{}" data-action="{}" data-domain="{}" data-target="{}">{}</button>"#,
            self.class,
            verb,
            escape_html(self.action.domain()),
            self.action.target(),
            self.label
        );
    }
}

pub fn write_controls(controls: &[Control], out: &mut String) {
    for (i, control) in controls.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        control.write_html(out);
    }
}

/// Escapes text for use in element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

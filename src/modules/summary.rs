use std::fmt;

use crate::modules::markup::{Action, Control, escape_html, write_controls};
use crate::modules::types::{Filters, ListKind, ListStatus, SummaryRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub status: ListStatus,
    pub domain: String,
    pub count: u64,
    pub url: String,
    pub controls: Vec<Control>,
}

/// Filtered, classified view of the access summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryTable {
    pub lines: Vec<SummaryLine>,
}

/// Builds the summary table for the rows whose status passes `filters`.
pub fn render(rows: &[SummaryRow], filters: Filters) -> SummaryTable {
    let lines = rows
        .iter()
        .filter(|row| filters.shows(row.status))
        .map(|row| SummaryLine {
            status: row.status,
            domain: row.domain.clone(),
            count: row.count,
            url: row.url.clone(),
            controls: controls_for(&row.domain, row.status),
        })
        .collect();
    SummaryTable { lines }
}

fn controls_for(domain: &str, status: ListStatus) -> Vec<Control> {
    let move_to = |to: ListKind| {
        Control::move_to(
            to,
            Action::MoveFromSummary {
                domain: domain.to_string(),
                to,
            },
        )
    };
    match status {
        ListStatus::Whitelisted => vec![move_to(ListKind::Blacklist)],
        ListStatus::Blacklisted => vec![move_to(ListKind::Whitelist)],
        ListStatus::Unknown => vec![move_to(ListKind::Whitelist), move_to(ListKind::Blacklist)],
    }
}

impl SummaryTable {
    pub fn to_html(&self) -> String {
        let mut html = String::from(
            r#"<table class="summary-table"><tr><th>Actions</th><th></th><th>Domain</th><th>Count</th></tr>"#,
        );
        for line in &self.lines {
            html.push_str("<tr><td>");
            write_controls(&line.controls, &mut html);
            html.push_str(&format!(
                r#"</td><td class="status {}">{}</td><td>{}</td><td>{}</td></tr>"#,
                line.status.class(),
                line.status,
                escape_html(&line.domain),
                line.count
            ));
        }
        html.push_str("</table>");
        html
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lines.is_empty() {
            return writeln!(f, "(no domains)");
        }
        let width = self.lines.iter().map(|l| l.domain.chars().count()).max().unwrap_or(0);
        for line in &self.lines {
            let actions: Vec<&str> = line.controls.iter().map(|c| c.label).collect();
            write!(
                f,
                "{} {:<width$} {:>6}  {}",
                line.status,
                line.domain,
                line.count,
                actions.join(" ")
            )?;
            if !line.url.is_empty() {
                write!(f, "  {}", line.url)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

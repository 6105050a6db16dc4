use std::fmt;

use crate::modules::codec;
use crate::modules::markup::{Action, Control, escape_html, write_controls};
use crate::modules::types::ListKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub domain: String,
    pub note: String,
    pub controls: [Control; 2],
}

/// Editable table for one list. Rendering always starts from an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTable {
    pub kind: ListKind,
    pub rows: Vec<ListRow>,
}

impl ListTable {
    pub fn empty(kind: ListKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
        }
    }
}

pub fn render(kind: ListKind, raw: &str) -> ListTable {
    let to = kind.opposite();
    let rows = codec::decode(raw)
        .into_iter()
        .map(|entry| {
            let move_control = Control::move_to(
                to,
                Action::MoveFromList {
                    domain: entry.domain.clone(),
                    from: kind,
                    to,
                    note: entry.note.clone(),
                },
            );
            let remove_control = Control::remove(&entry.domain, kind);
            ListRow {
                domain: entry.domain,
                note: entry.note,
                controls: [move_control, remove_control],
            }
        })
        .collect();
    ListTable { kind, rows }
}

impl ListTable {
    pub fn to_html(&self) -> String {
        let mut html = format!(
            r#"<table id="{}-table"><tr><th>Actions</th><th>Domain</th><th>Note</th></tr>"#,
            self.kind
        );
        for row in &self.rows {
            html.push_str(r#"<tr><td class="actions-col">"#);
            write_controls(&row.controls, &mut html);
            html.push_str(&format!(
                r#"</td><td class="domain-col">{}</td><td class="note-col">{}</td></tr>"#,
                escape_html(&row.domain),
                escape_html(&row.note)
            ));
        }
        html.push_str("</table>");
        html
    }
}

impl fmt::Display for ListTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {} entries", self.kind, self.rows.len())?;
        for row in &self.rows {
            if row.note.is_empty() {
                writeln!(f, "  {}", row.domain)?;
            } else {
                writeln!(f, "  {}  # {}", row.domain, row.note)?;
            }
        }
        Ok(())
    }
}

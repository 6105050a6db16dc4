use std::io::{self, BufRead, Write};

use clap::ValueEnum;

use crate::modules::dispatcher::{EditorView, SummaryPanel, Ui};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Panel {
    Summary,
    Log,
    Lists,
    Status,
}

/// Renders one panel of the view as markup or terminal text.
pub fn present(view: &EditorView, panel: Panel, html: bool) -> String {
    match panel {
        Panel::Summary => match &view.summary {
            SummaryPanel::Table(table) if html => table.to_html(),
            SummaryPanel::Table(table) => table.to_string(),
            SummaryPanel::Fragment(fragment) => fragment.clone(),
        },
        Panel::Log if html => view.log.to_html(),
        Panel::Log => view.log.to_string(),
        Panel::Lists if html => format!("{}\n{}", view.whitelist.to_html(), view.blacklist.to_html()),
        Panel::Lists => format!("{}{}", view.whitelist, view.blacklist),
        Panel::Status => format!(
            "proxy: {}\nsetpoint: {}\nnote: {}",
            view.proxy_status.as_deref().unwrap_or("-"),
            view.setpoint.as_deref().unwrap_or("-"),
            view.note
        ),
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Alerts on stderr, confirmations read from stdin.
pub struct ConsoleUi {
    assume_yes: bool,
}

impl ConsoleUi {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Ui for ConsoleUi {
    fn alert(&mut self, message: &str) {
        eprintln!("! {message}");
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{message} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

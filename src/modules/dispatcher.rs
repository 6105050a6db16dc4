use log::{error, info, warn};

use crate::modules::backend::Backend;
use crate::modules::codec;
use crate::modules::lists::{self, ListTable};
use crate::modules::logview::{self, LogMode, LogView};
use crate::modules::markup::Action;
use crate::modules::serialize::{DraftStore, EditorConfig, SummarySource};
use crate::modules::summary::{self, SummaryTable};
use crate::modules::types::{
    ClearScope, Filters, ListEntry, ListKind, ListStatus, SummaryRow, Target,
};

pub const CONFIRM_CLEAR_ALL: &str = "Clear all access logs (WL, BL, and RG)? This cannot be undone.";

/// Operator-facing side effects the dispatcher cannot perform itself.
pub trait Ui {
    /// Blocking notification.
    fn alert(&mut self, message: &str);
    /// Blocking yes/no question.
    fn confirm(&mut self, message: &str) -> bool;
}

/// Domain and note inputs next to one list table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddForm {
    pub domain: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryPanel {
    Table(SummaryTable),
    /// Trusted markup produced by the backend
    Fragment(String),
}

/// Everything the operator currently sees.
#[derive(Debug, Clone)]
pub struct EditorView {
    pub rows: Vec<SummaryRow>,
    pub filters: Filters,
    pub summary: SummaryPanel,
    pub log: LogView,
    pub whitelist: ListTable,
    pub blacklist: ListTable,
    pub whitelist_form: AddForm,
    pub blacklist_form: AddForm,
    pub note: String,
    pub proxy_status: Option<String>,
    pub setpoint: Option<String>,
}

impl Default for EditorView {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            filters: Filters::default(),
            summary: SummaryPanel::Table(SummaryTable::default()),
            log: LogView::default(),
            whitelist: ListTable::empty(ListKind::Whitelist),
            blacklist: ListTable::empty(ListKind::Blacklist),
            whitelist_form: AddForm::default(),
            blacklist_form: AddForm::default(),
            note: String::new(),
            proxy_status: None,
            setpoint: None,
        }
    }
}

impl EditorView {
    pub fn list(&self, kind: ListKind) -> &ListTable {
        match kind {
            ListKind::Whitelist => &self.whitelist,
            ListKind::Blacklist => &self.blacklist,
        }
    }

    pub fn form(&self, kind: ListKind) -> &AddForm {
        match kind {
            ListKind::Whitelist => &self.whitelist_form,
            ListKind::Blacklist => &self.blacklist_form,
        }
    }

    fn form_mut(&mut self, kind: ListKind) -> &mut AddForm {
        match kind {
            ListKind::Whitelist => &mut self.whitelist_form,
            ListKind::Blacklist => &mut self.blacklist_form,
        }
    }
}

/// Turns operator actions into backend requests and keeps the view in sync.
///
/// Every mutating call is a single request followed, on success, by a refresh. Nothing
/// here returns an error: failures are logged, and alerted when the operator asked for
/// the action. The returned `bool` tells whether the action went through.
pub struct Dispatcher<B, U> {
    backend: B,
    ui: U,
    drafts: Option<DraftStore>,
    summary_source: SummarySource,
    log_mode: LogMode,
    view: EditorView,
}

impl<B: Backend, U: Ui> Dispatcher<B, U> {
    pub fn new(backend: B, ui: U, config: &EditorConfig) -> Self {
        Self {
            backend,
            ui,
            drafts: None,
            summary_source: config.summary_source,
            log_mode: config.log_mode,
            view: EditorView::default(),
        }
    }

    /// Attaches the note draft storage and loads the saved draft.
    pub fn with_drafts(mut self, drafts: DraftStore) -> Self {
        match drafts.load() {
            Ok(note) => self.view.note = note,
            Err(err) => warn!("Cannot read note draft from {}: {err}", drafts.path().display()),
        }
        self.drafts = Some(drafts);
        self
    }

    pub fn view(&self) -> &EditorView {
        &self.view
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn set_log_mode(&mut self, mode: LogMode) {
        self.log_mode = mode;
    }

    // ----- refresh path -----

    pub fn refresh(&mut self) {
        self.refresh_summary();
        self.refresh_log();
        self.refresh_lists();
    }

    pub fn refresh_summary(&mut self) {
        match self.summary_source {
            SummarySource::Data => match self.backend.summary_data() {
                Ok(rows) => {
                    self.view.rows = rows;
                    self.rerender_summary();
                }
                Err(err) => error!("Error updating summary: {err}"),
            },
            SummarySource::Html => match self.backend.summary_html() {
                Ok(fragment) => self.view.summary = SummaryPanel::Fragment(fragment),
                Err(err) => error!("Error updating summary: {err}"),
            },
        }
    }

    pub fn refresh_log(&mut self) {
        match self.backend.log() {
            Ok(text) => self.view.log = logview::render(&text, self.log_mode),
            Err(err) => error!("Error updating log: {err}"),
        }
    }

    pub fn refresh_lists(&mut self) {
        match self.backend.lists() {
            Ok(data) => {
                self.view.whitelist = lists::render(ListKind::Whitelist, &data.whitelist);
                self.view.blacklist = lists::render(ListKind::Blacklist, &data.blacklist);
            }
            Err(err) => error!("Error updating lists: {err}"),
        }
    }

    fn rerender_summary(&mut self) {
        if self.summary_source == SummarySource::Data {
            self.view.summary =
                SummaryPanel::Table(summary::render(&self.view.rows, self.view.filters));
        }
    }

    // ----- local state -----

    pub fn set_filters(&mut self, filters: Filters) {
        self.view.filters = filters;
        self.rerender_summary();
    }

    pub fn toggle_filter(&mut self, status: ListStatus) {
        self.view.filters.toggle(status);
        self.rerender_summary();
    }

    /// Updates the page note and persists it.
    pub fn set_note(&mut self, note: &str) {
        self.view.note = note.to_string();
        if let Some(drafts) = &self.drafts {
            if let Err(err) = drafts.save(note) {
                warn!("Cannot save note draft to {}: {err}", drafts.path().display());
            }
        }
    }

    // ----- domain moves -----

    /// Adds a domain to a list. The inputs stay filled unless the backend accepts it.
    pub fn add(&mut self, kind: ListKind, domain: &str, note: &str) -> bool {
        *self.view.form_mut(kind) = AddForm {
            domain: domain.to_string(),
            note: note.to_string(),
        };
        let domain = domain.trim();
        if domain.is_empty() {
            self.ui.alert("Please enter a domain");
            return false;
        }
        let done = self.send_move(domain, kind.into(), note.trim(), "adding", "Failed to add domain");
        if done {
            *self.view.form_mut(kind) = AddForm::default();
            self.refresh();
        }
        done
    }

    /// Moves a domain shown in the summary, tagging it with the page note.
    pub fn move_domain(&mut self, domain: &str, to: ListKind) -> bool {
        let note = self.view.note.clone();
        self.move_with_note(domain, to, &note)
    }

    /// Moves a domain with a one-off note. The saved note draft is left alone.
    pub fn move_with_note(&mut self, domain: &str, to: ListKind, note: &str) -> bool {
        self.move_and_refresh(domain, to.into(), note.trim(), "moving", "Failed to move domain")
    }

    /// Moves a list entry to another list, keeping its note.
    pub fn move_from_list(&mut self, domain: &str, from: ListKind, to: ListKind, note: &str) -> bool {
        info!("Moving {domain} from {from} to {to}");
        self.move_and_refresh(domain, to.into(), note, "moving", "Failed to move domain")
    }

    /// Drops a domain from whichever list holds it.
    pub fn remove(&mut self, domain: &str, from: ListKind) -> bool {
        info!("Removing {domain} from {from}");
        self.move_and_refresh(domain, Target::Unknown, "", "removing", "Failed to remove domain")
    }

    /// Runs the action behind a rendered control.
    pub fn perform(&mut self, action: &Action) -> bool {
        match action {
            Action::MoveFromSummary { domain, to } => self.move_domain(domain, *to),
            Action::MoveFromList {
                domain,
                from,
                to,
                note,
            } => self.move_from_list(domain, *from, *to, note),
            Action::Remove { domain, from } => self.remove(domain, *from),
        }
    }

    fn move_and_refresh(
        &mut self,
        domain: &str,
        target: Target,
        note: &str,
        verb: &str,
        fallback: &str,
    ) -> bool {
        let done = self.send_move(domain, target, note, verb, fallback);
        if done {
            self.refresh();
        }
        done
    }

    fn send_move(&mut self, domain: &str, target: Target, note: &str, verb: &str, fallback: &str) -> bool {
        match self.backend.move_domain(domain, target, note) {
            Ok(reply) if reply.is_success() => {
                info!("{domain} -> {target}");
                true
            }
            Ok(reply) => {
                let message = reply.error.unwrap_or_else(|| fallback.to_string());
                warn!("Backend refused {domain} -> {target}: {message}");
                self.ui.alert(&format!("Error: {message}"));
                false
            }
            Err(err) => {
                error!("Error {verb} domain: {err}");
                self.ui.alert(&format!("Error {verb} domain: {err}"));
                false
            }
        }
    }

    /// Replaces both lists wholesale.
    pub fn save_lists(&mut self, whitelist: &[ListEntry], blacklist: &[ListEntry]) -> bool {
        let (wl, bl) = (codec::encode(whitelist), codec::encode(blacklist));
        match self.backend.save_lists(&wl, &bl) {
            Ok(()) => {
                info!("Saved {} whitelist and {} blacklist entries", whitelist.len(), blacklist.len());
                self.refresh_summary();
                self.refresh_lists();
                true
            }
            Err(err) => {
                error!("Error saving lists: {err}");
                self.ui.alert(&format!("Error saving lists: {err}"));
                false
            }
        }
    }

    // ----- logs and proxy -----

    pub fn clear_logs(&mut self, scope: ClearScope) -> bool {
        let all = scope == ClearScope::All;
        if all && !self.ui.confirm(CONFIRM_CLEAR_ALL) {
            return false;
        }
        let failure = match self.backend.clear_logs(scope) {
            Ok(reply) => match reply.error {
                None => {
                    let status = reply.status.unwrap_or_else(|| "All logs cleared".to_string());
                    info!("Cleared {scope} logs: {status}");
                    if all {
                        self.ui.alert(&status);
                    }
                    self.refresh_summary();
                    self.refresh_log();
                    return true;
                }
                Some(message) => message,
            },
            Err(err) => err.to_string(),
        };
        error!("Error clearing {scope} logs: {failure}");
        if all {
            self.ui.alert(&format!("Error clearing logs: {failure}"));
        }
        false
    }

    /// Asks the backend to reload the proxy and shows its status string as is.
    pub fn reload(&mut self) -> bool {
        match self.backend.reload() {
            Ok(reply) => {
                let status = reply.status.unwrap_or_else(|| "reloaded".to_string());
                info!("Proxy reload: {status}");
                self.view.proxy_status = Some(status);
                if let Some(message) = reply.error {
                    warn!("Proxy reload reported: {message}");
                    return false;
                }
                true
            }
            Err(err) => {
                error!("Error reloading proxy: {err}");
                self.ui.alert(&format!("Error reloading proxy: {err}"));
                false
            }
        }
    }

    pub fn set_setpoint(&mut self) -> bool {
        match self.backend.set_setpoint() {
            Ok(reply) => {
                self.view.setpoint = Some(reply.setpoint.unwrap_or_else(|| "set".to_string()));
                true
            }
            Err(err) => {
                error!("Error setting setpoint: {err}");
                self.ui.alert(&format!("Error setting setpoint: {err}"));
                false
            }
        }
    }

    pub fn clear_setpoint(&mut self) -> bool {
        match self.backend.clear_setpoint() {
            Ok(_) => {
                self.view.setpoint = Some("none".to_string());
                true
            }
            Err(err) => {
                error!("Error clearing setpoint: {err}");
                self.ui.alert(&format!("Error clearing setpoint: {err}"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_utils::{Call, MockBackend, MockUi, row};
    use crate::modules::types::{Lists, MoveReply, StatusReply};

    fn dispatcher(backend: MockBackend) -> Dispatcher<MockBackend, MockUi> {
        Dispatcher::new(backend, MockUi::default(), &EditorConfig::default())
    }

    fn fetch_counts(calls: &[Call]) -> (usize, usize, usize) {
        let count = |want: &Call| calls.iter().filter(|c| *c == want).count();
        (count(&Call::SummaryData), count(&Call::Log), count(&Call::Lists))
    }

    #[test]
    fn successful_move_refreshes_each_panel_once() {
        let mut d = dispatcher(MockBackend::default());
        assert!(d.perform(&Action::MoveFromSummary {
            domain: "x.com".to_string(),
            to: ListKind::Blacklist,
        }));

        let calls = d.backend().calls();
        assert_eq!(
            calls[0],
            Call::Move {
                domain: "x.com".to_string(),
                target: Target::Blacklist,
                note: String::new(),
            }
        );
        assert_eq!(fetch_counts(&calls), (1, 1, 1));
        assert_eq!(calls.len(), 4);
        assert!(d.ui().alerts.is_empty());
    }

    #[test]
    fn blank_domain_is_rejected_locally() {
        let mut d = dispatcher(MockBackend::default());
        assert!(!d.add(ListKind::Whitelist, "   \t", "some note"));
        assert!(d.backend().calls().is_empty());
        assert_eq!(d.ui().alerts, vec!["Please enter a domain"]);
    }

    #[test]
    fn add_trims_and_clears_inputs_on_success() {
        let mut d = dispatcher(MockBackend::default());
        assert!(d.add(ListKind::Blacklist, "  ads.example  ", " tracker "));
        assert_eq!(
            d.backend().calls()[0],
            Call::Move {
                domain: "ads.example".to_string(),
                target: Target::Blacklist,
                note: "tracker".to_string(),
            }
        );
        assert_eq!(d.view().form(ListKind::Blacklist), &AddForm::default());
        assert_eq!(fetch_counts(&d.backend().calls()), (1, 1, 1));
    }

    #[test]
    fn refused_add_keeps_inputs_and_alerts_server_message() {
        let backend = MockBackend::default();
        backend.set_move_reply(MoveReply {
            status: Some("error".to_string()),
            error: Some("domain is required".to_string()),
        });
        let mut d = dispatcher(backend);
        assert!(!d.add(ListKind::Whitelist, "a.com", "n"));
        assert_eq!(d.ui().alerts, vec!["Error: domain is required"]);
        assert_eq!(d.view().form(ListKind::Whitelist).domain, "a.com");
        assert_eq!(d.view().form(ListKind::Whitelist).note, "n");
        assert_eq!(d.backend().calls().len(), 1);
    }

    #[test]
    fn reply_without_error_uses_fallback_text() {
        let backend = MockBackend::default();
        backend.set_move_reply(MoveReply::default());
        let mut d = dispatcher(backend);
        assert!(!d.remove("a.com", ListKind::Whitelist));
        assert_eq!(d.ui().alerts, vec!["Error: Failed to remove domain"]);
    }

    #[test]
    fn transport_failure_is_alerted_with_its_message() {
        let backend = MockBackend::default();
        backend.set_offline(true);
        let mut d = dispatcher(backend);
        assert!(!d.move_domain("a.com", ListKind::Whitelist));
        assert_eq!(d.ui().alerts, vec!["Error moving domain: connection refused"]);
        // no refresh after a failure
        assert_eq!(d.backend().calls().len(), 1);
    }

    #[test]
    fn summary_moves_use_page_note_and_list_moves_keep_entry_note() {
        let mut d = dispatcher(MockBackend::default());
        d.set_note("  from ticket 7 ");
        d.move_domain("a.com", ListKind::Whitelist);
        d.move_from_list("b.com", ListKind::Whitelist, ListKind::Blacklist, "old note");
        d.remove("c.com", ListKind::Blacklist);

        let moves: Vec<Call> = d
            .backend()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Move { .. }))
            .collect();
        assert_eq!(
            moves,
            vec![
                Call::Move {
                    domain: "a.com".to_string(),
                    target: Target::Whitelist,
                    note: "from ticket 7".to_string(),
                },
                Call::Move {
                    domain: "b.com".to_string(),
                    target: Target::Blacklist,
                    note: "old note".to_string(),
                },
                Call::Move {
                    domain: "c.com".to_string(),
                    target: Target::Unknown,
                    note: String::new(),
                },
            ]
        );
    }

    #[test]
    fn one_off_note_does_not_touch_the_draft() {
        let dir = tempfile::tempdir().unwrap();
        let drafts = DraftStore::new(dir.path().join("state.toml"));
        drafts.save("saved draft").unwrap();

        let mut d = dispatcher(MockBackend::default()).with_drafts(drafts.clone());
        assert!(d.move_with_note("a.com", ListKind::Blacklist, " just this once "));
        assert_eq!(
            d.backend().calls()[0],
            Call::Move {
                domain: "a.com".to_string(),
                target: Target::Blacklist,
                note: "just this once".to_string(),
            }
        );
        assert_eq!(d.view().note, "saved draft");
        assert_eq!(drafts.load().unwrap(), "saved draft");
    }

    #[test]
    fn refresh_feeds_every_renderer() {
        let backend = MockBackend::default();
        backend.set_rows(vec![
            row("a.com", 3, ListStatus::Whitelisted),
            row("b.com", 1, ListStatus::Unknown),
        ]);
        backend.set_log("1 WL a.com\n2 RG b.com");
        backend.set_lists(Lists {
            whitelist: "a.com #mine".to_string(),
            blacklist: "# empty".to_string(),
        });
        let mut d = dispatcher(backend);
        d.refresh();

        let view = d.view();
        let SummaryPanel::Table(table) = &view.summary else {
            panic!("expected a table");
        };
        assert_eq!(table.lines.len(), 2);
        assert_eq!(view.log.lines.len(), 2);
        assert_eq!(view.whitelist.rows[0].note, "mine");
        assert!(view.blacklist.rows.is_empty());
    }

    #[test]
    fn filters_rerender_without_fetching() {
        let backend = MockBackend::default();
        backend.set_rows(vec![
            row("a.com", 3, ListStatus::Whitelisted),
            row("b.com", 1, ListStatus::Unknown),
        ]);
        let mut d = dispatcher(backend);
        d.refresh_summary();
        d.toggle_filter(ListStatus::Whitelisted);

        assert_eq!(d.backend().calls(), vec![Call::SummaryData]);
        let SummaryPanel::Table(table) = &d.view().summary else {
            panic!("expected a table");
        };
        assert_eq!(table.lines.len(), 1);
        assert_eq!(table.lines[0].domain, "b.com");
    }

    #[test]
    fn failed_refresh_keeps_previous_view() {
        let backend = MockBackend::default();
        backend.set_lists(Lists {
            whitelist: "keep.me".to_string(),
            blacklist: String::new(),
        });
        let mut d = dispatcher(backend);
        d.refresh();
        d.backend().set_offline(true);
        d.refresh();

        assert_eq!(d.view().whitelist.rows[0].domain, "keep.me");
        assert!(d.ui().alerts.is_empty());
    }

    #[test]
    fn html_summary_source_keeps_fragment() {
        let backend = MockBackend::default();
        backend.set_summary_html("<table class=\"summary-table\"></table>");
        let config = EditorConfig {
            summary_source: SummarySource::Html,
            ..EditorConfig::default()
        };
        let mut d = Dispatcher::new(backend, MockUi::default(), &config);
        d.refresh_summary();
        assert_eq!(d.backend().calls(), vec![Call::SummaryHtml]);
        assert_eq!(
            d.view().summary,
            SummaryPanel::Fragment("<table class=\"summary-table\"></table>".to_string())
        );
    }

    #[test]
    fn clear_all_needs_confirmation() {
        let mut d = dispatcher(MockBackend::default());
        d.ui_mut().answer = false;
        assert!(!d.clear_logs(ClearScope::All));
        assert!(d.backend().calls().is_empty());
        assert_eq!(d.ui().confirms, vec![CONFIRM_CLEAR_ALL]);

        d.ui_mut().answer = true;
        assert!(d.clear_logs(ClearScope::All));
        assert_eq!(
            d.backend().calls(),
            vec![Call::Clear(ClearScope::All), Call::SummaryData, Call::Log]
        );
        assert_eq!(d.ui().alerts, vec!["all logs cleared"]);
    }

    #[test]
    fn scoped_clear_is_silent_and_skips_lists() {
        let mut d = dispatcher(MockBackend::default());
        d.ui_mut().answer = false;
        assert!(d.clear_logs(ClearScope::Regular));
        assert!(d.ui().confirms.is_empty());
        assert!(d.ui().alerts.is_empty());
        assert_eq!(
            d.backend().calls(),
            vec![Call::Clear(ClearScope::Regular), Call::SummaryData, Call::Log]
        );
    }

    #[test]
    fn failed_scoped_clear_only_logs() {
        let backend = MockBackend::default();
        backend.set_status_reply(StatusReply {
            status: Some("error".to_string()),
            error: Some("disk full".to_string()),
            setpoint: None,
        });
        let mut d = dispatcher(backend);
        assert!(!d.clear_logs(ClearScope::Whitelist));
        assert!(d.ui().alerts.is_empty());

        d.ui_mut().answer = true;
        assert!(!d.clear_logs(ClearScope::All));
        assert_eq!(d.ui().alerts, vec!["Error clearing logs: disk full"]);
    }

    #[test]
    fn reload_shows_status_verbatim() {
        let backend = MockBackend::default();
        backend.set_status_reply(StatusReply {
            status: Some("ERROR".to_string()),
            error: Some("reload failed".to_string()),
            setpoint: None,
        });
        let mut d = dispatcher(backend);
        assert!(!d.reload());
        assert_eq!(d.view().proxy_status.as_deref(), Some("ERROR"));
        assert_eq!(d.backend().calls(), vec![Call::Reload]);
    }

    #[test]
    fn setpoint_round_trip() {
        let backend = MockBackend::default();
        backend.set_status_reply(StatusReply {
            status: None,
            error: None,
            setpoint: Some("1712175100.5".to_string()),
        });
        let mut d = dispatcher(backend);
        assert!(d.set_setpoint());
        assert_eq!(d.view().setpoint.as_deref(), Some("1712175100.5"));
        assert!(d.clear_setpoint());
        assert_eq!(d.view().setpoint.as_deref(), Some("none"));
    }

    #[test]
    fn save_lists_sends_encoded_text() {
        let mut d = dispatcher(MockBackend::default());
        let wl = vec![ListEntry::new("a.com", ""), ListEntry::new("b.com", "x # y")];
        assert!(d.save_lists(&wl, &[]));
        assert_eq!(
            d.backend().calls()[0],
            Call::Save {
                whitelist: "a.com\nb.com #x # y".to_string(),
                blacklist: String::new(),
            }
        );
    }

    #[test]
    fn note_draft_is_loaded_once_and_saved_on_edit() {
        let dir = tempfile::tempdir().unwrap();
        let drafts = DraftStore::new(dir.path().join("state.toml"));
        drafts.save("remembered").unwrap();

        let mut d = dispatcher(MockBackend::default()).with_drafts(drafts.clone());
        assert_eq!(d.view().note, "remembered");
        d.set_note("changed");
        assert_eq!(drafts.load().unwrap(), "changed");
    }
}

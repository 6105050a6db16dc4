//! Scripted backend and recording UI for dispatcher tests.

use std::cell::{Cell, RefCell};
use std::io;
use std::thread;
use std::time::Duration;

use crate::modules::backend::Backend;
use crate::modules::dispatcher::Ui;
use crate::modules::error::{EditorError, EditorResult};
use crate::modules::types::{
    ClearScope, ListStatus, Lists, MoveReply, StatusReply, SummaryRow, Target,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SummaryData,
    SummaryHtml,
    Log,
    Lists,
    Move {
        domain: String,
        target: Target,
        note: String,
    },
    Clear(ClearScope),
    Reload,
    SetSetpoint,
    ClearSetpoint,
    Save {
        whitelist: String,
        blacklist: String,
    },
}

pub fn row(domain: &str, count: u64, status: ListStatus) -> SummaryRow {
    SummaryRow {
        domain: domain.to_string(),
        count,
        status,
        url: String::new(),
    }
}

pub struct MockBackend {
    calls: RefCell<Vec<Call>>,
    offline: Cell<bool>,
    delay: Cell<Duration>,
    rows: RefCell<Vec<SummaryRow>>,
    summary_html: RefCell<String>,
    log: RefCell<String>,
    lists: RefCell<Lists>,
    move_reply: RefCell<MoveReply>,
    status_reply: RefCell<StatusReply>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            offline: Cell::new(false),
            delay: Cell::new(Duration::ZERO),
            rows: RefCell::new(Vec::new()),
            summary_html: RefCell::new(String::new()),
            log: RefCell::new(String::new()),
            lists: RefCell::new(Lists::default()),
            move_reply: RefCell::new(MoveReply {
                status: Some("success".to_string()),
                error: None,
            }),
            status_reply: RefCell::new(StatusReply {
                status: Some("all logs cleared".to_string()),
                error: None,
                setpoint: None,
            }),
        }
    }
}

impl MockBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Makes every request fail as if the connection was refused.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    /// Makes every request take at least `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.delay.set(delay);
    }

    pub fn set_rows(&self, rows: Vec<SummaryRow>) {
        *self.rows.borrow_mut() = rows;
    }

    pub fn set_summary_html(&self, html: &str) {
        *self.summary_html.borrow_mut() = html.to_string();
    }

    pub fn set_log(&self, text: &str) {
        *self.log.borrow_mut() = text.to_string();
    }

    pub fn set_lists(&self, lists: Lists) {
        *self.lists.borrow_mut() = lists;
    }

    pub fn set_move_reply(&self, reply: MoveReply) {
        *self.move_reply.borrow_mut() = reply;
    }

    pub fn set_status_reply(&self, reply: StatusReply) {
        *self.status_reply.borrow_mut() = reply;
    }

    fn record(&self, call: Call) -> EditorResult<()> {
        self.calls.borrow_mut().push(call);
        if !self.delay.get().is_zero() {
            thread::sleep(self.delay.get());
        }
        if self.offline.get() {
            return Err(EditorError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        Ok(())
    }
}

impl Backend for MockBackend {
    fn summary_data(&self) -> EditorResult<Vec<SummaryRow>> {
        self.record(Call::SummaryData)?;
        Ok(self.rows.borrow().clone())
    }

    fn summary_html(&self) -> EditorResult<String> {
        self.record(Call::SummaryHtml)?;
        Ok(self.summary_html.borrow().clone())
    }

    fn log(&self) -> EditorResult<String> {
        self.record(Call::Log)?;
        Ok(self.log.borrow().clone())
    }

    fn lists(&self) -> EditorResult<Lists> {
        self.record(Call::Lists)?;
        Ok(self.lists.borrow().clone())
    }

    fn move_domain(&self, domain: &str, target: Target, note: &str) -> EditorResult<MoveReply> {
        self.record(Call::Move {
            domain: domain.to_string(),
            target,
            note: note.to_string(),
        })?;
        Ok(self.move_reply.borrow().clone())
    }

    fn clear_logs(&self, scope: ClearScope) -> EditorResult<StatusReply> {
        self.record(Call::Clear(scope))?;
        Ok(self.status_reply.borrow().clone())
    }

    fn reload(&self) -> EditorResult<StatusReply> {
        self.record(Call::Reload)?;
        Ok(self.status_reply.borrow().clone())
    }

    fn set_setpoint(&self) -> EditorResult<StatusReply> {
        self.record(Call::SetSetpoint)?;
        Ok(self.status_reply.borrow().clone())
    }

    fn clear_setpoint(&self) -> EditorResult<StatusReply> {
        self.record(Call::ClearSetpoint)?;
        Ok(self.status_reply.borrow().clone())
    }

    fn save_lists(&self, whitelist: &str, blacklist: &str) -> EditorResult<()> {
        self.record(Call::Save {
            whitelist: whitelist.to_string(),
            blacklist: blacklist.to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MockUi {
    pub alerts: Vec<String>,
    pub confirms: Vec<String>,
    pub answer: bool,
}

impl Ui for MockUi {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirms.push(message.to_string());
        self.answer
    }
}

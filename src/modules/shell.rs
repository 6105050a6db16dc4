use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};

use crate::modules::backend::Backend;
use crate::modules::console::{Panel, is_yes, present};
use crate::modules::dispatcher::{Dispatcher, Ui};
use crate::modules::scheduler::RefreshScheduler;
use crate::modules::types::{ClearScope, ListKind, ListStatus};

/// Input to the watch loop. Everything the UI thread reacts to arrives here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Tick,
    Line(String),
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SetpointOp {
    Set,
    Clear,
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// Fetch summary, log and lists now
    Refresh,
    /// Print a panel
    Show { panel: Panel },
    /// Turn the periodic refresh on or off
    Auto { switch: Switch },
    /// Show or hide summary rows with a status
    Filter { status: ListStatus },
    /// Set the note attached to moves from the summary
    Note {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    Add {
        kind: ListKind,
        domain: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        note: Vec<String>,
    },
    /// Move a domain. With --from the list entry's own note is kept.
    Move {
        domain: String,
        to: ListKind,
        #[arg(long)]
        from: Option<ListKind>,
    },
    #[command(alias = "rm")]
    Remove {
        domain: String,
        #[arg(long)]
        from: Option<ListKind>,
    },
    Clear { scope: ClearScope },
    Reload,
    Setpoint { op: SetpointOp },
    #[command(alias = "exit")]
    Quit,
}

/// Parses one typed line. Free-text notes are cut from the raw line, so inner spacing
/// and leading dashes are kept.
pub fn parse_line(line: &str) -> Result<ShellCommand, clap::Error> {
    let mut command = ShellLine::try_parse_from(line.split_whitespace())?.command;
    match &mut command {
        ShellCommand::Note { text } => *text = verbatim_tail(line, 1),
        ShellCommand::Add { note, .. } => *note = verbatim_tail(line, 3),
        _ => {}
    }
    Ok(command)
}

/// Text after the first `skip` words, trimmed at both ends.
fn verbatim_tail(line: &str, skip: usize) -> Vec<String> {
    let mut rest = line.trim();
    for _ in 0..skip {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    if rest.is_empty() {
        Vec::new()
    } else {
        vec![rest.to_string()]
    }
}

/// Watch-mode UI: confirmations are answered by the next typed line.
pub struct ShellUi {
    events: Receiver<Event>,
    closed: Cell<bool>,
}

impl ShellUi {
    pub fn new(events: Receiver<Event>) -> Self {
        Self {
            events,
            closed: Cell::new(false),
        }
    }

    /// Next event. Once input has closed every later call returns `Closed`.
    pub fn next_event(&self) -> Event {
        if self.closed.get() {
            return Event::Closed;
        }
        match self.events.recv() {
            Ok(Event::Closed) | Err(_) => {
                self.closed.set(true);
                Event::Closed
            }
            Ok(event) => event,
        }
    }
}

impl Ui for ShellUi {
    fn alert(&mut self, message: &str) {
        eprintln!("! {message}");
    }

    fn confirm(&mut self, message: &str) -> bool {
        eprint!("{message} [y/N] ");
        let _ = io::stderr().flush();
        // timer ticks are held off while the question is open
        loop {
            match self.next_event() {
                Event::Tick => continue,
                Event::Line(answer) => return is_yes(&answer),
                Event::Closed => return false,
            }
        }
    }
}

/// Forwards stdin lines into the event channel.
pub fn spawn_stdin_reader(events: Sender<Event>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if events.send(Event::Line(line)).is_err() {
                return;
            }
        }
        let _ = events.send(Event::Closed);
    });
}

pub struct Shell<B: Backend> {
    dispatcher: Dispatcher<B, ShellUi>,
    scheduler: RefreshScheduler,
    ticks: Sender<Event>,
    // at most one tick waits in the channel
    tick_queued: Arc<AtomicBool>,
    html: bool,
}

impl<B: Backend> Shell<B> {
    pub fn new(
        dispatcher: Dispatcher<B, ShellUi>,
        scheduler: RefreshScheduler,
        ticks: Sender<Event>,
        html: bool,
    ) -> Self {
        Self {
            dispatcher,
            scheduler,
            ticks,
            tick_queued: Arc::new(AtomicBool::new(false)),
            html,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<B, ShellUi> {
        &self.dispatcher
    }

    pub fn auto_refresh(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn set_auto_refresh(&mut self, on: bool) {
        if on {
            let ticks = self.ticks.clone();
            let queued = self.tick_queued.clone();
            self.scheduler.start(move || {
                if !queued.swap(true, Ordering::AcqRel) {
                    let _ = ticks.send(Event::Tick);
                }
            });
        } else {
            self.scheduler.stop();
            self.tick_queued.store(false, Ordering::Release);
        }
    }

    /// Initial load, then one event at a time until stdin closes or `quit`.
    pub fn run(&mut self, auto_refresh: bool) {
        self.dispatcher.refresh();
        self.print_all();
        self.set_auto_refresh(auto_refresh);

        loop {
            let event = self.dispatcher.ui().next_event();
            if !self.handle(event) {
                break;
            }
        }
        self.scheduler.stop();
        info!("watch loop finished");
    }

    /// Handles one event. Returns false when the loop should end.
    pub fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::Tick => {
                self.tick_queued.store(false, Ordering::Release);
                if !self.scheduler.is_running() {
                    debug!("dropping tick, auto refresh is off");
                    return true;
                }
                debug!("auto refresh tick");
                self.dispatcher.refresh();
                self.print_all();
                true
            }
            Event::Closed => false,
            Event::Line(line) if line.trim().is_empty() => true,
            Event::Line(line) => match parse_line(&line) {
                Ok(ShellCommand::Quit) => false,
                Ok(command) => {
                    self.execute(command);
                    true
                }
                Err(err) => {
                    warn!("bad command {line:?}");
                    eprintln!("{}", err.render());
                    true
                }
            },
        }
    }

    fn execute(&mut self, command: ShellCommand) {
        let d = &mut self.dispatcher;
        let changed = match command {
            ShellCommand::Refresh => {
                d.refresh();
                true
            }
            ShellCommand::Show { panel } => {
                println!("{}", present(d.view(), panel, self.html));
                false
            }
            ShellCommand::Auto { switch } => {
                self.set_auto_refresh(switch == Switch::On);
                println!("auto refresh {}", if self.auto_refresh() { "on" } else { "off" });
                false
            }
            ShellCommand::Filter { status } => {
                d.toggle_filter(status);
                println!("{}", present(d.view(), Panel::Summary, self.html));
                false
            }
            ShellCommand::Note { text } => {
                d.set_note(&text.join(" "));
                false
            }
            ShellCommand::Add { kind, domain, note } => d.add(kind, &domain, &note.join(" ")),
            ShellCommand::Move { domain, to, from } => match from {
                Some(from) => {
                    let note = d
                        .view()
                        .list(from)
                        .rows
                        .iter()
                        .find(|row| row.domain == domain)
                        .map(|row| row.note.clone())
                        .unwrap_or_default();
                    d.move_from_list(&domain, from, to, &note)
                }
                None => d.move_domain(&domain, to),
            },
            ShellCommand::Remove { domain, from } => {
                let from = from.unwrap_or_else(|| {
                    let in_blacklist = d.view().blacklist.rows.iter().any(|row| row.domain == domain);
                    if in_blacklist { ListKind::Blacklist } else { ListKind::Whitelist }
                });
                d.remove(&domain, from)
            }
            ShellCommand::Clear { scope } => d.clear_logs(scope),
            ShellCommand::Reload => {
                d.reload();
                println!("{}", present(d.view(), Panel::Status, false));
                false
            }
            ShellCommand::Setpoint { op } => {
                match op {
                    SetpointOp::Set => d.set_setpoint(),
                    SetpointOp::Clear => d.clear_setpoint(),
                };
                println!("{}", present(d.view(), Panel::Status, false));
                false
            }
            ShellCommand::Quit => false,
        };
        if changed {
            self.print_all();
        }
    }

    fn print_all(&self) {
        let view = self.dispatcher.view();
        for panel in [Panel::Summary, Panel::Log, Panel::Lists] {
            println!("{}", present(view, panel, self.html));
        }
    }
}

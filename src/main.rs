use std::env;
use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use listeditor::modules::backend::HttpBackend;
use listeditor::modules::codec;
use listeditor::modules::console::{ConsoleUi, Panel, present};
use listeditor::modules::dispatcher::Dispatcher;
use listeditor::modules::logview::LogMode;
use listeditor::modules::scheduler::RefreshScheduler;
use listeditor::modules::serialize::{DraftStore, EditorConfig, load_config};
use listeditor::modules::shell::{self, Shell, ShellUi};
use listeditor::modules::types::{ClearScope, Filters, ListKind};
use log::info;
use simplelog::*;

#[derive(Parser)]
#[command(
    name = "listeditor",
    version,
    about = "Whitelist/blacklist editor for the proxy list backend",
    long_about = None
)]
struct Cli {
    #[arg(short = 'l', long = "log-file", default_value = "listeditor.log")]
    log_file: String,

    #[arg(short = 'c', long = "config", default_value = "./editor.toml")]
    config: PathBuf,

    #[arg(short = 's', long = "state", default_value = "./editor-state.toml")]
    state: PathBuf,

    /// Backend base URL, overrides the config file and LISTEDITOR_BACKEND
    #[arg(short = 'b', long = "backend")]
    backend: Option<String>,

    /// Print markup instead of terminal text
    #[arg(long)]
    html: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Live view with auto refresh and typed commands
    Watch {
        #[arg(long)]
        no_auto: bool,
    },
    #[command(flatten)]
    Once(OnceCommand),
}

#[derive(Subcommand)]
enum OnceCommand {
    /// Show the access summary
    Summary {
        #[arg(long)]
        hide_whitelisted: bool,
        #[arg(long)]
        hide_blacklisted: bool,
        #[arg(long)]
        hide_unknown: bool,
    },
    /// Show the access log
    Log {
        #[arg(long)]
        plain: bool,
    },
    /// Show both lists
    Lists,
    /// Add a domain to a list
    Add {
        kind: ListKind,
        domain: String,
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// Move a domain to a list, tagged with the saved note unless --note is given
    Move {
        domain: String,
        to: ListKind,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Remove a domain from both lists
    Remove {
        domain: String,
        #[arg(long, default_value = "whitelist")]
        from: ListKind,
    },
    /// Clear access logs
    ClearLogs {
        scope: ClearScope,
        #[arg(short, long)]
        yes: bool,
    },
    /// Reload the proxy configuration
    Reload,
    /// Set or clear the log setpoint
    Setpoint {
        #[arg(long)]
        clear: bool,
    },
    /// Show or set the saved note
    Note { text: Option<String> },
    /// Replace both lists with the contents of two files
    Save {
        #[arg(long)]
        whitelist: PathBuf,
        #[arg(long)]
        blacklist: PathBuf,
    },
}

fn init_logger(log_path: &str) -> Result<(), Box<dyn Error>> {
    WriteLogger::init(
        LevelFilter::Info,
        ConfigBuilder::new()
            .set_time_format_rfc3339()
            .build(),
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?,
    )?;
    Ok(())
}

fn backend_url(cli: &Cli, config: &EditorConfig) -> String {
    cli.backend
        .clone()
        .or_else(|| env::var("LISTEDITOR_BACKEND").ok())
        .unwrap_or_else(|| config.backend_url.clone())
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();
    init_logger(&cli.log_file)?;

    let config = load_config(&cli.config)?;
    let url = backend_url(&cli, &config);
    let backend = HttpBackend::new(&url, Duration::from_secs(config.timeout_secs))?;
    let drafts = DraftStore::new(&cli.state);
    info!("Using backend {url}");

    let command = match cli.command {
        Command::Watch { no_auto } => {
            let (tx, rx) = mpsc::channel();
            shell::spawn_stdin_reader(tx.clone());
            let dispatcher =
                Dispatcher::new(backend, ShellUi::new(rx), &config).with_drafts(drafts);
            let scheduler = RefreshScheduler::new(Duration::from_secs(config.refresh_secs.max(1)));
            let mut shell = Shell::new(dispatcher, scheduler, tx, cli.html);
            shell.run(config.auto_refresh && !no_auto);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Once(command) => command,
    };

    let assume_yes = matches!(command, OnceCommand::ClearLogs { yes: true, .. });
    let mut d = Dispatcher::new(backend, ConsoleUi::new(assume_yes), &config).with_drafts(drafts);

    let (done, panel) = match command {
        OnceCommand::Summary {
            hide_whitelisted,
            hide_blacklisted,
            hide_unknown,
        } => {
            d.set_filters(Filters {
                show_whitelisted: !hide_whitelisted,
                show_blacklisted: !hide_blacklisted,
                show_unknown: !hide_unknown,
            });
            d.refresh_summary();
            (true, Some(Panel::Summary))
        }
        OnceCommand::Log { plain } => {
            if plain {
                d.set_log_mode(LogMode::Plain);
            }
            d.refresh_log();
            (true, Some(Panel::Log))
        }
        OnceCommand::Lists => {
            d.refresh_lists();
            (true, Some(Panel::Lists))
        }
        OnceCommand::Add { kind, domain, note } => (d.add(kind, &domain, &note), Some(Panel::Lists)),
        OnceCommand::Move { domain, to, note } => {
            let done = match note {
                Some(note) => d.move_with_note(&domain, to, &note),
                None => d.move_domain(&domain, to),
            };
            (done, Some(Panel::Lists))
        }
        OnceCommand::Remove { domain, from } => (d.remove(&domain, from), Some(Panel::Lists)),
        OnceCommand::ClearLogs { scope, .. } => (d.clear_logs(scope), Some(Panel::Summary)),
        OnceCommand::Reload => (d.reload(), Some(Panel::Status)),
        OnceCommand::Setpoint { clear } => {
            let done = if clear { d.clear_setpoint() } else { d.set_setpoint() };
            (done, Some(Panel::Status))
        }
        OnceCommand::Note { text } => {
            if let Some(text) = text {
                d.set_note(&text);
            }
            println!("{}", d.view().note);
            (true, None)
        }
        OnceCommand::Save { whitelist, blacklist } => {
            let wl = codec::decode(&fs::read_to_string(whitelist)?);
            let bl = codec::decode(&fs::read_to_string(blacklist)?);
            (d.save_lists(&wl, &bl), Some(Panel::Lists))
        }
    };

    if let (true, Some(panel)) = (done, panel) {
        println!("{}", present(d.view(), panel, cli.html));
    }
    Ok(if done { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

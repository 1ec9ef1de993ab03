//! logpager - Windowed Log Paging Engine
//!
//! Headless driver for the paging engine: prints or exports all entries of a
//! structured log file that survive the configured filters, without ever
//! loading the file into memory.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use logpager::view::{LogView, ViewConfig, ViewEvent};
use logpager::{FilteringOptions, SaveOutcome, Severity};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let matches = Command::new("logpager")
        .version(logpager::VERSION)
        .about("Windowed paging engine for huge, growing structured log files")
        .long_about(
            "logpager indexes a line-oriented structured log file in bounded chunks \
             and streams the entries that survive level and content filtering, \
             resuming across file growth without re-reading what it already parsed.",
        )
        .arg(
            Arg::new("file")
                .help("Path to the log file to page")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("disable-level")
                .long("disable-level")
                .value_name("LEVEL")
                .action(ArgAction::Append)
                .help("Drop entries at this severity level (repeatable)"),
        )
        .arg(
            Arg::new("filter")
                .long("filter")
                .value_name("PATTERN")
                .help("Wildcard content pattern (* and ?); non-matching entries are dropped"),
        )
        .arg(
            Arg::new("start-offset")
                .long("start-offset")
                .value_name("BYTES")
                .help("Byte offset to start reading from"),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .value_name("PATH")
                .help("Write matching entries to PATH instead of stdout, with progress"),
        )
        .arg(
            Arg::new("follow")
                .long("follow")
                .short('f')
                .action(ArgAction::SetTrue)
                .help("Keep polling for growth after reaching end of file"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Enable internal diagnostic logging"),
        )
        .get_matches();

    // Internal diagnostic logging toggle; RUST_LOG still wins when set.
    if matches.get_flag("debug") {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .init();
    } else {
        env_logger::init();
    }

    // Get the file path argument
    let file_path = PathBuf::from(
        matches
            .get_one::<String>("file")
            .expect("file argument is required"),
    );

    // Validate file exists
    if !file_path.exists() {
        anyhow::bail!("File does not exist: {}", file_path.display());
    }

    if !file_path.is_file() {
        anyhow::bail!("Path is not a regular file: {}", file_path.display());
    }

    let mut disabled_levels = BTreeSet::new();
    for raw in matches
        .get_many::<String>("disable-level")
        .into_iter()
        .flatten()
    {
        let level: Severity = raw
            .parse()
            .map_err(|message: String| anyhow::anyhow!(message))?;
        disabled_levels.insert(level);
    }

    let start_offset = match matches.get_one::<String>("start-offset") {
        Some(raw) => Some(raw.parse::<u64>()?),
        None => None,
    };

    let options = FilteringOptions {
        start_offset,
        disabled_levels,
        content_pattern: matches.get_one::<String>("filter").cloned(),
    };

    let (mut view, mut events) = LogView::open(&file_path, options, ViewConfig::default())?;

    let result = match matches.get_one::<String>("export") {
        Some(target) => run_export(&mut view, &mut events, PathBuf::from(target)).await,
        None => run_print(&mut view, &mut events, matches.get_flag("follow")).await,
    };

    view.shutdown().await;
    result
}

/// Export mode: run the save pass and report progress on stderr.
async fn run_export(
    view: &mut LogView,
    events: &mut UnboundedReceiver<ViewEvent>,
    target: PathBuf,
) -> Result<()> {
    view.save_matching_entries(&target)?;

    let mut last_whole = 0u64;
    while let Some(event) = events.recv().await {
        match event {
            ViewEvent::SaveProgress { percent } => {
                let whole = percent as u64;
                if whole > last_whole {
                    last_whole = whole;
                    eprint!("\rsaving... {whole:3}%");
                }
            }
            ViewEvent::SaveFinished { outcome } => {
                eprintln!();
                return match outcome {
                    SaveOutcome::Completed { entries_written } => {
                        eprintln!("{entries_written} entries written to {}", target.display());
                        Ok(())
                    }
                    SaveOutcome::Cancelled => {
                        eprintln!("save cancelled");
                        Ok(())
                    }
                    SaveOutcome::Failed { message } => Err(anyhow::anyhow!("save failed: {message}")),
                };
            }
            _ => {}
        }
    }
    anyhow::bail!("event channel closed before save finished")
}

/// Print mode: page through the file chunk by chunk, printing every row the
/// engine makes available; with `follow`, keep polling for growth afterwards.
async fn run_print(
    view: &mut LogView,
    events: &mut UnboundedReceiver<ViewEvent>,
    follow: bool,
) -> Result<()> {
    let mut printed: u64 = 0;
    let mut poll = tokio::time::interval(Duration::from_millis(500));

    loop {
        tokio::select! {
            advanced = view.pump() => {
                if !advanced {
                    anyhow::bail!("read worker stopped unexpectedly");
                }
            }
            _ = poll.tick(), if follow => {
                view.poll_file();
            }
        }

        while let Ok(event) = events.try_recv() {
            match event {
                ViewEvent::ReadFailed { message } if follow => {
                    eprintln!("read error: {message}");
                }
                ViewEvent::ReadFailed { message } => {
                    anyhow::bail!("read error: {message}");
                }
                ViewEvent::Invalidated { .. } => printed = 0,
                _ => {}
            }
        }

        while printed < view.row_count() {
            match view.request_row(printed) {
                Some(entry) => {
                    println!("{entry}");
                    printed += 1;
                }
                None => break,
            }
        }

        if view.can_fetch_more() {
            view.fetch_more();
        } else if view.eof_reached() && !follow {
            break;
        }
    }

    Ok(())
}

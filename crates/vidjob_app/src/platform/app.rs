use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use vidjob_core::{update, AppState, Msg, UploadCandidate};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::logging;
use super::ui::commands::{self, Command};
use super::ui::render;

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    logging::initialize(config.log_destination, &config.state_dir);
    engine_info!(
        "Starting vidjob: api={} downloads={:?} state={:?}",
        config.api_base,
        config.download_dir,
        config.state_dir
    );

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(&config, msg_tx.clone()).context("starting engine")?;
    let quit = Arc::new(AtomicBool::new(false));

    println!("{}", commands::HELP);
    spawn_input_reader(msg_tx.clone(), quit.clone()).context("starting input reader")?;

    let mut state = AppState::with_page_sizes(config.jobs_per_page, config.dashboard_jobs);
    let _ = msg_tx.send(Msg::Restore {
        persisted_token: runner.persisted_token(),
    });
    drop(msg_tx);

    while let Ok(msg) = msg_rx.recv() {
        if quit.load(Ordering::SeqCst) {
            break;
        }
        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);

        if state.consume_dirty() {
            print_screen(&render::render(&state.view()));
        }
    }

    engine_info!("Shutting down");
    Ok(())
}

fn print_screen(lines: &[String]) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    let _ = write!(out, "> ");
    let _ = out.flush();
}

/// Reads commands from stdin until `quit` or end of input. File reads for
/// `select` happen here so the update loop never blocks on disk.
fn spawn_input_reader(msg_tx: mpsc::Sender<Msg>, quit: Arc<AtomicBool>) -> io::Result<()> {
    thread::Builder::new()
        .name("vidjob-input".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        engine_warn!("Failed to read input: {}", err);
                        break;
                    }
                };
                let msg = match commands::parse(&line) {
                    Ok(None) => continue,
                    Ok(Some(Command::Dispatch(msg))) => msg,
                    Ok(Some(Command::Select(path))) => match read_candidate(&path) {
                        Ok(candidate) => Msg::FileSelected(candidate),
                        Err(err) => {
                            engine_warn!("Failed to read {:?}: {}", path, err);
                            eprintln!("Could not read {}: {}", path.display(), err);
                            continue;
                        }
                    },
                    Ok(Some(Command::Help)) => {
                        println!("{}", commands::HELP);
                        continue;
                    }
                    Ok(Some(Command::Quit)) => break,
                    Err(usage) => {
                        eprintln!("{usage}");
                        continue;
                    }
                };
                if msg_tx.send(msg).is_err() {
                    return;
                }
            }
            quit.store(true, Ordering::SeqCst);
            // Wake the update loop so it notices.
            let _ = msg_tx.send(Msg::NoOp);
        })?;
    Ok(())
}

fn read_candidate(path: &Path) -> io::Result<UploadCandidate> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadCandidate::new(
        file_name,
        commands::media_type_for(path),
        bytes,
    ))
}

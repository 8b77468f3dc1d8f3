use std::io::{BufRead, IsTerminal, Write};

use log::{info, warn};

use sdb::cli::{self, ConfigFile, USAGE};
use sdb::config::Config;
use sdb::monitor::{Action, Monitor};
use sdb::{init_logger, LogLevel};

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("sdb: {e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    init_logger(if args.quiet {
        LogLevel::Off
    } else if args.debug {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    });

    // ── Load config ───────────────────────────────────────────────────────────
    let config_path = match &args.config {
        ConfigFile::Skip => None,
        ConfigFile::Explicit(path) => Some(path.clone()),
        ConfigFile::Search => cli::find_user_config(),
    };
    let config = match config_path {
        None => Config::new(),
        Some(path) => match Config::load_file(&path) {
            Ok((config, errors)) => {
                info!("loaded config {}", path.display());
                for e in errors {
                    warn!("{}: {e}", path.display());
                }
                config
            }
            Err(e) => {
                warn!("{}: {e}", path.display());
                Config::new()
            }
        },
    };

    let mut monitor = Monitor::from_config(&config);

    // ── Load program image ────────────────────────────────────────────────────
    if let Some(path) = &args.image {
        let loaded = std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                monitor.machine.load_image(&bytes).map_err(|e| e.to_string())?;
                Ok(bytes.len())
            });
        match loaded {
            Ok(n) => info!("loaded {n} byte image from {}", path.display()),
            Err(e) => {
                eprintln!("sdb: {}: {e}", path.display());
                std::process::exit(1);
            }
        }
    }

    // ── Expression test file (-t) ─────────────────────────────────────────────
    if let Some(path) = &args.expr_file {
        let src = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("sdb: {}: {e}", path.display());
                std::process::exit(1);
            }
        };
        let (passed, total) = monitor.run_expr_file(&src);
        flush(&mut monitor);
        std::process::exit(if passed == total { 0 } else { 1 });
    }

    // ── Startup command (-c) ──────────────────────────────────────────────────
    if let Some(cmd) = &args.command {
        let action = monitor.exec_line(cmd);
        flush(&mut monitor);
        if action == Action::Quit {
            return;
        }
    }

    if args.batch {
        monitor.exec_line("c");
        flush(&mut monitor);
        return;
    }

    // ── Read loop ─────────────────────────────────────────────────────────────
    let interactive = std::io::stdin().is_terminal();
    let mut lines = std::io::stdin().lock().lines();
    loop {
        if interactive {
            print!("(sdb) ");
            std::io::stdout().flush().ok();
        }
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("sdb: {e}");
                break;
            }
            None => break,
        };
        let action = monitor.exec_line(&line);
        flush(&mut monitor);
        if action == Action::Quit {
            break;
        }
    }
}

fn flush(monitor: &mut Monitor) {
    for line in monitor.take_output() {
        println!("{line}");
    }
}

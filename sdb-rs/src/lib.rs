//! sdb: a simple debugger monitor for an emulated 32-bit machine.
//!
//! The heart of the crate is [`expr`], the expression evaluator behind the
//! `p`, `x` and `w` commands.  [`monitor`] wires it to the command table,
//! [`machine`] is the register file and memory being inspected, and
//! [`watchpoint`] keeps the expressions re-checked after every step.

pub mod cli;
pub mod config;
pub mod expr;
pub mod machine;
pub mod monitor;
pub mod watchpoint;

/// Logging verbosity chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Warn,
    Debug,
}

/// Initialise `env_logger` once.  `RUST_LOG` still refines the filter.
pub fn init_logger(level: LogLevel) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::sync::Once;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Debug => LevelFilter::Debug,
        };
        let mut builder = Builder::from_default_env();
        // -d and -q override RUST_LOG; the default level only fills in for it
        if level != LogLevel::Warn || std::env::var_os("RUST_LOG").is_none() {
            builder.filter_level(filter);
        }
        builder.try_init().ok();
    });
}

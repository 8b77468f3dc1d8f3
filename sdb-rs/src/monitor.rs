//! The monitor: command table, dispatcher and execution control.
//!
//! [`Monitor::exec_line`] runs one line of user input.  Everything meant for
//! the user is appended to [`Monitor::output`]; the caller decides where it
//! goes (stdout in the binary, assertions in tests).

use log::{debug, info, warn};

use crate::config::{Config, Radix, Settings};
use crate::expr::{parse_word, EvalContext, Evaluator, Word};
use crate::machine::{Machine, RunState};
use crate::watchpoint::WatchpointPool;

/// What the read loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Most words one `x` command prints.
pub const MAX_SCAN_WORDS: u32 = 1024;

// ── Command table ─────────────────────────────────────────────────────────────

type Handler = fn(&mut Monitor, &str) -> Action;

pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    handler: Handler,
}

pub const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        description: "Display information about all supported commands",
        handler: Monitor::cmd_help,
    },
    Command {
        name: "c",
        description: "Continue the execution of the program",
        handler: Monitor::cmd_c,
    },
    Command {
        name: "q",
        description: "Exit sdb",
        handler: Monitor::cmd_q,
    },
    Command {
        name: "si",
        description: "Step N instructions (default 1): si [N]",
        handler: Monitor::cmd_si,
    },
    Command {
        name: "info",
        description: "Print registers (info r) or watchpoints (info w)",
        handler: Monitor::cmd_info,
    },
    Command {
        name: "x",
        description: "Scan N words of memory starting at EXPR: x N EXPR",
        handler: Monitor::cmd_x,
    },
    Command {
        name: "p",
        description: "Evaluate an expression: p EXPR",
        handler: Monitor::cmd_p,
    },
    Command {
        name: "w",
        description: "Stop when the value of EXPR changes: w EXPR",
        handler: Monitor::cmd_w,
    },
    Command {
        name: "d",
        description: "Delete watchpoint N: d N",
        handler: Monitor::cmd_d,
    },
];

// ── Monitor ───────────────────────────────────────────────────────────────────

pub struct Monitor {
    pub machine: Machine,
    pub watchpoints: WatchpointPool,
    pub settings: Settings,
    evaluator: Evaluator,
    /// Lines produced for the user since the last [`take_output`](Self::take_output).
    pub output: Vec<String>,
}

impl Monitor {
    pub fn new(settings: Settings) -> Self {
        Self {
            machine: Machine::new(settings.mem_size),
            watchpoints: WatchpointPool::new(),
            evaluator: Evaluator::with_max_tokens(settings.max_tokens),
            settings,
            output: Vec::new(),
        }
    }

    /// Build a monitor and apply the registers, memory and watchpoints a
    /// config file asks for.  Entries that cannot be applied are logged and
    /// skipped.
    pub fn from_config(config: &Config) -> Self {
        let mut mon = Self::new(config.settings.clone());
        for (name, value) in &config.registers {
            if let Err(e) = mon.machine.set_register(name, *value) {
                warn!("config: {e}");
            }
        }
        for &(addr, value) in &config.memory {
            if let Err(e) = mon.machine.write_word(addr, value) {
                warn!("config: {e}");
            }
        }
        for expr in &config.watches {
            if let Err(e) = mon.watchpoints.add(expr, &mon.evaluator, &mon.machine) {
                warn!("config: watch {expr}: {e}");
            }
        }
        info!(
            "monitor ready: {} bytes of memory, {} watchpoint(s)",
            mon.machine.mem_size(),
            mon.watchpoints.len()
        );
        mon
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    fn say(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    /// Execute one line of input.
    pub fn exec_line(&mut self, line: &str) -> Action {
        let line = line.trim();
        let (cmd, args) = line
            .split_once(|c: char| c.is_ascii_whitespace())
            .unwrap_or((line, ""));
        if cmd.is_empty() {
            return Action::Continue;
        }
        match COMMANDS.iter().find(|c| c.name == cmd) {
            Some(c) => {
                debug!("command {cmd} {args:?}");
                (c.handler)(self, args.trim())
            }
            None => {
                self.say(format!("Unknown command '{cmd}'"));
                Action::Continue
            }
        }
    }

    // ── Execution control ─────────────────────────────────────────────────────

    /// Run up to `n` instructions, or until the machine stops if `n` is
    /// `None`.  Watchpoints are checked after every instruction.
    pub fn cpu_exec(&mut self, n: Option<u64>) {
        if self.machine.state().has_ended() {
            self.say("Program execution has ended. To restart the program, exit sdb and run again.");
            return;
        }

        let mut executed = 0u64;
        while n.map_or(true, |n| executed < n) {
            let state = self.machine.step();
            executed += 1;
            if state != RunState::Running {
                break;
            }
            let hits = self.watchpoints.check(&self.evaluator, &self.machine);
            if !hits.is_empty() {
                for hit in hits {
                    self.say(format!("Hardware watchpoint {}: {}", hit.no, hit.expr));
                    self.say(format!("Old value = {}", hit.old));
                    self.say(format!("New value = {}", hit.new));
                }
                self.machine.set_state(RunState::Stopped);
                break;
            }
        }

        match self.machine.state() {
            RunState::Running => self.machine.set_state(RunState::Stopped),
            RunState::Stopped => {}
            RunState::Halted { code } => {
                let verdict = if code == 0 { "HIT GOOD TRAP" } else { "HIT BAD TRAP" };
                let pc = self.machine.pc();
                self.say(format!("sdb: {verdict} at pc = {pc:#010x}"));
            }
            RunState::Aborted { pc } => self.say(format!("sdb: ABORT at pc = {pc:#010x}")),
        }
        debug!("executed {executed} instruction(s), {} in total", self.machine.instret());
    }

    fn format_word(&self, v: Word) -> String {
        match self.settings.radix {
            Radix::Dec => v.to_string(),
            Radix::Hex => format!("{v:#010x}"),
        }
    }

    // ── Handlers ──────────────────────────────────────────────────────────────

    fn cmd_help(&mut self, args: &str) -> Action {
        let lines: Vec<String> = if args.is_empty() {
            COMMANDS
                .iter()
                .map(|c| format!("{} - {}", c.name, c.description))
                .collect()
        } else {
            match COMMANDS.iter().find(|c| c.name == args) {
                Some(c) => vec![format!("{} - {}", c.name, c.description)],
                None => vec![format!("Unknown command '{args}'")],
            }
        };
        self.output.extend(lines);
        Action::Continue
    }

    fn cmd_c(&mut self, _args: &str) -> Action {
        self.cpu_exec(None);
        Action::Continue
    }

    fn cmd_q(&mut self, _args: &str) -> Action {
        Action::Quit
    }

    fn cmd_si(&mut self, args: &str) -> Action {
        let n = if args.is_empty() {
            1
        } else {
            match args.parse::<u64>() {
                Ok(n) => n,
                Err(_) => {
                    self.say(format!("si: invalid step count '{args}'"));
                    return Action::Continue;
                }
            }
        };
        self.cpu_exec(Some(n));
        Action::Continue
    }

    fn cmd_info(&mut self, args: &str) -> Action {
        match args {
            "r" => {
                let lines: Vec<String> = self
                    .machine
                    .registers()
                    .map(|(name, v)| format!("{name:<8}{v:#010x}    {v}"))
                    .collect();
                self.output.extend(lines);
            }
            "w" if self.watchpoints.is_empty() => self.say("No watchpoints."),
            "w" => {
                let mut lines = vec![format!("{:<6}{:<12}{}", "Num", "Value", "What")];
                lines.extend(
                    self.watchpoints
                        .iter()
                        .map(|wp| format!("{:<6}{:<12}{}", wp.no, wp.last, wp.expr)),
                );
                self.output.extend(lines);
            }
            _ => self.say("Usage: info r (registers) | info w (watchpoints)"),
        }
        Action::Continue
    }

    fn cmd_x(&mut self, args: &str) -> Action {
        let Some((count, expr)) = args
            .split_once(|c: char| c.is_ascii_whitespace())
            .and_then(|(n, e)| n.parse::<u32>().ok().map(|n| (n, e.trim())))
        else {
            self.say("Usage: x N EXPR");
            return Action::Continue;
        };
        if count > MAX_SCAN_WORDS {
            self.say(format!("x: N must be at most {MAX_SCAN_WORDS}"));
            return Action::Continue;
        }
        let base = match self.evaluator.evaluate(expr, &self.machine) {
            Ok(v) => v,
            Err(e) => {
                self.say(format!("invalid expression: {e}"));
                return Action::Continue;
            }
        };
        for i in 0..count {
            let addr = base.wrapping_add(i.wrapping_mul(4));
            match self.machine.read_word(addr) {
                Ok(v) => self.say(format!("{addr:#010x}:    {v:#010x}")),
                Err(e) => {
                    self.say(format!("x: {e}"));
                    break;
                }
            }
        }
        Action::Continue
    }

    fn cmd_p(&mut self, args: &str) -> Action {
        if args.is_empty() {
            self.say("Usage: p EXPR");
            return Action::Continue;
        }
        let line = match self.evaluator.evaluate(args, &self.machine) {
            Ok(v) => self.format_word(v),
            Err(e) => format!("invalid expression: {e}"),
        };
        self.say(line);
        Action::Continue
    }

    fn cmd_w(&mut self, args: &str) -> Action {
        if args.is_empty() {
            self.say("Usage: w EXPR");
            return Action::Continue;
        }
        let line = match self.watchpoints.add(args, &self.evaluator, &self.machine) {
            Ok(wp) => format!("Watchpoint {}: {}", wp.no, wp.expr),
            Err(e) => e.to_string(),
        };
        self.say(line);
        Action::Continue
    }

    fn cmd_d(&mut self, args: &str) -> Action {
        let line = match args.parse::<u32>() {
            Ok(no) => match self.watchpoints.delete(no) {
                Ok(wp) => format!("Deleted watchpoint {}: {}", wp.no, wp.expr),
                Err(e) => e.to_string(),
            },
            Err(_) => "Usage: d N".to_owned(),
        };
        self.say(line);
        Action::Continue
    }

    // ── Expression test files ─────────────────────────────────────────────────

    /// Check every `<expected> <expr>` line of `src`.
    ///
    /// Mismatches and unparsable lines are reported in [`output`](Self::output)
    /// followed by a summary.  Returns `(passed, total)`.
    pub fn run_expr_file(&mut self, src: &str) -> (usize, usize) {
        let mut passed = 0;
        let mut total = 0;

        for (i, raw) in src.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            total += 1;

            let Some((expected, expr)) = line
                .split_once(' ')
                .and_then(|(e, x)| parse_word(e).map(|e| (e, x)))
            else {
                self.say(format!("line {lineno}: expected '<value> <expr>'"));
                continue;
            };

            match self.evaluator.evaluate(expr, &self.machine) {
                Ok(v) if v == expected => passed += 1,
                Ok(v) => self.say(format!("line {lineno}: {expr} = {v}, expected {expected}")),
                Err(e) => self.say(format!("line {lineno}: {expr}: {e}")),
            }
        }

        self.say(format!("correct rate: {passed}/{total}"));
        (passed, total)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

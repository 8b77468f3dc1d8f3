//! `sdbrc` configuration file parser.
//!
//! | Directive | Action |
//! |-----------|--------|
//! | `set <key>=<value>` or `set <key> <value>` | monitor setting |
//! | `reg <name>=<value>` | initial register value |
//! | `mem <addr>=<value>` | initial memory word |
//! | `watch <expr>` | watchpoint installed at start-up |
//! | Lines starting with `;` | comment, ignored |
//!
//! Numbers are decimal or `0x` hexadecimal.  Recognised settings are
//! `max_tokens`, `radix` (`dec` or `hex`) and `mem_size`.

use std::path::Path;

use crate::expr::{parse_word, Word, DEFAULT_MAX_TOKENS, MAX_TOKENS};
use crate::machine::DEFAULT_MEM_SIZE;

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading a config file.
#[derive(Debug)]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// How `p` prints its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Radix {
    #[default]
    Dec,
    Hex,
}

/// Monitor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Token capacity of one expression.
    pub max_tokens: usize,
    pub radix: Radix,
    /// Bytes of emulated memory.
    pub mem_size: Word,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            radix: Radix::Dec,
            mem_size: DEFAULT_MEM_SIZE,
        }
    }
}

/// Largest accepted `mem_size`: memory must end within the address space.
const MAX_MEM_SIZE: Word = 0x8000_0000;

/// Parsed configuration.
#[derive(Debug, Default)]
pub struct Config {
    pub settings: Settings,
    pub registers: Vec<(String, Word)>,
    pub memory: Vec<(Word, Word)>,
    pub watches: Vec<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config string.
    ///
    /// Bad lines are reported and skipped; the rest of the file still loads.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            let (cmd, args_str) = line
                .split_once(|c: char| c.is_ascii_whitespace())
                .unwrap_or((line, ""));
            let args_str = args_str.trim();
            let args: Vec<&str> = args_str.split_ascii_whitespace().collect();

            let result = match cmd {
                "set" => parse_set(&args, &mut config.settings),
                "reg" => parse_assignment("reg", &args).and_then(|(name, v)| {
                    let value = parse_number(&v)?;
                    config.registers.push((name, value));
                    Ok(())
                }),
                "mem" => parse_assignment("mem", &args).and_then(|(a, v)| {
                    let addr = parse_number(&a)?;
                    let value = parse_number(&v)?;
                    config.memory.push((addr, value));
                    Ok(())
                }),
                "watch" if args_str.is_empty() => Err("watch: requires an expression".into()),
                "watch" => {
                    config.watches.push(args_str.to_owned());
                    Ok(())
                }
                other => Err(format!("unknown directive '{other}'")),
            };
            if let Err(message) = result {
                errors.push(ConfigError { line: lineno, message });
            }
        }

        (config, errors)
    }

    /// Read and parse a config file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }
}

// ── Arguments ─────────────────────────────────────────────────────────────────

/// Split `<name>=<value>` or `<name> <value>`.
fn parse_assignment(cmd: &str, tokens: &[&str]) -> Result<(String, String), String> {
    if tokens.is_empty() {
        return Err(format!("{cmd}: requires an argument"));
    }

    let (name, value) = if let Some((name, value)) = tokens[0].split_once('=') {
        (name.to_owned(), value.to_owned())
    } else if tokens.len() >= 2 {
        (tokens[0].to_owned(), tokens[1..].join(" "))
    } else {
        return Err(format!("{cmd}: missing value for '{}'", tokens[0]));
    };

    if name.is_empty() {
        return Err(format!("{cmd}: name cannot be empty"));
    }
    Ok((name, value))
}

fn parse_number(s: &str) -> Result<Word, String> {
    parse_word(s).ok_or_else(|| format!("'{s}' is not a number"))
}

// ── set ───────────────────────────────────────────────────────────────────────

fn parse_set(tokens: &[&str], settings: &mut Settings) -> Result<(), String> {
    let (name, value) = parse_assignment("set", tokens)?;
    match name.as_str() {
        "max_tokens" => {
            let n = parse_number(&value)? as usize;
            if n == 0 || n > MAX_TOKENS {
                return Err(format!("set: max_tokens must be between 1 and {MAX_TOKENS}"));
            }
            settings.max_tokens = n;
        }
        "radix" => {
            settings.radix = match value.as_str() {
                "dec" => Radix::Dec,
                "hex" => Radix::Hex,
                other => return Err(format!("set: radix must be 'dec' or 'hex', not '{other}'")),
            };
        }
        "mem_size" => {
            let n = parse_number(&value)?;
            if n == 0 || n > MAX_MEM_SIZE {
                return Err(format!("set: mem_size must be between 1 and {MAX_MEM_SIZE:#x}"));
            }
            settings.mem_size = n;
        }
        other => return Err(format!("set: unknown setting '{other}'")),
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

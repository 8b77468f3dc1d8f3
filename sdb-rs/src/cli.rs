//! Command-line argument parsing.
//!
//! Usage:
//!   sdb [-b] [-d|-q] [-f[<file>]] [-c<cmd>] [-t<file>] [<image>]

use std::path::PathBuf;

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Batch mode: run the program to completion, no prompt (`-b`).
    pub batch: bool,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Suppress all logging (`-q`).
    pub quiet: bool,
    /// Which config file to load.
    pub config: ConfigFile,
    /// Monitor command to run after start-up (`-c<cmd>`).
    pub command: Option<String>,
    /// Expression test file to check and exit (`-t<file>`).
    pub expr_file: Option<PathBuf>,
    /// Program image loaded at the start of memory.
    pub image: Option<PathBuf>,
}

/// How to choose the config file.
#[derive(Debug, Default)]
pub enum ConfigFile {
    /// Search `./.sdbrc`, then the user config directory (default).
    #[default]
    Search,
    /// `-f` with nothing attached: skip config.
    Skip,
    /// `-f<file>` (file attached to the flag): load this specific file.
    Explicit(PathBuf),
}

pub const USAGE: &str = "Usage: sdb [-b] [-d|-q] [-f[<file>]] [-c<cmd>] [-t<file>] [<image>]";

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(&raw[1..])
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            i += 1;
            positional.extend(argv[i..].iter().cloned());
            break;
        }

        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'b' => args.batch = true,
                'd' => args.debug = true,
                'q' => args.quiet = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else {
                        args.config = ConfigFile::Skip;
                    }
                }

                // -c<cmd> and -t<file> take a required value
                flag @ ('c' | 't') => {
                    let value = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err(format!("-{flag} requires an argument"));
                    };
                    if flag == 'c' {
                        args.command = Some(value);
                    } else {
                        args.expr_file = Some(PathBuf::from(value));
                    }
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    if args.debug && args.quiet {
        return Err("-d and -q are mutually exclusive".to_owned());
    }

    match positional.len() {
        0 => {}
        1 => args.image = Some(PathBuf::from(positional.remove(0))),
        n => return Err(format!("too many arguments ({n})")),
    }

    Ok(args)
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Search for the config file in the standard locations.
/// Returns the first path that exists, or `None`.
pub fn find_user_config() -> Option<PathBuf> {
    let local = PathBuf::from("./.sdbrc");
    let user = directories::ProjectDirs::from("", "", "sdb")
        .map(|dirs| dirs.config_dir().join("sdbrc"));
    std::iter::once(local)
        .chain(user)
        .find(|p| p.exists())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

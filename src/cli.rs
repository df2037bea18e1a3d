//! Command-line interface for polyfmt.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files or directories to format; empty or `-` means stdin
    pub inputs: Vec<PathBuf>,

    /// Explicit language label (skips detection)
    pub language: Option<String>,

    /// Detect the language only; do not format
    pub detect: bool,

    /// Exchange JSON request/response documents instead of raw text
    pub json: bool,

    /// Per-tool timeout in seconds
    pub timeout: Option<u64>,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Output to stdout instead of in-place
    pub stdout: bool,

    /// Recursive directory processing
    pub recursive: bool,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Silent mode (no output)
    pub silent: bool,

    /// Enable debug output
    pub debug: bool,
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("polyfmt")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Fred Jones")
        .about("Detects the language of a code snippet and reformats it with the right tool")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to format (omit or use '-' for stdin)")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("language")
                .short('l')
                .long("language")
                .help("Explicit language label (python, javascript, json, ...); skips detection")
                .value_name("LANG"),
        )
        .arg(
            Arg::new("detect")
                .short('d')
                .long("detect")
                .help("Only detect the language, do not format")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .short('j')
                .long("json")
                .help("Read a JSON request document from stdin and write a JSON response")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .help("Per-tool timeout in seconds [default: 30]")
                .value_name("SECS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Config file path (overrides auto-discovery of polyfmt.toml)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("stdout")
                .short('s')
                .long("stdout")
                .help("Write formatted output to stdout instead of in-place")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Process directories recursively")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files/directories matching this glob pattern (repeatable)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .help("Number of parallel jobs for multi-file runs (1 = sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("silent")
                .short('S')
                .long("silent")
                .help("Suppress per-file progress output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Print debug information to stderr")
                .action(ArgAction::SetTrue),
        )
}

/// Parse CLI arguments from the process environment
#[must_use]
pub fn parse_args() -> CliArgs {
    let matches = build_cli().get_matches();
    args_from_matches(&matches)
}

/// Parse CLI arguments from an explicit iterator (used by tests)
#[must_use]
pub fn parse_args_from<I, T>(iter: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_cli().get_matches_from(iter);
    args_from_matches(&matches)
}

fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|v| v.cloned().collect())
            .unwrap_or_default(),
        language: matches.get_one::<String>("language").cloned(),
        detect: matches.get_flag("detect"),
        json: matches.get_flag("json"),
        timeout: matches.get_one::<u64>("timeout").copied(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        stdout: matches.get_flag("stdout"),
        recursive: matches.get_flag("recursive"),
        exclude: matches
            .get_many::<String>("exclude")
            .map(|v| v.cloned().collect())
            .unwrap_or_default(),
        jobs: matches.get_one::<usize>("jobs").copied(),
        silent: matches.get_flag("silent"),
        debug: matches.get_flag("debug"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_reads_stdin() {
        let args = parse_args_from(vec!["polyfmt"]);
        assert!(args.inputs.is_empty());
        assert!(!args.detect);
        assert!(!args.json);
    }

    #[test]
    fn test_language_flag() {
        let args = parse_args_from(vec!["polyfmt", "-l", "python", "file.py"]);
        assert_eq!(args.language.as_deref(), Some("python"));
        assert_eq!(args.inputs.len(), 1);
    }

    #[test]
    fn test_detect_flag() {
        let args = parse_args_from(vec!["polyfmt", "--detect"]);
        assert!(args.detect);
    }

    #[test]
    fn test_json_flag() {
        let args = parse_args_from(vec!["polyfmt", "-j"]);
        assert!(args.json);
    }

    #[test]
    fn test_timeout_flag() {
        let args = parse_args_from(vec!["polyfmt", "--timeout", "5"]);
        assert_eq!(args.timeout, Some(5));
    }

    #[test]
    fn test_timeout_not_set() {
        let args = parse_args_from(vec!["polyfmt"]);
        assert_eq!(args.timeout, None);
    }

    #[test]
    fn test_exclude_single() {
        let args = parse_args_from(vec!["polyfmt", "-r", "-e", "*.min.js", "src/"]);
        assert_eq!(args.exclude, vec!["*.min.js"]);
    }

    #[test]
    fn test_exclude_multiple() {
        let args = parse_args_from(vec![
            "polyfmt",
            "-r",
            "-e",
            "*.min.js",
            "--exclude",
            "vendor*",
            "-e",
            "dist",
            "src/",
        ]);
        assert_eq!(args.exclude, vec!["*.min.js", "vendor*", "dist"]);
    }

    #[test]
    fn test_exclude_empty() {
        let args = parse_args_from(vec!["polyfmt", "file.py"]);
        assert!(args.exclude.is_empty());
    }

    #[test]
    fn test_jobs_flag() {
        let args = parse_args_from(vec!["polyfmt", "--jobs", "4", "-r", "src/"]);
        assert_eq!(args.jobs, Some(4));
    }

    #[test]
    fn test_stdin_dash_input() {
        let args = parse_args_from(vec!["polyfmt", "-"]);
        assert_eq!(args.inputs.len(), 1);
        assert_eq!(args.inputs[0].as_os_str(), "-");
    }

    #[test]
    fn test_debug_flag() {
        let args = parse_args_from(vec!["polyfmt", "-D"]);
        assert!(args.debug);
    }

    #[test]
    fn test_debug_not_set() {
        let args = parse_args_from(vec!["polyfmt"]);
        assert!(!args.debug);
    }

    #[test]
    fn test_silent_flag() {
        let args = parse_args_from(vec!["polyfmt", "-S", "file.py"]);
        assert!(args.silent);
    }
}

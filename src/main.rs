//! polyfmt - language detection and formatting dispatch for code snippets

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use glob::Pattern;
use polyfmt::api::{handle_detect, handle_format, DetectRequest, FormatRequest};
use polyfmt::{detect, format_text, parse_args, CliArgs, Config, Language, Result};
use rayon::prelude::*;
use walkdir::WalkDir;

/// File extensions with a known language, used when formatting files
/// without an explicit `--language`.
const EXTENSION_LANGUAGES: &[(&str, Language)] = &[
    ("py", Language::Python),
    ("js", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("cjs", Language::JavaScript),
    ("ts", Language::TypeScript),
    ("html", Language::Html),
    ("htm", Language::Html),
    ("css", Language::Css),
    ("c", Language::C),
    ("h", Language::C),
    ("cpp", Language::Cpp),
    ("cc", Language::Cpp),
    ("cxx", Language::Cpp),
    ("hpp", Language::Cpp),
    ("java", Language::Java),
    ("cs", Language::CSharp),
    ("go", Language::Go),
    ("rb", Language::Ruby),
    ("php", Language::Php),
    ("json", Language::Json),
    ("xml", Language::Xml),
];

/// Default maximum file size in bytes (100 MB)
/// Files larger than this are skipped to prevent memory exhaustion
const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

fn main() -> Result<()> {
    let args = parse_args();

    // Check if we should read from stdin
    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && args.inputs[0].as_os_str() == "-");

    // If no inputs and running interactively, print usage; otherwise read from stdin
    if args.inputs.is_empty() && io::stdin().is_terminal() {
        polyfmt::build_cli().print_help()?;
        println!();
        return Ok(());
    }

    if use_stdin {
        let config = build_config(&args, None)?;
        return process_stdin(&config, &args);
    }

    // Configure thread pool if --jobs specified
    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                eprintln!("Warning: failed to configure thread pool: {e}");
            }
        }
    }

    let files = collect_files(&args);
    if files.is_empty() {
        if !args.silent {
            eprintln!("No formattable files found.");
        }
        return Ok(());
    }

    // For an explicit config file we use one config for all files; with
    // auto-discovery each file may pick up its own polyfmt.toml.
    let base_config = if args.config.is_none() {
        None
    } else {
        Some(build_config(&args, None)?)
    };

    let failures = AtomicUsize::new(0);
    let use_sequential = args.stdout || args.jobs == Some(1);
    if use_sequential {
        for file in &files {
            if !process_file(file, base_config.as_ref(), &args) {
                failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    } else {
        files.par_iter().for_each(|file| {
            if !process_file(file, base_config.as_ref(), &args) {
                failures.fetch_add(1, Ordering::Relaxed);
            }
        });
    }

    let failed = failures.load(Ordering::Relaxed);
    if failed > 0 {
        if !args.silent {
            eprintln!("{failed} of {} file(s) failed to format", files.len());
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Build configuration from CLI args and optional config file
fn build_config(args: &CliArgs, for_path: Option<&Path>) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        if args.debug {
            eprintln!(
                "[DEBUG] Using explicit config file: {}",
                config_path.display()
            );
        }
        Config::from_toml_file(config_path)?
    } else if let Some(path) = for_path {
        if args.debug {
            let discovered = Config::discover_config_files(path);
            if discovered.is_empty() {
                eprintln!("[DEBUG] No config files discovered for: {}", path.display());
            } else {
                eprintln!("[DEBUG] Discovered config files for {}:", path.display());
                for f in &discovered {
                    eprintln!("[DEBUG]   - {}", f.display());
                }
            }
        }
        Config::from_discovered_files(path)
    } else {
        let cwd = std::env::current_dir()?;
        Config::from_discovered_files(&cwd)
    };

    // CLI arguments override file settings
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    if let Some(message) = config.validate() {
        anyhow::bail!("invalid configuration: {message}");
    }

    if args.debug {
        eprintln!("[DEBUG] Configuration:");
        eprintln!("[DEBUG]   timeout_secs = {}", config.timeout_secs);
        eprintln!("[DEBUG]   min_reliable_len = {}", config.min_reliable_len);
        eprintln!(
            "[DEBUG]   thresholds = strong {} / weak {} / margin {}",
            config.strong_threshold, config.weak_threshold, config.high_margin
        );
        eprintln!("[DEBUG]   tool overrides = {}", config.tools.len());
    }

    Ok(config)
}

/// Process code read from stdin and write the result to stdout
fn process_stdin(config: &Config, args: &CliArgs) -> Result<()> {
    let mut code = String::new();
    io::stdin().read_to_string(&mut code)?;

    if args.json {
        return process_json_request(&code, config, args);
    }

    if args.detect {
        let detection = detect(&code, config);
        println!(
            "{} (confidence: {}, method: {})",
            detection.language, detection.confidence, detection.method
        );
        return Ok(());
    }

    let language = resolve_language(&code, args.language.as_deref(), config, args)?;
    match format_text(&code, language, config) {
        Ok(formatted) => {
            io::stdout().write_all(formatted.as_bytes())?;
            Ok(())
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

/// Serve one JSON request document from stdin
fn process_json_request(body: &str, config: &Config, args: &CliArgs) -> Result<()> {
    if args.detect {
        let request: DetectRequest = serde_json::from_str(body)?;
        let response = handle_detect(&request, config);
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    let request: FormatRequest = serde_json::from_str(body)?;
    let response = handle_format(&request, config);
    println!("{}", serde_json::to_string(&response)?);
    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Resolve the language for a snippet: explicit label wins, then detection.
fn resolve_language(
    code: &str,
    explicit: Option<&str>,
    config: &Config,
    args: &CliArgs,
) -> Result<Language> {
    if let Some(label) = explicit {
        return label
            .parse::<Language>()
            .map_err(|()| anyhow::anyhow!("language `{label}` is not supported"));
    }
    let detection = detect(code, config);
    if args.debug {
        eprintln!(
            "[DEBUG] Detected {} (confidence: {}, method: {})",
            detection.language, detection.confidence, detection.method
        );
    }
    Ok(detection.language)
}

/// Collect all formattable files from the CLI inputs
fn collect_files(args: &CliArgs) -> Vec<PathBuf> {
    let exclude_patterns: Vec<Pattern> = args
        .exclude
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();

    let is_excluded = |path: &Path| {
        exclude_patterns.iter().any(|pattern| {
            path.file_name()
                .map(|name| pattern.matches(&name.to_string_lossy()))
                .unwrap_or(false)
                || pattern.matches(&path.to_string_lossy())
        })
    };

    let mut files = Vec::new();
    for input in &args.inputs {
        if input.is_dir() {
            if !args.recursive {
                if !args.silent {
                    eprintln!(
                        "Skipping directory {} (use --recursive)",
                        input.display()
                    );
                }
                continue;
            }
            for entry in WalkDir::new(input)
                .into_iter()
                .filter_entry(|e| !is_excluded(e.path()))
                .filter_map(std::result::Result::ok)
            {
                let path = entry.path();
                if path.is_file() && extension_language(path).is_some() && !is_too_large(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else if input.is_file() && !is_excluded(input) && !is_too_large(input) {
            files.push(input.clone());
        } else if !input.exists() && !args.silent {
            eprintln!("Warning: {} does not exist", input.display());
        }
    }
    files
}

fn is_too_large(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.len() > DEFAULT_MAX_FILE_SIZE)
        .unwrap_or(false)
}

/// Language for a file path based on its extension.
fn extension_language(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
    EXTENSION_LANGUAGES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, language)| *language)
}

/// Format one file. Returns `true` on success.
fn process_file(path: &Path, base_config: Option<&Config>, args: &CliArgs) -> bool {
    let config = match base_config {
        Some(config) => config.clone(),
        None => match build_config(args, Some(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}: {e}", path.display());
                return false;
            }
        },
    };

    let code = match fs::read_to_string(path) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: failed to read {}: {e}", path.display());
            return false;
        }
    };

    let language = if let Some(label) = &args.language {
        match label.parse::<Language>() {
            Ok(language) => language,
            Err(()) => {
                eprintln!("Error: language `{label}` is not supported");
                return false;
            }
        }
    } else if let Some(language) = extension_language(path) {
        language
    } else {
        detect(&code, &config).language
    };

    match format_text(&code, language, &config) {
        Ok(formatted) => {
            if args.stdout {
                print!("{formatted}");
                return true;
            }
            if formatted == code {
                if !args.silent {
                    eprintln!("{}: already formatted", path.display());
                }
                return true;
            }
            match fs::write(path, &formatted) {
                Ok(()) => {
                    if !args.silent {
                        eprintln!("{}: formatted ({language})", path.display());
                    }
                    true
                }
                Err(e) => {
                    eprintln!("Error: failed to write {}: {e}", path.display());
                    false
                }
            }
        }
        Err(err) => {
            eprintln!("Error: {}: {err}", path.display());
            false
        }
    }
}

//! fortdeps - Fortran dependency directive scanner

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{self, BufReader, IsTerminal, Write};
use std::path::{Path, PathBuf};

use fortdeps::process::{scan_file, scan_reader, SourceDirectives};
use fortdeps::{parse_args, CliArgs, Config, Result};
use glob::Pattern;
use log::{debug, LevelFilter};
use rayon::prelude::*;
use walkdir::WalkDir;

fn main() -> Result<()> {
    let args = parse_args();
    init_logging(&args);

    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && args.inputs[0].as_os_str() == "-");

    // No inputs and an interactive terminal: nothing to read
    if args.inputs.is_empty() && io::stdin().is_terminal() {
        print_usage();
        return Ok(());
    }

    if use_stdin {
        return process_stdin(&args);
    }

    let config = build_config(&args, args.inputs.first().map(PathBuf::as_path))?;

    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                log::warn!("failed to configure thread pool: {e}");
            }
        }
    }

    let files = collect_files(&args, &config);
    if files.is_empty() {
        if !args.silent {
            eprintln!("No Fortran files found to scan.");
        }
        return Ok(());
    }

    let results = if args.jobs == Some(1) {
        scan_files_sequential(&files, &config)
    } else {
        scan_files_parallel(&files, &config)
    };

    let mut stdout = io::stdout().lock();
    let mut errors = 0usize;
    for (path, result) in &results {
        match result {
            Ok(directives) => {
                print_directives(&mut stdout, &path.display().to_string(), directives, &args)?;
            }
            Err(e) => {
                errors += 1;
                eprintln!("Error scanning {}: {e:#}", path.display());
            }
        }
    }
    stdout.flush()?;

    if !args.silent {
        eprintln!("Scanned {} files, {errors} errors.", results.len() - errors);
    }
    if errors > 0 {
        anyhow::bail!("{errors} of {} files could not be scanned", results.len());
    }

    Ok(())
}

/// Install the `env_logger` backend; `RUST_LOG` refines the level chosen here
fn init_logging(args: &CliArgs) {
    let level = if args.debug {
        LevelFilter::Debug
    } else if args.silent {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Build configuration from CLI args and an optional config file
///
/// Without `--config`, config files are discovered from `for_path`
/// (or the current directory) upwards.
fn build_config(args: &CliArgs, for_path: Option<&Path>) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        debug!("Using explicit config file: {}", config_path.display());
        Config::from_toml_file(config_path)?
    } else {
        let start = for_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
        let discovered = Config::discover_config_files(&start);
        if discovered.is_empty() {
            debug!("No config files discovered for: {}", start.display());
        }
        for f in &discovered {
            debug!("Discovered config file: {}", f.display());
        }
        Config::from_discovered_files(&start)
    };

    // Override with CLI arguments
    config.exclude.extend(args.exclude.iter().cloned());
    config
        .fortran_extensions
        .extend(args.fortran_extensions.iter().cloned());
    if args.no_follow_includes {
        config.follow_includes = false;
    }

    debug!("Configuration: {config:?}");

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    Ok(config)
}

/// Collect all files to scan, handling directories and recursive flag
fn collect_files(args: &CliArgs, config: &Config) -> Vec<PathBuf> {
    let exclude_patterns: Vec<Pattern> = config
        .exclude
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();

    let mut files = Vec::new();

    for input in &args.inputs {
        if input.is_file() {
            // Explicit files are scanned whatever their extension
            if !is_excluded(input, &exclude_patterns) {
                files.push(input.clone());
            }
        } else if input.is_dir() {
            let max_depth = if args.recursive { 256 } else { 1 };
            // WalkDir reports symlink loops as errors, which are skipped here
            for entry in WalkDir::new(input)
                .follow_links(true)
                .max_depth(max_depth)
                .into_iter()
                .filter_map(std::result::Result::ok)
            {
                let path = entry.path();
                if path.is_file()
                    && config.is_fortran_file(path)
                    && !is_excluded(path, &exclude_patterns)
                {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            log::warn!("{} does not exist, skipping", input.display());
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Check if a path matches any exclusion pattern
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let path_str = path.to_string_lossy();

    patterns.iter().any(|pattern| {
        // Full path, then each component (covers file and directory names)
        pattern.matches(&path_str)
            || path.components().any(|component| match component {
                std::path::Component::Normal(c) => pattern.matches(&c.to_string_lossy()),
                _ => false,
            })
    })
}

type ScanResults = Vec<(PathBuf, Result<SourceDirectives>)>;

fn scan_files_sequential(files: &[PathBuf], config: &Config) -> ScanResults {
    let options = config.scan_options();
    files
        .iter()
        .map(|path| (path.clone(), scan_file(path, &options)))
        .collect()
}

/// Scan files in parallel using Rayon; results keep the input order
fn scan_files_parallel(files: &[PathBuf], config: &Config) -> ScanResults {
    let options = config.scan_options();
    files
        .par_iter()
        .map(|path| (path.clone(), scan_file(path, &options)))
        .collect()
}

/// Print one `<source>: <kind> <identifier>` line per reported fact
fn print_directives<W: Write>(
    out: &mut W,
    source: &str,
    directives: &SourceDirectives,
    args: &CliArgs,
) -> io::Result<()> {
    for (kind, text) in directives.entries() {
        if args.reports(kind) {
            writeln!(out, "{source}: {kind} {text}")?;
        }
    }
    Ok(())
}

/// Scan stdin; includes are not followed since there is no source directory
fn process_stdin(args: &CliArgs) -> Result<()> {
    let directives = scan_reader(BufReader::new(io::stdin().lock()))?;
    let mut stdout = io::stdout().lock();
    print_directives(&mut stdout, "-", &directives, args)?;
    stdout.flush()?;
    Ok(())
}

fn print_usage() {
    println!(
        "fortdeps v{} - Fortran dependency directive scanner",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("Usage:");
    println!("  fortdeps [OPTIONS] <FILE>...");
    println!("  fortdeps [OPTIONS] -r <DIRECTORY>");
    println!("  fortdeps [OPTIONS] -              # Read from stdin");
    println!();
    println!("Output, one line per directive:");
    println!("  src/fruit.f90: module fruit");
    println!("  src/fruit.f90: use iso_c_wrappers");
    println!("  src/peel.f90: submodule fruit peel");
    println!();
    println!("Options:");
    println!("  -r, --recursive                 Scan directories recursively");
    println!("  -e, --exclude <PATTERN>         Exclude files/dirs matching pattern (repeatable)");
    println!("  -f, --fortran <EXT>             Additional Fortran extension (repeatable)");
    println!("  -k, --kind <KIND>               Only report include/module/submodule/use (repeatable)");
    println!("  -j, --jobs <NUM>                Parallel jobs (0=auto, 1=sequential)");
    println!("  --no-follow-includes            Do not scan included files");
    println!("  -c, --config <FILE>             Config file path (overrides auto-discovery)");
    println!("  -D, --debug                     Enable debug output");
    println!("  -S, --silent                    Silent mode");
    println!("  -h, --help                      Print help");
    println!();
    println!("Config file auto-discovery:");
    println!("  Searches for fortdeps.toml in the home directory and in every");
    println!("  parent directory of the first input. Closer files take precedence.");
}

//! The sieve CLI runs the incremental identity filter over a directory tree.
//!
//! Files with recognized extensions are routed through the cached filter
//! (so repeated invocations with an unchanged tree are served from the
//! persisted cache); everything else is passed through unchanged.

#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use sieve_common::{link_or_copy, walk_tree};
use sieve_filter::{FilterConfig, FilterEngine, Identity};

/// Command-line arguments for the sieve filter.
#[derive(Parser, Debug)]
#[command(name = "sieve", version, about = "Incremental cached file filter")]
struct Cli {
    /// Input directory (a snapshot of the source tree).
    input: PathBuf,

    /// Directory the filtered tree is written to.
    #[arg(short, long)]
    output: PathBuf,

    /// Source extensions routed through the filter (comma-separated).
    #[arg(short, long, value_delimiter = ',')]
    extensions: Vec<String>,

    /// Rewrite matched extensions to this one in the output.
    #[arg(long)]
    target_extension: Option<String>,

    /// Key cache entries by content digest instead of path/size/mtime.
    #[arg(long)]
    content_hash: bool,

    /// Identifier namespacing the persisted cache directory.
    #[arg(long)]
    cache_id: Option<String>,

    /// Directory the persisted cache directory is created under.
    #[arg(long, default_value = "tmp")]
    persist_root: PathBuf,

    /// Load the filter configuration from a TOML file instead of flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(cli)?;
    let mut engine = FilterEngine::new(config, Identity)?;

    let result = engine.run(&cli.input);
    let outcome = result.and_then(|out_dir| {
        export_tree(&out_dir, &cli.output)
            .map_err(|e| sieve_filter::FilterError::Io {
                path: cli.output.clone(),
                source: e,
            })
    });
    // Merge the persisted cache even when the build failed partway; the
    // completed files are still good.
    let teardown = engine.teardown();
    outcome?;
    teardown?;

    if !cli.quiet {
        println!("filtered {} -> {}", cli.input.display(), cli.output.display());
    }
    Ok(())
}

/// Builds the filter configuration from `--config` or from the flags.
fn build_config(cli: &Cli) -> Result<FilterConfig, sieve_filter::ConfigError> {
    if let Some(path) = &cli.config {
        return FilterConfig::load(path);
    }
    let mut config = FilterConfig::new(
        cli.cache_id.clone().unwrap_or_default(),
        &cli.extensions.iter().map(String::as_str).collect::<Vec<_>>(),
    )
    .with_content_hashing(cli.content_hash)
    .with_persist_root(&cli.persist_root);
    if let Some(target) = &cli.target_extension {
        config = config.with_target_extension(target);
    }
    config.validate()?;
    Ok(config)
}

/// Mirrors the engine's output tree at the user-visible output path.
///
/// The previous export is removed first so files dropped from the source
/// tree do not linger at the destination.
fn export_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(to) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    std::fs::create_dir_all(to)?;
    for entry in walk_tree(from)? {
        let dst = to.join(&entry.relative_path);
        if entry.is_dir {
            std::fs::create_dir_all(&dst)?;
        } else {
            link_or_copy(&from.join(&entry.relative_path), &dst)?;
        }
    }
    Ok(())
}

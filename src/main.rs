//! Inkling - a terminal draft editor with inline AI suggestions.
//!
//! # Usage
//!
//! ```bash
//! inkling draft.md
//! inkling --endpoint http://localhost:8787 --auto-suggest draft.md
//! inkling --accept-key ctrl-y --reject-key ctrl-n --save
//! ```

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;

use inkling::app::App;
use inkling::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use inkling::suggest::{GenerationService, HeuristicGenerator, HttpGenerator};

/// A terminal draft editor with inline AI suggestions
#[derive(Parser, Debug)]
#[command(name = "inkling", version, about, long_about = None)]
struct Cli {
    /// Draft to load (the editor never writes it back)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Base URL of the generation service (offline suggestions when unset)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Generation request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Key that accepts a visible suggestion (default: tab)
    #[arg(long, value_name = "KEY")]
    accept_key: Option<String>,

    /// Key that rejects a visible suggestion (default: esc)
    #[arg(long, value_name = "KEY")]
    reject_key: Option<String>,

    /// Request a suggestion automatically after a typing pause
    #[arg(long)]
    auto_suggest: bool,

    /// Typing pause before an automatic suggestion, in milliseconds
    #[arg(long, value_name = "MS")]
    idle_ms: Option<u64>,

    /// Write logs to this file (RUST_LOG controls the level)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            endpoint: self.endpoint.clone(),
            timeout_ms: self.timeout_ms,
            accept_key: self.accept_key.clone(),
            reject_key: self.reject_key.clone(),
            auto_suggest: self.auto_suggest,
            idle_ms: self.idle_ms,
            log_file: self.log_file.clone(),
        }
    }
}

/// The terminal belongs to the UI, so logs only go to a file.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn load_draft(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path.exists() => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read draft {}", path.display())),
        _ => Ok(String::new()),
    }
}

fn make_generator(flags: &ConfigFlags) -> Result<Arc<dyn GenerationService>> {
    match flags.endpoint.as_deref() {
        Some(endpoint) => {
            let generator = HttpGenerator::new(endpoint, flags.timeout())
                .with_context(|| format!("Invalid generation endpoint {endpoint}"))?;
            Ok(Arc::new(generator))
        }
        None => Ok(Arc::new(HeuristicGenerator)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
        println!("Saved defaults to {}", global_path.display());
    }
    if cli.file.is_none() && (cli.save || cli.clear) {
        return Ok(());
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_deref())?;
    tracing::info!(?effective, "configuration resolved");

    let keys = effective.key_bindings().context("Invalid key binding")?;
    let generator = make_generator(&effective)?;
    let draft = load_draft(cli.file.as_deref())?;

    let app = App::new(draft)
        .with_file_path(cli.file)
        .with_generator(generator)
        .with_key_bindings(keys)
        .with_auto_suggest(effective.auto_suggest, effective.idle_delay_ms())
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    let final_text = app.run().context("Application error")?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(final_text.as_bytes())?;
    if !final_text.is_empty() && !final_text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

// src/lib.rs

pub mod artifact;
pub mod build;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod report;
pub mod store;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile};
use crate::engine::{ControllerOptions, WatchController, WatchEvent};
use crate::errors::Reported;
use crate::exec::{Supervisor, TokioLauncher};
use crate::report::{ConsoleReporter, Reporter};
use crate::store::{ArtifactStore, DiskStore, MemoryStore};
use crate::watch::CommandEngine;

/// Load the config, subscribe to the bundler and relaunch the built program
/// after every successful build until Ctrl-C.
pub async fn run(args: CliArgs) -> Result<()> {
    let console = ConsoleReporter::new();
    if !args.no_clear && !args.dry_run {
        console.clear_console();
    }
    let reporter: Arc<dyn Reporter> = Arc::new(console);

    let config_path = PathBuf::from(&args.config);
    let root = config_root_dir(&config_path);
    let cfg = load_config(&config_path, &root, reporter.as_ref())?;

    if args.dry_run {
        print_dry_run(&cfg, &args);
        return Ok(());
    }

    let store: Arc<dyn ArtifactStore> = if args.memory {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(DiskStore)
    };

    let (tx, rx) = mpsc::channel::<WatchEvent>(16);

    let mut engine = CommandEngine::new(root, cfg.engine.clone());

    let options = ControllerOptions {
        in_memory: args.memory,
        override_command: args.execute_command(),
        run: cfg.run.clone(),
        base_dir: engine.root().to_path_buf(),
    };

    let supervisor = Supervisor::new(TokioLauncher::new(), Arc::clone(&reporter));
    let mut controller = WatchController::new(cfg.build, options, store, supervisor, reporter);
    controller.start(&mut engine, tx.clone())?;

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = tx.send(WatchEvent::ShutdownRequested).await;
    });

    controller.run(rx).await?;
    Ok(())
}

/// Load and validate the config, showing a failure on the error sink.
///
/// The returned error is wrapped in [`Reported`] so it is not printed twice.
pub fn load_config(path: &Path, root: &Path, reporter: &dyn Reporter) -> Result<ConfigFile> {
    reporter.info("Loading build options ...");
    load_and_validate(path, root).map_err(|e| {
        reporter.error(&format!("Failed to load build options from {}: {e}", path.display()));
        Reported(e).into()
    })
}

/// Directory holding the config file. The bundler and any `targets_from`
/// command run there, and relative output paths resolve against it.
///
/// A bare file name means the current directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `--dry-run`: show the resolved settings and the command shape, build nothing.
fn print_dry_run(cfg: &ConfigFile, args: &CliArgs) {
    println!("livebuild dry-run");
    println!("  engine.command = {}", cfg.engine.command);
    println!("  engine.watch = {:?}", cfg.engine.watch);
    if !cfg.engine.exclude.is_empty() {
        println!("  engine.exclude = {:?}", cfg.engine.exclude);
    }
    println!("  engine.debounce_ms = {}", cfg.engine.debounce_ms);
    println!();

    println!("targets ({}):", cfg.build.len());
    for (idx, target) in cfg.build.targets().iter().enumerate() {
        println!("  - #{}", idx + 1);
        if !target.context.is_empty() {
            println!("      context: {}", target.context);
        }
        println!("      output.path: {}", target.output.path);
        println!("      output.filename: {}", target.output.filename);
    }
    println!();

    match args.execute_command() {
        Some(cmd) => println!("run: {cmd}"),
        None if args.memory => println!(
            "run: {} {} <artifact source>",
            cfg.run.runtime, cfg.run.inline_flag
        ),
        None => println!("run: {} <artifact path>", cfg.run.runtime),
    }

    debug!("dry-run complete (no build)");
}

//! Recall application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Install the tracing subscriber
//! 3. Load saved windows into the label registry
//! 4. Run the requested subcommand: an interactive session over a simulated
//!    desktop, or a one-shot listing

mod cli;
mod console;
mod session;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use recall_action::overlay::{HelpView, OverlayView};
use recall_action::Dispatcher;
use recall_core::config::RecallConfig;
use recall_core::desktop::{DesktopSnapshot, SimulatedDesktop};
use recall_registry::{LabelRegistry, RegistryStore};

use cli::{CliArgs, CliCommand};
use console::ConsoleSurface;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = RecallConfig::load_or_default(&config_file);

    // Tracing. Logs go to stderr so stdout stays clean for outcomes.
    let level = args.resolve_log_level(&config);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting recall v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Registry.
    let mut registry = LabelRegistry::with_reserved(&config.grammar.forbidden_names);
    let store = args.resolve_storage(&config).map(RegistryStore::new);
    match &store {
        Some(store) => {
            store.load_into(&mut registry)?;
            tracing::info!(path = %store.path().display(), windows = registry.len(), "Saved windows loaded");
        }
        None => tracing::info!("No storage file configured; saved windows live in memory only"),
    }

    match args.command() {
        CliCommand::Run { desktop, json } => {
            let desktop = match desktop {
                Some(path) => SimulatedDesktop::from_snapshot(DesktopSnapshot::load(&path)?),
                None => SimulatedDesktop::new(),
            };
            let mut dispatcher =
                Dispatcher::new(desktop, ConsoleSurface::stdout(), registry, &config);
            if let Some(store) = store {
                dispatcher = dispatcher.with_store(store);
            }

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(session::run(dispatcher, json))?;
        }
        CliCommand::List { json } => print_list(&registry, json)?,
        CliCommand::Help => {
            let view = HelpView::build(&registry, &[], &config.grammar.enders);
            print!("{}", OverlayView::Help(view));
        }
    }

    Ok(())
}

fn print_list(registry: &LabelRegistry, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let entries: Vec<serde_json::Value> = registry
            .entries()
            .map(|e| {
                serde_json::json!({
                    "primary": e.primary,
                    "aliases": e.aliases,
                    "window": e.window,
                    "app": e.app,
                    "title": e.title,
                    "path": e.path,
                    "created_at": e.created_at.to_datetime().to_rfc3339(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if registry.is_empty() {
        println!("No saved windows.");
        return Ok(());
    }
    for entry in registry.entries() {
        println!(
            "{:<24} {:<16} {}",
            entry.display_names(),
            entry.app.0,
            entry.created_at.to_datetime().format("%Y-%m-%d %H:%M")
        );
        if let Some(path) = &entry.path {
            println!("{:<24} {}", "", path.display());
        }
    }
    Ok(())
}

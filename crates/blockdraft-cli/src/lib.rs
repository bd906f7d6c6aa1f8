//! CLI logic for the Blockdraft diagram tool.
//!
//! Every subcommand runs against a [`DiagramService`] backed by a
//! [`FileStore`] in the configured data directory.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::{fs, io::Write, path::PathBuf, sync::Arc};

use log::{info, warn};
use serde_json::Value;

use blockdraft::{
    BlockdraftError,
    model::Diagram,
    reconciler::CanvasEvent,
    service::DiagramService,
    store::FileStore,
};

/// Run the Blockdraft CLI application
///
/// Results meant for the user (ids, listings, dumps, paths) are written to
/// `out`; everything else goes to the log.
///
/// # Errors
///
/// Returns `BlockdraftError` for:
/// - Configuration loading errors
/// - Unreadable or malformed input files
/// - Unknown diagram ids
/// - Store and export failures
/// - Canvas events that do not apply, or whose changes the store refused
pub fn run(args: &Args, out: &mut impl Write) -> Result<(), BlockdraftError> {
    let cli_config = config::load_config(args.config.as_ref())?;
    let data_dir = cli_config.data_dir(args.data_dir.as_deref());
    info!(data_dir = data_dir.display().to_string(); "Opening diagram store");

    let store = Arc::new(FileStore::open(&data_dir)?);
    let service = Arc::new(DiagramService::new(cli_config.into_app(), store));

    match &args.command {
        Command::Generate { description, title } => {
            let diagram = service.generate_titled(description, title.as_deref())?;
            writeln!(out, "{}", diagram.id())?;
        }
        Command::List => {
            for diagram in service.list()? {
                writeln!(out, "{}", summary(&diagram))?;
            }
        }
        Command::Show { id } => {
            let diagram = service.get(*id)?;
            out.write_all(&diagram.to_json_bytes()?)?;
            writeln!(out)?;
        }
        Command::Update { id, payload } => {
            let payload: Value = read_json(payload)?;
            let diagram = service.update(*id, &payload)?;
            writeln!(out, "{}", summary(&diagram))?;
        }
        Command::Delete { id } => {
            service.delete(*id)?;
        }
        Command::Export { id, format, output } => {
            let artifact = service.export(*id, *format)?;
            let path = output
                .as_ref()
                .map_or_else(|| PathBuf::from(artifact.file_name()), PathBuf::from);
            fs::write(&path, artifact.bytes())?;
            info!(output_file = path.display().to_string(); "Export written");
            writeln!(out, "{}", path.display())?;
        }
        Command::Rebase { id } => {
            let (_, rebound) = service.rebase_connections(*id)?;
            writeln!(out, "{rebound}")?;
        }
        Command::Replay { id, events } => {
            let events: Vec<CanvasEvent> = read_json(events)?;
            let (mut canvas, failures) = service.open_canvas(*id)?;
            let mut committed = 0;
            for (idx, event) in events.into_iter().enumerate() {
                match canvas.handle(event) {
                    Ok(Some(_)) => committed += 1,
                    Ok(None) => {}
                    Err(err) => {
                        warn!(event_index = idx, err:%; "Replay stopped at rejected event");
                        return Err(err.into());
                    }
                }
            }
            let failed = failures.count();
            info!(diagram_id:% = id, committed, failed; "Replay finished");
            writeln!(out, "{committed}\t{failed}")?;
            if failed > 0 {
                return Err(BlockdraftError::UnsavedChanges { id: *id, failed });
            }
        }
    }

    Ok(())
}

fn summary(diagram: &Diagram) -> String {
    format!(
        "{}\t{}\t{}",
        diagram.id(),
        diagram.updated_at().to_rfc3339(),
        diagram.title()
    )
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, BlockdraftError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|err| BlockdraftError::InputValidation(format!("{path}: {err}")))
}

//! Formflow CLI Application
//!
//! Command-line front end for the form flow engine: walks the built-in flows
//! one request at a time and manages the stored flow instances.

mod args;
mod cli;
mod demo;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use formflow_core::storage::SqliteStorageBuilder;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let storage = SqliteStorageBuilder::new()
        .with_database_path(database_file)
        .build()
        .context("Failed to initialize flow storage")?;

    let renderer = TerminalRenderer::new(!no_color);
    let mut cli = Cli::new(storage, demo::registry(), renderer);

    info!("Formflow started");

    match command {
        Some(Handle(args)) => cli.handle(&args),
        Some(Instances { flow }) => cli.list_instances(flow.as_deref()),
        Some(Show { id }) => cli.show_instance(&id),
        Some(Delete { id }) => cli.delete_instance(&id),
        Some(Flows) | None => cli.list_flows(),
    }
}

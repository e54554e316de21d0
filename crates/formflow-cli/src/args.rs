use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use formflow_core::SubmitAction;

/// Drive multi-step form flows from the terminal
///
/// Every `handle` invocation is one request against a flow instance. The
/// instance is persisted between invocations, so a flow can be walked through
/// step by step by repeating the command with the printed parameters.
#[derive(Parser)]
#[command(version, about, name = "formflow")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/formflow/formflow.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the registered flows
    Flows,
    /// Send one request to a flow
    #[command(alias = "h")]
    Handle(HandleArgs),
    /// List stored flow instances
    #[command(alias = "ls")]
    Instances {
        /// Only list instances of this flow
        #[arg(long)]
        flow: Option<String>,
    },
    /// Show the stored state of an instance
    Show {
        /// Instance id
        id: String,
    },
    /// Delete a stored instance
    Delete {
        /// Instance id
        id: String,
    },
}

#[derive(ClapArgs)]
pub struct HandleArgs {
    /// Name of the flow
    pub flow: String,

    /// Instance to continue; a new instance is started when omitted
    #[arg(short, long)]
    pub instance_id: Option<String>,

    /// Step the request addresses
    #[arg(short, long)]
    pub step: Option<String>,

    /// Submit the current step in this direction (forward or back)
    #[arg(long)]
    pub submit: Option<SubmitAction>,

    /// Submitted form field, repeatable
    #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

impl HandleArgs {
    /// A request with a submit direction or fields is a submission.
    pub fn is_submission(&self) -> bool {
        self.submit.is_some() || !self.fields.is_empty()
    }
}

fn parse_field(value: &str) -> Result<(String, String), String> {
    let (key, field_value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{value}'"))?;
    if key.is_empty() {
        return Err(format!("missing field name in '{value}'"));
    }
    Ok((key.to_string(), field_value.to_string()))
}

// src/cli/dispatch.rs
//! Routes parsed commands to their handlers.

use super::args::Commands;
use super::handlers::{self, Session};
use crate::exit::ShieldExit;
use anyhow::Result;
use std::path::Path;

/// Executes the parsed command.
///
/// # Errors
/// Returns error if the config cannot be loaded or the handler fails.
pub fn execute(command: Commands, config: Option<&Path>) -> Result<ShieldExit> {
    match command {
        Commands::Auc { graph, mode, json } => {
            let session = Session::open(config, &graph, mode)?;
            handlers::handle_auc(session, json)
        }
        Commands::Predict {
            graph,
            predictor,
            top,
            json,
        } => {
            let session = Session::open(config, &graph, None)?;
            handlers::handle_predict(session, &predictor, top, json)
        }
        Commands::Shield {
            graph,
            budget,
            pool,
            mode,
            json,
        } => {
            let session = Session::open(config, &graph, mode)?;
            handlers::handle_shield(session, budget, pool, json)
        }
    }
}

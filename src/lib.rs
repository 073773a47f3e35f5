// src/lib.rs
//! Mutable graphs with transactional undo, cached link-prediction scores,
//! rankings and AUC evaluation.

pub mod auc;
pub mod cli;
pub mod config;
pub mod error;
pub mod exit;
pub mod graph;
pub mod montecarlo;
pub mod predict;
pub mod rank;
pub mod transaction;

pub use error::{Result, ShieldError};

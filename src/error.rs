// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShieldError {
    #[error("node {node} is out of range for a graph of size {size}")]
    NodeOutOfRange { node: usize, size: usize },

    #[error("self-loop requested on node {0}")]
    SelfLoop(usize),

    #[error("no edit history is being recorded")]
    NoHistory,

    #[error("edge directedness does not match the graph")]
    DirectednessMismatch,

    #[error("invalid probe edge: {0}")]
    InvalidProbe(String),

    #[error("probe set is empty")]
    EmptyProbeSet,

    #[error("graph has no non-edge outside the probe set")]
    NoNegativePairs,

    /// Adjacency no longer matches its recorded state. Not recoverable.
    #[error("graph state corrupted: {0}")]
    StateCorrupted(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

pub type Result<T> = std::result::Result<T, ShieldError>;

// Allow `?` on std::io::Error by converting to ShieldError::Io with unknown path.
impl From<std::io::Error> for ShieldError {
    fn from(source: std::io::Error) -> Self {
        ShieldError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

impl From<toml::de::Error> for ShieldError {
    fn from(e: toml::de::Error) -> Self {
        ShieldError::Config(e.to_string())
    }
}

// src/graph/mod.rs
pub mod adjacency;
pub mod components;
pub mod core;
pub mod edge;
pub mod generators;
pub mod history;
pub mod node_set;
pub mod observer;

pub use self::core::{Graph, GraphId};
pub use self::edge::Edge;
pub use self::history::Change;
pub use self::node_set::NodeSet;
pub use self::observer::{EventLog, GraphEvent, GraphObserver, ObserverId};

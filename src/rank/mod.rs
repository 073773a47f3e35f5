// src/rank/mod.rs
pub mod bounded;
pub mod ranking;

pub use bounded::BoundedRanking;
pub use ranking::Ranking;

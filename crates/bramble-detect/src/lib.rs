pub mod scoring;
pub mod signals;

pub use scoring::{PatternDecoder, ScoringEngine, TimingDecoder};

pub mod distribution;
pub mod pattern;
pub mod trajectory;

//! Queue engine: orderings, shuffle and repeat.

mod engine;

pub use engine::{QueueEngine, RepeatMode};

#[cfg(test)]
mod tests;

//! Application model types: `App` and `Pane`.

mod model;

pub use model::{App, Pane};

#[cfg(test)]
mod tests;

pub mod subscribers;
pub mod strategies;

pub use subscribers::*;

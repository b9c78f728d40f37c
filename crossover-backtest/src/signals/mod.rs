pub mod crossover;

pub use crossover::{detect_crossover, SignalGenerator};

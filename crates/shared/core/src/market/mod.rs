//! Market observations fed through the simulated venue

mod tick;

pub use tick::{DepthLevel, DepthProfile, Tick};

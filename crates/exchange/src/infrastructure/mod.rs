mod latency;
mod resting;

pub use latency::InflightQueue;
pub use resting::{RestingBook, RestingOrder};

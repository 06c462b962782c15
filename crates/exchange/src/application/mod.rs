mod executor;
mod validation;

pub use executor::{ExecutorConfig, OrderExecutor};
pub use validation::validate_order;

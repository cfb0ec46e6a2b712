pub mod error;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod parsing;
pub mod pipeline;
pub mod report;
pub mod scaling;

pub use error::{Error, Result};

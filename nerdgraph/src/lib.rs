pub mod client;
pub mod errors;
pub mod graphql;
pub mod types;

pub use client::ConfigClient;
pub use errors::NerdGraphError;
pub use graphql::{NerdGraphClient, NerdGraphConfig};
pub use types::{ServiceError, ThresholdUpdate};

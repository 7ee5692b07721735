pub mod api;
pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod models;
pub mod normalize;
pub mod notify;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod store;

#[cfg(test)]
mod test_server;

pub use error::{Result, TrackerError};
pub use models::{Listing, Operation};
pub use pipeline::{ListingsProvider, RunOptions, RunOutcome, RunReport};

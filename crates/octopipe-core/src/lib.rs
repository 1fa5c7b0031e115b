pub mod client;
pub mod config;
pub mod error;
pub mod import;
pub mod io;
pub mod paths;
pub mod reconcile;
pub mod remote;
pub mod scope;
pub mod substitute;
pub mod types;
pub mod variables;

#[cfg(test)]
mod testing;

pub use error::{OctopipeError, Result};

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{HashtreeError, Result};

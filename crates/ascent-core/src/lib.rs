pub mod adherence;
pub mod assessment;
pub mod config;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod io;
pub mod practice;
pub mod progress;
pub mod store;
pub mod streak;
pub mod subscription;
pub mod types;

pub use error::{AscentError, Result};

pub mod catalog;
pub mod check;
pub mod config;
pub mod pipeline;
pub mod pointer;

mod error;

pub use error::{Error, Result};

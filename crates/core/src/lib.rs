//! Domain types shared by the propchain crates.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::{CoreError, Result};

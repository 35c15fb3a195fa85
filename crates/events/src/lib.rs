//! Progress events for propchain workflows
//!
//! This crate provides the event bus and event types a presentation layer
//! consumes independently of the workflow's control flow.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;

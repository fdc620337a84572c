//! Core transition engine for the delivery order system.
//!
//! Ties the domain crates together: the controller validates a requested
//! status change against the order's delivery graph and dispatches the
//! matching status handler, which performs the partner calls and order
//! mutations for that status. The builder is the composition root that
//! turns configuration into a ready controller.

pub mod builder;
pub mod controller;
pub mod handlers;

pub use builder::{BuilderError, TransitionEngineBuilder};
pub use controller::{TransitionController, TransitionError};
pub use handlers::{HandlerError, StatusHandler};

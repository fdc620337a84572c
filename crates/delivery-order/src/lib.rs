//! Order domain module for the delivery system.
//!
//! This module compiles partner-supplied delivery graphs into validated
//! transition tables and exposes the state machine that decides whether a
//! requested status change is legal. It performs validation only: no order
//! fields are mutated and no external calls happen at this layer.

pub mod graph;
pub mod state_machine;

pub use graph::{DeliveryGraph, DeliveryGraphError, DeliveryGraphStep, Transition};
pub use state_machine::{OrderStateMachine, OrderTransitionError, OrderValidationError};

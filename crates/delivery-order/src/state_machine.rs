//! Order state machine over a compiled delivery graph.
//!
//! The machine is an explicit transition table: a mapping from
//! `(current status, trigger)` to the destination status, built once from
//! the graph and queried directly. It decides legality only: order fields
//! and external systems are never touched here, and a rejected transition
//! leaves the current status unchanged.

use crate::graph::DeliveryGraph;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised when constructing a state machine from bad inputs.
#[derive(Debug, Error)]
pub enum OrderValidationError {
	#[error("initial_status is required")]
	InitialStatusRequired,
	#[error("delivery_graph is required")]
	DeliveryGraphRequired,
}

/// An illegal status change was requested.
#[derive(Debug, Error)]
#[error("Not allow transition from {from} to {to}")]
pub struct OrderTransitionError {
	pub from: String,
	pub to: String,
}

/// Validates status changes for one order against its partner's graph.
pub struct OrderStateMachine {
	/// `(source, trigger)` -> destination status.
	table: HashMap<(String, String), String>,
	current: String,
}

impl OrderStateMachine {
	/// Builds the machine from a compiled graph and the order's current
	/// status code.
	pub fn new(
		graph: &DeliveryGraph,
		initial_status: &str,
	) -> Result<Self, OrderValidationError> {
		if initial_status.is_empty() {
			return Err(OrderValidationError::InitialStatusRequired);
		}
		if graph.is_empty() {
			return Err(OrderValidationError::DeliveryGraphRequired);
		}

		let table = graph
			.transitions()
			.map(|t| {
				(
					(t.source.clone(), t.trigger.clone()),
					t.dest.clone(),
				)
			})
			.collect();

		Ok(Self {
			table,
			current: initial_status.to_string(),
		})
	}

	pub fn current_status(&self) -> &str {
		&self.current
	}

	/// Advances to `next_status` if the graph allows it from the current
	/// status, otherwise fails and leaves the machine unchanged.
	pub fn transition_to(&mut self, next_status: &str) -> Result<(), OrderTransitionError> {
		let key = (self.current.clone(), next_status.to_string());
		match self.table.get(&key) {
			Some(dest) => {
				self.current = dest.clone();
				Ok(())
			}
			None => Err(OrderTransitionError {
				from: self.current.clone(),
				to: next_status.to_string(),
			}),
		}
	}
}

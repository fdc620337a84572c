//! Delivery graph compilation.
//!
//! A delivery graph is a partner-supplied ordered list of step descriptors,
//! stored as JSON. Compilation validates every step against the expected
//! schema and checks that all transition endpoints reference statuses that
//! actually exist in the graph; a dangling endpoint is a compile-time
//! failure, never silently dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while compiling a delivery graph.
#[derive(Debug, Error)]
pub enum DeliveryGraphError {
	/// A step failed schema validation (missing field, wrong type).
	#[error("invalid delivery graph: {0}")]
	Validation(String),
	/// A transition references a status no step in the graph declares.
	#[error("transition '{trigger}' references unknown status '{status}'")]
	UnknownStatus { trigger: String, status: String },
}

/// A single allowed transition between two statuses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transition {
	/// Trigger name; call sites trigger transitions by the code of the
	/// status they want to reach.
	pub trigger: String,
	pub source: String,
	pub dest: String,
}

/// One step of a delivery graph.
///
/// `status` is the canonical state identifier and must equal the persisted
/// `Status.code`. The display fields are carried through untouched; step
/// order determines display position but has no effect on legality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryGraphStep {
	pub id: i64,
	pub status: String,
	pub icon: String,
	pub slug: String,
	pub name_en: String,
	pub name_ru: String,
	#[serde(default)]
	pub position: Option<i32>,
	#[serde(default)]
	pub button_name: Option<String>,
	#[serde(default)]
	pub transitions: Vec<Transition>,
}

/// A validated, ordered delivery graph.
#[derive(Debug, Clone)]
pub struct DeliveryGraph {
	steps: Vec<DeliveryGraphStep>,
}

impl DeliveryGraph {
	/// Compiles raw graph JSON (an array of step objects) into a validated
	/// graph.
	///
	/// Steps with zero transitions are legal: terminal statuses have none.
	pub fn compile(raw: &serde_json::Value) -> Result<Self, DeliveryGraphError> {
		let steps: Vec<DeliveryGraphStep> = serde_json::from_value(raw.clone())
			.map_err(|e| DeliveryGraphError::Validation(e.to_string()))?;

		let graph = Self { steps };

		for transition in graph.transitions() {
			for endpoint in [&transition.source, &transition.dest] {
				if !graph.statuses().any(|s| s == endpoint.as_str()) {
					return Err(DeliveryGraphError::UnknownStatus {
						trigger: transition.trigger.clone(),
						status: endpoint.clone(),
					});
				}
			}
		}

		Ok(graph)
	}

	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	pub fn steps(&self) -> &[DeliveryGraphStep] {
		&self.steps
	}

	/// Status codes in graph order.
	pub fn statuses(&self) -> impl Iterator<Item = &str> {
		self.steps.iter().map(|step| step.status.as_str())
	}

	/// All transitions of the graph, in step order.
	pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
		self.steps.iter().flat_map(|step| step.transitions.iter())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn step(id: i64, status: &str, transitions: serde_json::Value) -> serde_json::Value {
		json!({
			"id": id,
			"status": status,
			"icon": status,
			"slug": status.replace('_', "-"),
			"name_en": status,
			"name_ru": status,
			"position": id,
			"button_name": null,
			"transitions": transitions,
		})
	}

	#[test]
	fn test_compile_valid_graph() {
		let raw = json!([
			step(1, "new", json!([{"trigger": "send_otp", "source": "new", "dest": "send_otp"}])),
			step(2, "send_otp", json!([])),
		]);

		let graph = DeliveryGraph::compile(&raw).unwrap();
		assert_eq!(graph.statuses().collect::<Vec<_>>(), vec!["new", "send_otp"]);
		assert_eq!(graph.transitions().count(), 1);
	}

	#[test]
	fn test_terminal_step_without_transitions_is_legal() {
		let raw = json!([step(1, "delivered", json!([]))]);
		let graph = DeliveryGraph::compile(&raw).unwrap();
		assert_eq!(graph.transitions().count(), 0);
	}

	#[test]
	fn test_compile_fails_on_missing_field() {
		// No `status` field.
		let raw = json!([{
			"id": 1,
			"icon": "new",
			"slug": "new",
			"name_en": "New",
			"name_ru": "Новая",
			"transitions": [],
		}]);

		let err = DeliveryGraph::compile(&raw).unwrap_err();
		assert!(matches!(err, DeliveryGraphError::Validation(_)));
	}

	#[test]
	fn test_compile_fails_on_wrong_type() {
		let raw = json!([{
			"id": "not-a-number",
			"status": "new",
			"icon": "new",
			"slug": "new",
			"name_en": "New",
			"name_ru": "Новая",
			"transitions": [],
		}]);

		assert!(matches!(
			DeliveryGraph::compile(&raw),
			Err(DeliveryGraphError::Validation(_))
		));
	}

	#[test]
	fn test_compile_fails_on_dangling_transition_dest() {
		let raw = json!([step(
			1,
			"new",
			json!([{"trigger": "ghost", "source": "new", "dest": "ghost"}])
		)]);

		let err = DeliveryGraph::compile(&raw).unwrap_err();
		match err {
			DeliveryGraphError::UnknownStatus { status, .. } => assert_eq!(status, "ghost"),
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn test_step_order_is_preserved() {
		let raw = json!([
			step(3, "third", json!([])),
			step(1, "first", json!([])),
			step(2, "second", json!([])),
		]);

		let graph = DeliveryGraph::compile(&raw).unwrap();
		assert_eq!(
			graph.statuses().collect::<Vec<_>>(),
			vec!["third", "first", "second"]
		);
	}
}

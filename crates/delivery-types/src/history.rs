//! Status history rows and transition audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only log entry recording that an order entered a status.
///
/// Rows are only ever deleted by the restore-to-new operation, which wipes
/// an order's history and re-inserts a single `new` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusHistoryRecord {
	pub order_id: i64,
	pub status_id: i64,
	pub created_at: DateTime<Utc>,
}

/// Who asked for a status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Initiator {
	pub user_id: i64,
	/// Profile/role of the calling user, e.g. "courier" or "bank_manager".
	pub profile: String,
}

/// Audit record written by the controller for every successful transition.
///
/// Distinct from [`StatusHistoryRecord`]: the audit log captures who moved
/// the order from which code to which, the history log captures the statuses
/// an order has been in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionAudit {
	pub order_id: i64,
	pub from_code: String,
	pub to_code: String,
	pub initiator: Initiator,
	pub created_at: DateTime<Utc>,
}

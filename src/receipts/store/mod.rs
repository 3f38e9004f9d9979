pub mod in_memory;

pub use in_memory::InMemoryReceiptStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line entry on a receipt.
#[derive(
	Default, Clone, Debug, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Item {
	pub short_description: String,
	pub price: String,
}

/// A stored purchase receipt.
///
/// `points` stays `None` until the first points query computes and
/// caches the score, so a legitimately zero score is distinguishable
/// from "not yet computed".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
	pub id: String,
	pub retailer: String,
	pub purchase_date: String,
	pub purchase_time: String,
	pub items: Vec<Item>,
	pub total: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub points: Option<u64>,
}

/// The client-supplied part of a receipt.
///
/// Only the shape is checked at submission; whether `total`, prices,
/// date and time parse into what the scoring rules need is deferred
/// to the first points query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSubmission {
	pub retailer: String,
	pub purchase_date: String,
	pub purchase_time: String,
	pub items: Vec<Item>,
	pub total: String,
}

impl Receipt {
	fn new_key() -> String {
		Uuid::new_v4().to_string()
	}

	/// Builds the full record from a submission, minting the id here
	/// so callers can never supply their own.
	#[must_use]
	pub fn from_submission(submission: ReceiptSubmission) -> Self {
		Self {
			id: Self::new_key(),
			retailer: submission.retailer,
			purchase_date: submission.purchase_date,
			purchase_time: submission.purchase_time,
			items: submission.items,
			total: submission.total,
			points: None,
		}
	}
}

#[async_trait]
pub trait ReceiptStore: Send + Sync {
	/// Assigns a fresh id, stores the full record and returns the id.
	/// Never overwrites an existing record.
	async fn insert(
		&self,
		submission: ReceiptSubmission,
	) -> Result<String>;

	async fn get(&self, id: &str) -> Option<Receipt>;

	/// One-time cache write of a computed score.
	async fn set_points(&self, id: &str, points: u64) -> Result<()>;

	/// All stored receipts in insertion order.
	async fn list(&self) -> Vec<Receipt>;
}

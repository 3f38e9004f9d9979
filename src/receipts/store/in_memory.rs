use super::{Receipt, ReceiptStore, ReceiptSubmission};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

#[derive(Default)]
struct Records {
	by_id: HashMap<String, Receipt>,
	// insertion order of the ids, so `list` is stable
	order: Vec<String>,
}

/// Process-lifetime receipt store backed by a mutex-guarded map.
///
/// The mutex serializes insert, lookup and the one-time points-cache
/// write; id uniqueness comes from the v4 uuid, not from locking.
#[derive(Default)]
pub struct InMemoryReceiptStore {
	db: Arc<Mutex<Records>>,
}

#[async_trait]
impl ReceiptStore for InMemoryReceiptStore {
	async fn insert(
		&self,
		submission: ReceiptSubmission,
	) -> Result<String> {
		let receipt = Receipt::from_submission(submission);
		let id = receipt.id.clone();

		let mut db = self.db.lock().await;
		if db.by_id.contains_key(&id) {
			return Err(Error::Custom(format!(
				"duplicate receipt id: {}",
				id
			)));
		}
		db.order.push(id.clone());
		db.by_id.insert(id.clone(), receipt);

		Ok(id)
	}

	async fn get(&self, id: &str) -> Option<Receipt> {
		self.db.lock().await.by_id.get(id).cloned()
	}

	async fn set_points(&self, id: &str, points: u64) -> Result<()> {
		let mut db = self.db.lock().await;
		let receipt = db.by_id.get_mut(id).ok_or_else(|| {
			Error::ReceiptNotFound(id.to_string())
		})?;
		receipt.points = Some(points);

		Ok(())
	}

	async fn list(&self) -> Vec<Receipt> {
		let db = self.db.lock().await;
		db.order
			.iter()
			.filter_map(|id| db.by_id.get(id))
			.cloned()
			.collect()
	}
}

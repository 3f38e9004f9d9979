pub mod points;
pub mod store;

use crate::{
	error::{self, Error},
	rejection::PointsFailure,
	CustomModule, ModuleResources,
};
use frunk::Hlist;
use serde::Serialize;
use std::sync::Arc;
use store::{Receipt, ReceiptStore, ReceiptSubmission};
use tracing::instrument;
use warp::{
	filters::BoxedFilter, hyper::StatusCode, Filter, Rejection,
	Reply,
};

pub struct Receipts {}

/// JSON body of a successful submission.
#[derive(Serialize)]
struct ReturnId {
	id: String,
}

/// JSON body of a successful points query.
#[derive(Serialize)]
struct ReturnPoints {
	points: u64,
}

pub struct ReceiptsResource {
	store: Arc<dyn ReceiptStore>,
}

impl ReceiptsResource {
	#[must_use]
	pub fn new(store: Arc<dyn ReceiptStore>) -> Self {
		Self { store }
	}

	/// Stores a submission and returns the assigned id.
	#[instrument(skip(self, submission))]
	pub async fn submit(
		&self,
		submission: ReceiptSubmission,
	) -> error::Result<String> {
		let id = self.store.insert(submission).await?;

		tracing::info!(%id, "receipt stored");

		Ok(id)
	}

	/// Returns the points for a stored receipt.
	///
	/// The score is computed on the first query and cached on the
	/// record; later queries return the cached value untouched, even
	/// when it is zero.
	#[instrument(skip(self))]
	pub async fn points(&self, id: &str) -> error::Result<u64> {
		let receipt = self.store.get(id).await.ok_or_else(|| {
			Error::ReceiptNotFound(id.to_string())
		})?;

		if let Some(points) = receipt.points {
			return Ok(points);
		}

		let points = points::calculate(&receipt)?;
		self.store.set_points(id, points).await?;

		tracing::info!(%id, points, "receipt scored");

		Ok(points)
	}

	/// All stored receipts in submission order, for diagnostics.
	pub async fn list(&self) -> Vec<Receipt> {
		self.store.list().await
	}
}

impl CustomModule for Receipts {
	type Resources = Hlist![Arc<ReceiptsResource>];

	fn create_filter<S: ModuleResources<Self>>(
		server: std::sync::Arc<S>,
	) -> warp::filters::BoxedFilter<(Box<dyn warp::Reply>,)> {
		let receipts = warp::any().map(move || {
			let (resource, _) =
				server.clone().get_server_resources().pluck();
			resource
		});

		let process_filter = warp::path!("receipts" / "process")
			.and(warp::post())
			.and(warp::body::json::<ReceiptSubmission>())
			.and(receipts.clone())
			.and_then(process_filter_fn);

		let points_filter =
			warp::path!("receipts" / String / "points")
				.and(warp::get())
				.and(receipts.clone())
				.and_then(points_filter_fn);

		let list_filter = warp::path!("receipts")
			.and(warp::get())
			.and(receipts)
			.and_then(list_filter_fn);

		let filters: BoxedFilter<(Box<dyn Reply>,)> = process_filter
			.or(points_filter)
			.or(list_filter)
			.map(move |reply| -> Box<dyn Reply> { Box::new(reply) })
			.boxed();

		filters
	}
}

async fn process_filter_fn(
	submission: ReceiptSubmission,
	resource: Arc<ReceiptsResource>,
) -> Result<warp::reply::Response, Rejection> {
	match resource.submit(submission).await {
		Ok(id) => {
			Ok(warp::reply::json(&ReturnId { id }).into_response())
		}
		Err(err) => {
			tracing::error!("receipt submission error: {}", err);

			Ok(warp::reply::with_status(
				String::from("failed to store receipt"),
				StatusCode::INTERNAL_SERVER_ERROR,
			)
			.into_response())
		}
	}
}

async fn points_filter_fn(
	id: String,
	resource: Arc<ReceiptsResource>,
) -> Result<warp::reply::Response, Rejection> {
	match resource.points(&id).await {
		Ok(points) => Ok(warp::reply::json(&ReturnPoints { points })
			.into_response()),
		Err(Error::ReceiptNotFound(id)) => {
			tracing::info!(%id, "points queried for unknown receipt");

			Err(warp::reject::custom(PointsFailure::NotFound))
		}
		Err(Error::UnscoreableReceipt(field)) => {
			tracing::info!(
				%id,
				reason = field.reason(),
				"receipt failed scoring validation"
			);

			Err(warp::reject::custom(PointsFailure::Unscoreable(
				field,
			)))
		}
		Err(err) => {
			tracing::error!("points query error: {}", err);

			Ok(warp::reply::with_status(
				String::from("failed to compute points"),
				StatusCode::INTERNAL_SERVER_ERROR,
			)
			.into_response())
		}
	}
}

async fn list_filter_fn(
	resource: Arc<ReceiptsResource>,
) -> Result<impl Reply, Rejection> {
	Ok(warp::reply::json(&resource.list().await))
}

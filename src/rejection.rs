use crate::error::ScoreField;
use serde::Serialize;
use std::convert::Infallible;
use warp::{
	filters::body::BodyDeserializeError, hyper::StatusCode,
	reject::Reject, Rejection, Reply,
};

/// Terminal failures of a points query, carried through warp's
/// rejection machinery so `handle_rejection` can shape the reply.
#[derive(Debug)]
pub enum PointsFailure {
	/// the queried id is not in the store
	NotFound,
	/// the stored receipt failed semantic validation while scoring
	Unscoreable(ScoreField),
}

impl Reject for PointsFailure {}

#[derive(Serialize)]
struct RejectionResponse {
	message: String,
}

fn reply_message(
	message: String,
	status: StatusCode,
) -> warp::reply::WithStatus<warp::reply::Json> {
	warp::reply::with_status(
		warp::reply::json(&RejectionResponse { message }),
		status,
	)
}

#[allow(clippy::missing_errors_doc)]
pub async fn handle_rejection(
	err: Rejection,
) -> Result<impl Reply, Infallible> {
	if let Some(failure) = err.find::<PointsFailure>() {
		return Ok(match failure {
			PointsFailure::NotFound => reply_message(
				String::from("No receipt found for that id"),
				StatusCode::NOT_FOUND,
			),
			PointsFailure::Unscoreable(field) => reply_message(
				format!(
					"Unable to calculate points ({})",
					field.reason()
				),
				StatusCode::BAD_REQUEST,
			),
		});
	}

	if err.find::<BodyDeserializeError>().is_some() {
		return Ok(reply_message(
			String::from("The receipt is invalid"),
			StatusCode::BAD_REQUEST,
		));
	}

	if err.is_not_found() {
		return Ok(reply_message(
			String::from("not found"),
			StatusCode::NOT_FOUND,
		));
	}

	if err.find::<warp::reject::MethodNotAllowed>().is_some() {
		return Ok(reply_message(
			String::from("method not allowed"),
			StatusCode::METHOD_NOT_ALLOWED,
		));
	}

	tracing::error!("unhandled rejection {:?}", err);

	Ok(reply_message(
		String::from("internal server error"),
		StatusCode::INTERNAL_SERVER_ERROR,
	))
}

use pretty_assertions::assert_eq;
use rewardserver::{
	hlist,
	receipts::{
		store::{InMemoryReceiptStore, Item, ReceiptSubmission},
		Receipts, ReceiptsResource,
	},
	rejection::handle_rejection,
	status::Status,
	CustomModule, CustomServer, Hlist, Module, ModuleResources,
};
use std::sync::Arc;
use warp::{filters::BoxedFilter, Filter, Reply};

struct RewardServer {
	resources: <Self as CustomServer>::Resources,
}

impl CustomServer for RewardServer {
	type Resources = Hlist![Arc<ReceiptsResource>];

	const MODULES: &'static [Module<Self>] = &[
		Module {
			name: "status",
			call: Status::create_filter,
		},
		Module {
			name: "receipts",
			call: Receipts::create_filter,
		},
	];

	fn get_resources(&self) -> &Self::Resources {
		&self.resources
	}
}

impl ModuleResources<Receipts> for RewardServer {
	fn get_server_resources(
		&self,
	) -> <Receipts as CustomModule>::Resources {
		let (reshaped, _) = self.get_resources().clone().sculpt();
		reshaped
	}
}

impl ModuleResources<Status> for RewardServer {
	fn get_server_resources(
		&self,
	) -> <Status as CustomModule>::Resources {
		let (reshaped, _) = self.get_resources().clone().sculpt();
		reshaped
	}
}

fn server() -> Arc<RewardServer> {
	let store = Arc::new(InMemoryReceiptStore::default());
	Arc::new(RewardServer {
		resources: hlist![Arc::new(ReceiptsResource::new(store))],
	})
}

/// Folds all module filters the way server init does, so the tests
/// exercise the composed route tree.
fn routes(
	server: &Arc<RewardServer>,
) -> BoxedFilter<(Box<dyn Reply>,)> {
	let mut filters = RewardServer::MODULES
		.iter()
		.map(|module| (module.call)(server.clone()));

	let first = filters.next().expect("server declares modules");
	filters.fold(first, |route, next| {
		route
			.or(next)
			.map(|r| -> Box<dyn Reply> { Box::new(r) })
			.boxed()
	})
}

fn item(description: &str, price: &str) -> Item {
	Item {
		short_description: description.to_string(),
		price: price.to_string(),
	}
}

fn target_submission() -> ReceiptSubmission {
	ReceiptSubmission {
		retailer: "Target".to_string(),
		purchase_date: "2022-01-01".to_string(),
		purchase_time: "13:01".to_string(),
		items: vec![
			item("Mountain Dew 12PK", "6.49"),
			item("Emils Cheese Pizza", "12.25"),
			item("Knorr Creamy Chicken", "1.26"),
			item("Doritos Nacho Cheese", "3.35"),
			item("   Klarbrunn 12-PK 12 FL OZ  ", "12.00"),
		],
		total: "35.35".to_string(),
	}
}

async fn submit<F>(
	filter: &F,
	submission: &ReceiptSubmission,
) -> String
where
	F: Filter + 'static,
	F::Extract: Reply + Send,
{
	let reply = warp::test::request()
		.method("POST")
		.path("/receipts/process")
		.json(submission)
		.reply(filter)
		.await;

	assert_eq!(reply.status(), 200);
	let body: serde_json::Value =
		serde_json::from_slice(reply.body()).unwrap();
	body["id"].as_str().unwrap().to_string()
}

async fn query_points(
	filter: &BoxedFilter<(Box<dyn Reply>,)>,
	id: &str,
) -> u64 {
	let reply = warp::test::request()
		.path(&format!("/receipts/{}/points", id))
		.reply(filter)
		.await;

	assert_eq!(reply.status(), 200);
	let body: serde_json::Value =
		serde_json::from_slice(reply.body()).unwrap();
	body["points"].as_u64().unwrap()
}

#[tokio::test]
async fn test_status_route() {
	let server = server();
	let filter = routes(&server);

	let reply =
		warp::test::request().path("/status").reply(&filter).await;

	assert_eq!(reply.status(), 200);
	let body: serde_json::Value =
		serde_json::from_slice(reply.body()).unwrap();
	assert_eq!(body["status"].as_str(), Some("ok"));
}

#[tokio::test]
async fn test_target_receipt_end_to_end() {
	let server = server();
	let filter = routes(&server);

	let id = submit(&filter, &target_submission()).await;

	assert_eq!(query_points(&filter, &id).await, 28);
	// repeat queries serve the cached score
	assert_eq!(query_points(&filter, &id).await, 28);
}

#[tokio::test]
async fn test_round_dollar_receipt_end_to_end() {
	let server = server();
	let filter = routes(&server);

	// 7 retailer + 50 round dollar + 25 quarter + 1 description
	// + 10 afternoon
	let id = submit(
		&filter,
		&ReceiptSubmission {
			retailer: "BoxMart".to_string(),
			purchase_date: "2022-03-02".to_string(),
			purchase_time: "14:01".to_string(),
			items: vec![item("Gum", "0.99")],
			total: "9.00".to_string(),
		},
	)
	.await;

	assert_eq!(query_points(&filter, &id).await, 93);
}

#[tokio::test]
async fn test_unknown_id_yields_not_found() {
	let server = server();
	let filter = routes(&server).recover(handle_rejection);

	// well-formed uuid, never issued
	let reply = warp::test::request()
		.path(
			"/receipts/7fcfeb9e-02a8-4a80-a561-e84cb0fd3c07/points",
		)
		.reply(&filter)
		.await;

	assert_eq!(reply.status(), 404);
	let body: serde_json::Value =
		serde_json::from_slice(reply.body()).unwrap();
	assert_eq!(
		body["message"].as_str(),
		Some("No receipt found for that id")
	);
}

#[tokio::test]
async fn test_malformed_submission_is_rejected() {
	let server = server();
	let filter = routes(&server).recover(handle_rejection);

	let reply = warp::test::request()
		.method("POST")
		.path("/receipts/process")
		.header("content-type", "application/json")
		.body(r#"{"retailer": "Target", "total": 35.35}"#)
		.reply(&filter)
		.await;

	assert_eq!(reply.status(), 400);
	let body: serde_json::Value =
		serde_json::from_slice(reply.body()).unwrap();
	assert_eq!(
		body["message"].as_str(),
		Some("The receipt is invalid")
	);
}

#[tokio::test]
async fn test_unscoreable_receipt_is_a_client_error() {
	let server = server();
	let filter = routes(&server).recover(handle_rejection);

	let mut submission = target_submission();
	submission.purchase_time = "afternoon".to_string();
	let id = submit(&filter, &submission).await;

	let reply = warp::test::request()
		.path(&format!("/receipts/{}/points", id))
		.reply(&filter)
		.await;

	assert_eq!(reply.status(), 400);
	let body: serde_json::Value =
		serde_json::from_slice(reply.body()).unwrap();
	assert_eq!(
		body["message"].as_str(),
		Some("Unable to calculate points (invalid time of purchase)")
	);
}

#[tokio::test]
async fn test_listing_shows_all_receipts() {
	let server = server();
	let filter = routes(&server);

	let first = submit(&filter, &target_submission()).await;
	let second = submit(&filter, &target_submission()).await;
	query_points(&filter, &second).await;

	let reply = warp::test::request()
		.path("/receipts")
		.reply(&filter)
		.await;

	assert_eq!(reply.status(), 200);
	let listed: serde_json::Value =
		serde_json::from_slice(reply.body()).unwrap();
	let listed = listed.as_array().unwrap();

	assert_eq!(listed.len(), 2);
	assert_eq!(listed[0]["id"].as_str(), Some(first.as_str()));
	assert_eq!(listed[0].get("points"), None);
	assert_eq!(listed[1]["id"].as_str(), Some(second.as_str()));
	assert_eq!(listed[1]["points"].as_u64(), Some(28));
}

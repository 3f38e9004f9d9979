use std::sync::Arc;

use rewardserver::{
	hlist,
	receipts::{
		store::InMemoryReceiptStore, Receipts, ReceiptsResource,
	},
	status::Status,
	CustomModule, CustomServer, Hlist, Module, ModuleResources,
};

struct MyServer {
	resources: <Self as CustomServer>::Resources,
}

impl CustomServer for MyServer {
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

impl ModuleResources<Receipts> for MyServer {
	fn get_server_resources(
		&self,
	) -> <Receipts as CustomModule>::Resources {
		let (reshaped, _) = self.get_resources().clone().sculpt();
		reshaped
	}
}

impl ModuleResources<Status> for MyServer {
	fn get_server_resources(
		&self,
	) -> <Status as CustomModule>::Resources {
		let (reshaped, _) = self.get_resources().clone().sculpt();
		reshaped
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt::init();

	let store = Arc::new(InMemoryReceiptStore::default());

	let server = Arc::new(MyServer {
		resources: hlist![Arc::new(ReceiptsResource::new(store))],
	});

	rewardserver::init(server, ([127, 0, 0, 1], 9090)).await;

	Ok(())
}

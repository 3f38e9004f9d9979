use std::{sync::Arc, time::Duration};

use rewardserver::{
	hlist,
	receipts::{
		store::InMemoryReceiptStore, Receipts, ReceiptsResource,
	},
	CustomModule, CustomServer, Hlist, Module, ModuleResources,
};
use tokio::time::sleep;

struct MyServer {
	resources: <Self as CustomServer>::Resources,
}

impl CustomServer for MyServer {
	type Resources = Hlist![Arc<ReceiptsResource>];

	const MODULES: &'static [Module<Self>] = &[Module {
		name: "receipts",
		call: Receipts::create_filter,
	}];

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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt::init();

	let store = Arc::new(InMemoryReceiptStore::default());

	let server = Arc::new(MyServer {
		resources: hlist![Arc::new(ReceiptsResource::new(store))],
	});

	let (sender, receiver) = tokio::sync::oneshot::channel();

	tokio::spawn(async move {
		sleep(Duration::from_secs(1)).await;

		tracing::info!("server shutdown");

		let _ = sender.send(());
	});

	rewardserver::init_with_graceful_shutdown(
		server,
		([127, 0, 0, 1], 9090),
		receiver,
	)
	.await;

	Ok(())
}

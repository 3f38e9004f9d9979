#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::perf)]
#![deny(clippy::nursery)]
#![deny(clippy::match_like_matches_macro)]
#![deny(clippy::needless_update)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::upper_case_acronyms)]
//TODO: remove once this works with async_trait again
#![allow(clippy::no_effect_underscore_binding)]

pub mod error;
/// receipt submission, reward-points scoring and the receipt store
pub mod receipts;
/// Rejection handling for reroutable filters
pub mod rejection;
/// rewardserver module provided to give a simple status response to
/// check that the server is running
pub mod status;

use frunk::hlist::HList;
pub use frunk::{hlist, Hlist};
use std::{net::SocketAddr, sync::Arc};
use tracing::Span;
use warp::{
	filters::BoxedFilter,
	hyper::header::CONTENT_TYPE,
	reply::Reply,
	trace::{Info, Trace},
	Filter,
};

/// Modules store a function call which will generate a warp filter. Generally this function
/// will be the `CustomModule`'s `create_filter` function. See the documentation for `CustomServer`
/// and `CustomModule` for more details.
pub struct Module<S>
where
	S: CustomServer + Sized,
{
	/// `name` is essentially just for debugging or testing purposes, and can be used to pull
	/// a specific `Module` from the `CustomServer` using `get_module` instead
	/// of going through the regular initialization process to create a filter. It does not
	/// handle name conflicts, so names should be unique.
	pub name: &'static str,
	#[allow(clippy::type_complexity)]
	pub call: fn(server: Arc<S>) -> BoxedFilter<(Box<dyn Reply>,)>,
}

/// The `CustomServer` trait describes which modules will be used by the server, and which resources
/// those modules will need to access in their respective filters.
///
/// # Examples
/// ## Defining a `CustomServer` type
/// ```rust
/// # use rewardserver::{CustomServer, CustomModule, Module, ModuleResources};
/// # use rewardserver::receipts::{Receipts, ReceiptsResource};
/// # use rewardserver::{hlist, Hlist};
/// # use std::sync::Arc;
/// #
/// struct MyServer {
///     resources: <Self as CustomServer>::Resources
/// }
///
/// impl CustomServer for MyServer {
///     type Resources = Hlist![Arc<ReceiptsResource>];
///
///     const MODULES: &'static [Module<Self>] = &[
///         Module {
///             name: "receipts",
///             call: Receipts::create_filter
///         }
///     ];
///
///     fn get_resources(&self) -> &Self::Resources {
///         &self.resources
///     }
/// }
///
/// impl ModuleResources<Receipts> for MyServer {
///     fn get_server_resources(&self) -> <Receipts as CustomModule>::Resources {
///         let (reshaped, _) = self.get_resources().clone().sculpt();
///         reshaped
///     }
/// }
/// ```
pub trait CustomServer: Send + Sync + 'static + Sized {
	/// An `HList` containing any type that would be required to act on in some way through the filters.
	/// Any persistent data or store accesses should be handled in the resource types.
	/// Any types which take a lifetime parameter must have `'static` lifetime, and can be constructed
	/// in the table definition to satisfy the lifetime.
	type Resources: HList;

	const MODULES: &'static [Module<Self>];

	/// Can be used to execute the `call` from the `Module` manually, typically just for testing or
	/// debugging.
	#[must_use]
	fn get_module(module_name: &str) -> Option<&Module<Self>> {
		Self::MODULES
			.iter()
			.find(|module| module.name == module_name)
	}

	/// Method used to return the underlying resource data.
	fn get_resources(&self) -> &Self::Resources;
}

/// Modules are typically empty struct types which implement the `CustomModule` trait.
///
/// # Examples
/// ## Defining a `CustomModule` that has two endpoints and utilizes two resources
/// ```rust
/// # use rewardserver::{CustomModule, ModuleResources};
/// # use rewardserver::Hlist;
/// # use std::sync::Arc;
/// # use warp::{Reply, Rejection, Filter, filters::BoxedFilter};
/// #
/// # struct ArchiveResource;
/// # struct AuditResource;
/// #
/// struct Diagnostics;
///
/// impl CustomModule for Diagnostics {
///     type Resources = Hlist![Arc<ArchiveResource>, Arc<AuditResource>];
///
///     fn create_filter<S: ModuleResources<Self>>(
///         server: Arc<S>,
///     ) -> BoxedFilter<(Box<dyn Reply>,)> {
///
///         // Get our resources from the server
///         let (reshaped, _): (Self::Resources, _) = server.get_server_resources().sculpt();
///         let (archive, audit) = reshaped.into_tuple2();
///
///         let dump = warp::path!("diagnostics" / "dump")
///             // Use a resource as an argument in the filter function
///             .and(warp::any().map(move || archive.clone()))
///             .and_then(dump_fn);
///
///         let trail = warp::path!("diagnostics" / "trail")
///             .and(warp::any().map(move || audit.clone()))
///             .and_then(trail_fn);
///
///         // Combine the filters and box them
///         dump
///             .or(trail)
///             .map(|reply| -> Box<dyn Reply> { Box::new(reply) })
///             .boxed()
///     }
/// }
///
/// async fn dump_fn(resource: Arc<ArchiveResource>) -> Result<impl Reply, Rejection> {
///     // Do something with the resource here, ie: store access, etc
///     # let _ = resource;
///     # Ok(warp::reply())
/// }
///
/// async fn trail_fn(resource: Arc<AuditResource>) -> Result<impl Reply, Rejection> {
///     # let _ = resource;
///     # Ok(warp::reply())
/// }
/// ```
pub trait CustomModule: Send + Sync + Sized {
	/// The `Resources` associated type describes which resources are used by just this module,
	/// so it should only represent a subset of the `CustomServer`'s resources.
	type Resources: HList;
	/// This function can access the server resources via `server.get_server_resources()`, and should
	/// return a combined warp filter representing every route associated with this module.
	fn create_filter<S: ModuleResources<Self>>(
		server: Arc<S>,
	) -> BoxedFilter<(Box<dyn Reply>,)>;
}

/// The `ModuleResources` trait is required to be implemented to the `CustomServer` for each module that is
/// added. This allows the individual modules to access the server's resources. It would typically always
/// be implemented in the exact same way, so it could possibly be handled with a macro in the future.
///
/// # Examples
/// ## Implementing `ModuleResources` for a struct which implements `CustomServer`
/// ```rust
/// # use rewardserver::{CustomServer, CustomModule, Module, ModuleResources, status::Status};
/// # use rewardserver::Hlist;
/// #
/// # struct MyServer {
///     # resources: <Self as CustomServer>::Resources,
/// # }
/// #
/// # impl CustomServer for MyServer {
///     # type Resources = Hlist![];
///     # const MODULES: &'static [Module<Self>] = &[
///         # Module {
///             # name: "status",
///             # call: Status::create_filter
///         # }
///     # ];
/// #
///     # fn get_resources(&self) -> &Self::Resources {
///         # &self.resources
///     # }
/// # }
/// #
/// impl ModuleResources<Status> for MyServer {
///     fn get_server_resources(&self) -> <Status as CustomModule>::Resources {
///         let (reshaped, _) = self.get_resources().clone().sculpt();
///         reshaped
///     }
/// }
/// ```
pub trait ModuleResources<T: CustomModule>: CustomServer {
	fn get_server_resources(&self) -> <T as CustomModule>::Resources;
}

#[must_use]
pub fn trace_request() -> Trace<impl Fn(Info) -> Span + Clone> {
	warp::trace::trace(|info: Info| {
		tracing::info_span!(
			"http",
			path = %info.path(),
		)
	})
}

/// Folds the filters of all declared modules into a single route tree,
/// or `None` if the server declares no modules.
fn combine_modules<S: CustomServer>(
	server: &Arc<S>,
) -> Option<BoxedFilter<(Box<dyn Reply>,)>> {
	let mut filters = S::MODULES
		.iter()
		.map(|module| (module.call)(server.clone()));

	let first = filters.next()?;
	Some(filters.fold(first, |route, next| {
		route
			.or(next)
			.map(|r| -> Box<dyn Reply> { Box::new(r) })
			.boxed()
	}))
}

/// Combines all of the filters from the server's modules and initializes the server at
/// the given address. Runs until the process is terminated.
///
/// # Examples
/// ## Initalizing a `CustomServer` type
/// ```rust
/// # use rewardserver::{hlist, Hlist, CustomServer, CustomModule, Module, ModuleResources};
/// # use rewardserver::receipts::{store::InMemoryReceiptStore, Receipts, ReceiptsResource};
/// # use std::sync::Arc;
/// # use futures::future::{Abortable, AbortHandle};
/// #
/// # struct MyServer {
///     # resources: <Self as CustomServer>::Resources,
/// # }
/// #
/// # impl CustomServer for MyServer {
///     # type Resources = Hlist![Arc<ReceiptsResource>];
///     # const MODULES: &'static [Module<Self>] = &[
///         # Module {
///             # name: "receipts",
///             # call: Receipts::create_filter
///         # }
///     # ];
/// #
///     # fn get_resources(&self) -> &Self::Resources {
///         # &self.resources
///     # }
/// # }
/// #
/// # impl ModuleResources<Receipts> for MyServer {
///     # fn get_server_resources(&self) -> <Receipts as CustomModule>::Resources {
///         # let (reshaped, _) = self.get_resources().clone().sculpt();
///         # reshaped
///     # }
/// # }
/// #
/// #[tokio::main]
/// async fn main() {
///     let store = Arc::new(InMemoryReceiptStore::default());
///     let my_server = MyServer {
///         resources: hlist![
///             Arc::new(ReceiptsResource::new(store))
///         ]
///     };
///
///     let future = rewardserver::init(Arc::new(my_server), ([0, 0, 0, 0], 8080));
///     # let (abort_handle, abort_registration) = AbortHandle::new_pair();
///     # let future = Abortable::new(future, abort_registration);
///     # abort_handle.abort();
///     future.await;
/// }
/// ```
pub async fn init<S: CustomServer>(
	server: Arc<S>,
	addr: impl Into<SocketAddr> + Send,
) {
	// keep the sender alive so the receiver never resolves
	let (_shutdown, receiver) = tokio::sync::oneshot::channel();
	init_with_graceful_shutdown(server, addr, receiver).await;
}

/// Like `init`, but can handle shutting down the server gracefully through
/// a receiver.
///
/// # Examples
/// ## Initializing and gracefully shutting down
/// ```rust,no_run
/// # use rewardserver::{hlist, Hlist, CustomServer, CustomModule, Module, ModuleResources};
/// # use rewardserver::receipts::{store::InMemoryReceiptStore, Receipts, ReceiptsResource};
/// # use std::sync::Arc;
/// #
/// # struct MyServer {
///     # resources: <Self as CustomServer>::Resources,
/// # }
/// #
/// # impl CustomServer for MyServer {
///     # type Resources = Hlist![Arc<ReceiptsResource>];
///     # const MODULES: &'static [Module<Self>] = &[
///         # Module {
///             # name: "receipts",
///             # call: Receipts::create_filter
///         # }
///     # ];
/// #
///     # fn get_resources(&self) -> &Self::Resources {
///         # &self.resources
///     # }
/// # }
/// #
/// # impl ModuleResources<Receipts> for MyServer {
///     # fn get_server_resources(&self) -> <Receipts as CustomModule>::Resources {
///         # let (reshaped, _) = self.get_resources().clone().sculpt();
///         # reshaped
///     # }
/// # }
/// #
/// #[tokio::main]
/// async fn main() {
///     let store = Arc::new(InMemoryReceiptStore::default());
///     let my_server = MyServer {
///         resources: hlist![
///             Arc::new(ReceiptsResource::new(store))
///         ]
///     };
///
///     let (sender, receiver) = tokio::sync::oneshot::channel();
///     // shut down again right away
///     let _ = sender.send(());
///
///     rewardserver::init_with_graceful_shutdown(
///         Arc::new(my_server),
///         ([0, 0, 0, 0], 8080),
///         receiver
///     ).await;
/// }
/// ```
pub async fn init_with_graceful_shutdown<S: CustomServer>(
	server: Arc<S>,
	addr: impl Into<SocketAddr> + Send,
	shutdown_receiver: tokio::sync::oneshot::Receiver<()>,
) {
	//TODO: make this configurable
	let cors = warp::cors()
		.allow_any_origin()
		.allow_headers([CONTENT_TYPE.as_str()])
		.allow_methods(vec!["GET", "POST"]);

	if let Some(routes) = combine_modules(&server) {
		let log = warp::log::custom(move |info| {
			tracing::info!(
				target: "http",
				path = %info.path(),
				method = %info.method(),
				elapsed = %info.elapsed().as_micros(),
				status = %info.status(),
				agent = %info.user_agent().unwrap_or_default()
			);
		});

		let routes = routes
			.with(log) // log filter
			.with(trace_request()) //tracing filter
			.with(cors)
			.recover(rejection::handle_rejection);

		let (addr, server) = warp::serve(routes)
			.bind_with_graceful_shutdown(addr.into(), async {
				shutdown_receiver.await.ok();
			});

		tracing::info!("serverstart: {}", addr);

		server.await;
	}
}

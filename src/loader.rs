//! Load orchestration.
//!
//! [`SideModuleLoader`] owns every piece of loader state: the registry, the lazily
//! bound host module object, the per-module locks and the memoized auto-load pass.
//! Nothing is global; create one loader per host instance.

mod load_error ;
mod auto_load ;

pub use load_error::LoadError ;

use std::collections::HashMap ;
use std::sync::{ Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard };
use once_cell::sync::OnceCell ;
use reqwest::Url ;
use serde_json::Value ;

use crate::config::NativeModulesConfig ;
use crate::fetch::{ CredentialsMode, FetchRequest, Fetcher };
use crate::link::LinkOptions ;
use crate::module_name::ModuleName ;
use crate::path_resolver::PathResolver ;
use crate::registry::Registry ;
use crate::runtime::{ EnvironmentError, RuntimeApi, RuntimeFactory, RuntimeModule };

/// Virtual directory side modules are staged in unless configured otherwise.
pub const DEFAULT_STAGING_DIR: &str = "/itexoft" ;



/// Stages side modules on the host's virtual filesystem and links them into the
/// running instance.
///
/// # Lifecycle
///
/// 1. The host calls [`on_runtime_ready`]( Self::on_runtime_ready ) once its runtime is up.
/// 	This applies the configuration, binds the host module object and runs the auto-load pass.
/// 2. Afterwards [`load`]( Self::load ), [`load_by_name`]( Self::load_by_name ),
/// 	[`add`]( Self::add ) and [`has`]( Self::has ) may be called at any time.
///
/// Loads of the same module are serialized; loads of different modules are not.
///
/// The auto-load pass runs as a task of its own, so the entry points that start it
/// take the loader behind an [`Arc`].
pub struct SideModuleLoader {
	registry: RwLock<Registry>,
	resolver: PathResolver,
	fetcher: Arc<dyn Fetcher>,
	runtime_factory: RuntimeFactory,
	runtime: OnceCell<RuntimeModule>,
	staging_dir: String,
	link_options: LinkOptions,
	credentials: CredentialsMode,
	module_locks: Mutex<HashMap<ModuleName, Arc<tokio::sync::Mutex<()>>>>,
	auto_load: Mutex<Option<tokio::sync::watch::Receiver<auto_load::AutoLoadOutcome>>>,
}

impl SideModuleLoader {

	/// Creates an uninitialized loader.
	///
	/// `runtime_factory` is called the first time a load needs the host module object;
	/// its result is cached for the loader's lifetime. A failed call is retried on the
	/// next load.
	pub fn new<F>( runtime_factory: F, fetcher: Arc<dyn Fetcher> ) -> Self
	where
		F: Fn() -> Result<RuntimeModule, EnvironmentError> + Send + Sync + 'static,
	{
		Self {
			registry: RwLock::new( Registry::new() ),
			resolver: PathResolver::default(),
			fetcher,
			runtime_factory: Box::new( runtime_factory ),
			runtime: OnceCell::new(),
			staging_dir: DEFAULT_STAGING_DIR.to_string(),
			link_options: LinkOptions::default(),
			credentials: CredentialsMode::default(),
			module_locks: Mutex::new( HashMap::new() ),
			auto_load: Mutex::new( None ),
		}
	}

	/// Sets the document base URI module paths are resolved against.
	///
	/// Without one, [`load_by_name`]( Self::load_by_name ) fails with an environment error.
	pub fn with_base_uri( mut self, base_uri: Url ) -> Self {
		self.resolver = PathResolver::new( Some( base_uri ));
		self
	}

	/// Sets the virtual directory modules are staged in.
	pub fn with_staging_dir( mut self, staging_dir: impl Into<String> ) -> Self {
		self.staging_dir = staging_dir.into();
		self
	}

	/// Overrides the options passed to the dynamic linker.
	pub fn with_link_options( mut self, link_options: LinkOptions ) -> Self {
		self.link_options = link_options ;
		self
	}

	/// Sets the credential policy of module fetches.
	pub fn with_credentials( mut self, credentials: CredentialsMode ) -> Self {
		self.credentials = credentials ;
		self
	}

	#[inline] pub fn staging_dir( &self ) -> &str { &self.staging_dir }

	#[inline] pub fn link_options( &self ) -> LinkOptions { self.link_options }

	/// The virtual path `name` is staged at.
	pub fn staging_path( &self, name: &ModuleName ) -> String {
		format!( "{}/{}", self.staging_dir.trim_end_matches( '/' ), name.file_name() )
	}

	/// Entry point for the host once its runtime is ready.
	///
	/// Applies the host configuration, binds the host module object and loads every
	/// auto-load module.
	///
	/// # Errors
	/// Any configuration, environment or load failure, see [`LoadError`].
	pub async fn on_runtime_ready( self: &Arc<Self>, api: &impl RuntimeApi ) -> Result<(), LoadError> {
		let config = api.get_config();
		self.initialize( config.as_ref() )?;
		self.runtime()?;
		self.run_auto_load().await
	}

	/// Populates the registry from the host configuration.
	///
	/// # Errors
	/// Fails if the configuration is malformed, or with [`LoadError::AlreadyInitialized`]
	/// if the registry was populated before. The registry is unchanged on failure.
	pub fn initialize( &self, config: Option<&Value> ) -> Result<(), LoadError> {
		let config = NativeModulesConfig::from_host_config( config )?;
		let ( modules, auto_load ) = ( config.modules.len(), config.auto_load.len() );
		self.registry_mut().initialize( config )?;
		tracing::info!( modules, auto_load, "native module registry initialized" );
		Ok(())
	}

	#[inline] pub fn is_initialized( &self ) -> bool { self.registry().is_initialized() }

	/// Registers another loadable module.
	///
	/// # Errors
	/// Fails if `name` is malformed or the registry is uninitialized.
	pub fn add( &self, name: &str ) -> Result<(), LoadError> {
		self.registry_mut().add( name )
	}

	/// Whether `name` is a registered module.
	///
	/// # Errors
	/// Fails if `name` is malformed or the registry is uninitialized.
	pub fn has( &self, name: &str ) -> Result<bool, LoadError> {
		self.registry().has( name )
	}

	/// Loads a module from bytes already in memory and returns its handle id.
	///
	/// The bytes are written to the module's staging path, replacing anything staged
	/// there before, and then linked. Loading the same name again links it again.
	///
	/// # Errors
	/// Checks run in this order and have no side effect when they fail: name validation,
	/// registry initialization, registration of `name`. Afterwards environment,
	/// filesystem and link failures are reported as they happen.
	pub async fn load( &self, bytes: &[u8], name: &str ) -> Result<String, LoadError> {
		let name = self.registry().require_known( name )?;
		self.stage_and_link( bytes, &name ).await
	}

	/// [`load`]( Self::load ) for callers holding the bytes as a JSON array of octets.
	///
	/// # Errors
	/// The same up-front checks as [`load`]( Self::load ), followed by
	/// [`LoadError::NotBytes`] if `bytes` is anything but an array of integers in
	/// `0..=255`. Nothing is staged in either case.
	pub async fn load_value( &self, bytes: &Value, name: &str ) -> Result<String, LoadError> {
		let name = self.registry().require_known( name )?;
		let bytes = octets( bytes )?;
		self.stage_and_link( &bytes, &name ).await
	}

	/// Fetches a module from its resolved URL, then [`load`]( Self::load )s it.
	///
	/// # Errors
	/// The same up-front checks as [`load`]( Self::load ); then
	/// [`LoadError::Network`] for a non-success response, before anything is staged.
	pub async fn load_by_name( &self, name: &str ) -> Result<String, LoadError> {

		let ( name, url ) = {
			let registry = self.registry();
			let name = registry.require_known( name )?;
			let url = self.resolver.resolve( &name, registry.path_override( &name ))?;
			( name, url )
		};

		tracing::debug!( module = %name, %url, "fetching side module" );
		let response = self.fetcher.fetch( FetchRequest { url: url.clone(), credentials: self.credentials }).await?;
		if !response.ok() {
			return Err( LoadError::Network {
				url: url.to_string(),
				status: response.status(),
				status_text: response.status_text().to_string(),
			});
		}
		let bytes = response.bytes().await?;

		self.load( &bytes, name.as_str() ).await

	}

	/// The host module object, bound on first use.
	///
	/// # Errors
	/// Fails if the runtime factory reports the host module object unavailable.
	pub fn runtime( &self ) -> Result<&RuntimeModule, LoadError> {
		Ok( self.runtime.get_or_try_init(|| ( self.runtime_factory )() )? )
	}

	async fn stage_and_link( &self, bytes: &[u8], name: &ModuleName ) -> Result<String, LoadError> {

		let runtime = self.runtime()?;
		let fs = runtime.fs()?;
		let linker = runtime.linker()?;
		let path = self.staging_path( name );

		let lock = self.module_lock( name );
		let _guard = lock.lock().await ;

		fs.mkdir_tree( &self.staging_dir )?;
		fs.write_file( &path, bytes )?;
		tracing::debug!( module = %name, %path, size = bytes.len(), "staged side module" );

		let handle = linker.load_dynamic_library( &path, self.link_options ).await?;
		tracing::info!( module = %name, %handle, "linked side module" );
		Ok( handle.to_string() )

	}

	fn module_lock( &self, name: &ModuleName ) -> Arc<tokio::sync::Mutex<()>> {
		let mut locks = self.module_locks.lock().unwrap_or_else( PoisonError::into_inner );
		Arc::clone( locks.entry( name.clone() ).or_default() )
	}

	fn registry( &self ) -> RwLockReadGuard<'_, Registry> {
		self.registry.read().unwrap_or_else( PoisonError::into_inner )
	}

	fn registry_mut( &self ) -> RwLockWriteGuard<'_, Registry> {
		self.registry.write().unwrap_or_else( PoisonError::into_inner )
	}

}

fn octets( value: &Value ) -> Result<Vec<u8>, LoadError> {
	let not_bytes = || LoadError::NotBytes( describe( value ).to_string() );
	value.as_array()
		.ok_or_else( not_bytes )?
		.iter()
		.map(| octet | octet.as_u64().and_then(| octet | u8::try_from( octet ).ok() ).ok_or_else( not_bytes ))
		.collect()
}

fn describe( value: &Value ) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool( _ ) => "a boolean",
		Value::Number( _ ) => "a number",
		Value::String( _ ) => "a string",
		Value::Array( _ ) => "an array with non-octet elements",
		Value::Object( _ ) => "an object",
	}
}

impl std::fmt::Debug for SideModuleLoader {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "SideModuleLoader" )
			.field( "registry", &*self.registry() )
			.field( "resolver", &self.resolver )
			.field( "runtime", &self.runtime.get() )
			.field( "staging_dir", &self.staging_dir )
			.field( "link_options", &self.link_options )
			.field( "credentials", &self.credentials )
			.field( "auto_load", &self.auto_load_outcome() )
			.finish_non_exhaustive()
	}
}

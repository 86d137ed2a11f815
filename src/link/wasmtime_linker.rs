use std::collections::HashMap ;
use std::sync::{ Arc, Mutex, MutexGuard, PoisonError };
use async_trait::async_trait ;
use wasmtime::{ Engine, Extern, Instance, Linker, Module, Store };

use crate::fs::VirtualFs ;
use super::{ library_name, DynamicLinker, LibraryHandle, LinkError, LinkOptions };



/// A [`DynamicLinker`] that links core WebAssembly modules into one shared `wasmtime`
/// store.
///
/// Every module is instantiated against a single [`Linker`]. A module linked with
/// [`LinkOptions::global`] has its exports registered under its library name, so any
/// module linked after it can import them as `(import "<name>" "<export>" ...)`. Link
/// order therefore matters: dependencies have to be linked before their dependants.
///
/// Linking the same name again shadows the earlier exports.
///
/// Instances live in the shared [`Store`] until the linker is dropped, whatever the
/// [`LinkOptions`]. [`LinkOptions::nodelete`] only records the instance as resident,
/// see [`resident_name`]( Self::resident_name ).
pub struct WasmtimeLinker {
	engine: Engine,
	fs: Arc<dyn VirtualFs>,
	state: Mutex<LinkerState>,
}

struct LinkerState {
	store: Store<()>,
	linker: Linker<()>,
	next_handle: u64,
	/// Instances kept alive on request, by handle.
	resident: HashMap<LibraryHandle, ( String, Instance )>,
	/// Names registered for global visibility, in link order.
	globals: Vec<String>,
}

impl WasmtimeLinker {

	/// Creates a linker with no host imports.
	pub fn new( engine: &Engine, fs: Arc<dyn VirtualFs> ) -> Self {
		Self::with_linker( engine, fs, Linker::new( engine ))
	}

	/// Creates a linker on top of `linker`.
	///
	/// Anything already defined in `linker` is available to every side module. It is
	/// your responsibility to make sure these definitions don't collide with the names
	/// side modules are registered under.
	pub fn with_linker( engine: &Engine, fs: Arc<dyn VirtualFs>, mut linker: Linker<()> ) -> Self {
		linker.allow_shadowing( true );
		Self {
			engine: engine.clone(),
			fs,
			state: Mutex::new( LinkerState {
				store: Store::new( engine, () ),
				linker,
				next_handle: 1,
				resident: HashMap::new(),
				globals: Vec::new(),
			}),
		}
	}

	#[inline] pub fn engine( &self ) -> &Engine { &self.engine }

	/// Names of globally linked modules, in the order they were linked.
	pub fn linked_modules( &self ) -> Vec<String> { self.lock().globals.clone() }

	/// Whether a module was globally linked under `name`.
	pub fn is_linked( &self, name: &str ) -> bool { self.lock().globals.iter().any(| linked | linked == name ) }

	/// Library name of a resident module.
	pub fn resident_name( &self, handle: LibraryHandle ) -> Option<String> {
		self.lock().resident.get( &handle ).map(|( name, _ )| name.clone() )
	}

	/// Calls a nullary `i32`-returning export of a globally linked module.
	///
	/// # Errors
	/// Fails if the export does not exist, has a different signature, or traps.
	pub fn call_i32( &self, module: &str, function: &str ) -> Result<i32, LinkError> {
		let mut state = self.lock();
		let LinkerState { store, linker, .. } = &mut *state ;
		let func = linker.get( &mut *store, module, function )
			.and_then( Extern::into_func )
			.ok_or_else(|| LinkError::Other( format!( "no function export {}.{}", module, function )))?;
		func.typed::<(), i32>( &*store )
			.and_then(| func | func.call( &mut *store, () ))
			.map_err( LinkError::Instantiation )
	}

	fn lock( &self ) -> MutexGuard<'_, LinkerState> {
		self.state.lock().unwrap_or_else( PoisonError::into_inner )
	}

}

#[async_trait]
impl DynamicLinker for WasmtimeLinker {

	async fn load_dynamic_library( &self, path: &str, options: LinkOptions ) -> Result<LibraryHandle, LinkError> {

		let name = library_name( path )?.to_string();
		let bytes = self.fs.read_file( path )?;

		let module = match options.load_async {
			true => {
				let engine = self.engine.clone();
				tokio::task::spawn_blocking( move || Module::new( &engine, &bytes ))
					.await
					.map_err(| err | LinkError::Aborted( err.to_string() ))?
			},
			false => Module::new( &self.engine, &bytes ),
		}.map_err( LinkError::Compilation )?;

		let mut state = self.lock();
		let LinkerState { store, linker, next_handle, resident, globals } = &mut *state ;

		let instance = linker.instantiate( &mut *store, &module ).map_err( LinkError::Instantiation )?;
		if options.global {
			linker.instance( &mut *store, &name, instance )
				.map_err(| err | LinkError::Registration( name.clone(), err ))?;
			globals.retain(| linked | *linked != name );
			globals.push( name.clone() );
		}

		let handle = LibraryHandle( *next_handle );
		*next_handle += 1 ;
		if options.nodelete { resident.insert( handle, ( name.clone(), instance )); }

		tracing::debug!( library = %name, %handle, global = options.global, "linked side module" );
		Ok( handle )

	}

}

impl std::fmt::Debug for WasmtimeLinker {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "WasmtimeLinker" )
			.field( "engine", &"<Engine>" )
			.field( "globals", &self.lock().globals )
			.finish_non_exhaustive()
	}
}

//! A loader for native WebAssembly side modules.
//!
//! A host instance declares, through its runtime configuration, which side modules
//! exist, where they can be fetched from and which of them are needed at startup.
//! `wasm_sideload` fetches (or accepts) the raw module bytes, stages them on a virtual
//! filesystem and hands them to the host's dynamic-link primitive, so their exports
//! become visible inside the running instance.
//!
//! # Core Concepts
//!
//! - [`SideModuleLoader`]: Owns all loader state. Created once per host instance and
//! 	driven by the host through [`SideModuleLoader::on_runtime_ready`].
//!
//! - [`ModuleName`]: A validated module identifier. It doubles as the file stem the
//! 	module is fetched and staged under, so it may not contain `/` or `\`.
//!
//! - [`Registry`]: The set of known modules, their path overrides and the auto-load list.
//! 	Populated once from the host configuration; only the known set can grow afterwards.
//!
//! - [`RuntimeModule`]: The host's module object, bundling a [`fs::VirtualFs`] and a
//! 	[`link::DynamicLinker`]. Supplied through a factory and bound on first use.
//!
//! - **Auto-load pass**: The modules listed under `itexoftNativeAutoLoad`, loaded once,
//! 	sequentially and in declaration order, when the runtime becomes ready.
//!
//! # Host Configuration
//!
//! Only `extensions.extra` of the runtime configuration is read. All three keys are
//! required, though each may be empty:
//!
//! ```json
//! { "extensions": { "extra": {
//! 	"itexoftNativeModules": [ "libfoo", "libbar" ],
//! 	"itexoftNativeModulePaths": { "libbar": "native/libbar-v2.wasm" },
//! 	"itexoftNativeAutoLoad": [ "libfoo" ]
//! }}}
//! ```
//!
//! Modules without a path override are fetched from `<name>.wasm`. Either way the path
//! is resolved against the document base URI set with [`SideModuleLoader::with_base_uri`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc ;
//! use pipe_trait::Pipe ;
//! use serde_json::json ;
//! use wasm_sideload::{ Engine, RuntimeModule, SideModuleLoader };
//! use wasm_sideload::fetch::HttpFetcher ;
//! use wasm_sideload::fs::MemoryFs ;
//! use wasm_sideload::link::WasmtimeLinker ;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // The host module object: a filesystem to stage on and a linker reading from it.
//! let engine = Engine::default();
//! let fs = Arc::new( MemoryFs::new() );
//! let linker = Arc::new( WasmtimeLinker::new( &engine, fs.clone() ));
//! let runtime = RuntimeModule::new().with_fs( fs ).with_linker( linker.clone() );
//!
//! let loader = SideModuleLoader::new( move || Ok( runtime.clone() ), Arc::new( HttpFetcher::new() ))
//! 	.with_base_uri( "https://app.example/".parse()? )
//! 	.pipe( Arc::new );
//!
//! let config = json!({ "extensions": { "extra": {
//! 	"itexoftNativeModules": [ "answer" ],
//! 	"itexoftNativeModulePaths": {},
//! 	"itexoftNativeAutoLoad": [],
//! }}});
//! loader.on_runtime_ready( &|| Some( config.clone() )).await?;
//!
//! // Bytes obtained some other way can be loaded directly.
//! let wat = br#"(module (func (export "get") (result i32) i32.const 42))"# ;
//! loader.load( wat, "answer" ).await?;
//! assert_eq!( linker.call_i32( "answer", "get" )?, 42 );
//! # Ok(())
//! # }
//! ```
//!
//! # Failure Model
//!
//! Every precondition is checked up front and reported as a [`LoadError`]; nothing is
//! retried and there is no silent fallback. The auto-load pass stops at the first
//! module that fails and keeps reporting that failure to every later caller.

mod config ;
mod loader ;
mod module_name ;
mod path_resolver ;
mod registry ;
mod runtime ;
pub mod fetch ;
pub mod fs ;
pub mod link ;
pub mod namespace ;

#[doc( no_inline )]
pub use wasmtime::Engine ;
#[doc( no_inline )]
pub use reqwest::Url ;

pub use config::{ ConfigError, NativeModulesConfig, AUTO_LOAD_KEY, MODULES_KEY, MODULE_PATHS_KEY };
pub use loader::{ LoadError, SideModuleLoader, DEFAULT_STAGING_DIR };
pub use module_name::{ validate, ModuleName, ValidationError, MODULE_EXTENSION };
pub use path_resolver::PathResolver ;
pub use registry::Registry ;
pub use runtime::{ EnvironmentError, RuntimeApi, RuntimeFactory, RuntimeModule };

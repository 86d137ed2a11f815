//! The dynamic-link primitive side modules are handed to once staged.
//!
//! A [`DynamicLinker`] loads a module from a path on the [`VirtualFs`]( crate::fs::VirtualFs )
//! into the running instance. [`WasmtimeLinker`] is the `wasmtime` based implementation.

mod wasmtime_linker ;

pub use wasmtime_linker::WasmtimeLinker ;

use std::fmt::Display ;
use async_trait::async_trait ;
use serde::{ Deserialize, Serialize };
use thiserror::Error ;

use crate::fs::FsError ;

/// How a module is linked.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize )]
#[serde( rename_all = "camelCase", default )]
pub struct LinkOptions {
	/// Compile without blocking the calling task.
	pub load_async: bool,
	/// Make the module's exports visible to every module linked afterwards.
	pub global: bool,
	/// Keep the module resident for the lifetime of the instance.
	///
	/// [`WasmtimeLinker`] never unloads anything, so there this only decides whether
	/// the instance is tracked under its handle.
	pub nodelete: bool,
}

impl Default for LinkOptions {
	fn default() -> Self { Self { load_async: true, global: true, nodelete: true }}
}

/// Identifies a linked library within one [`DynamicLinker`].
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct LibraryHandle( pub u64 );

impl Display for LibraryHandle {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result { write!( f, "{}", self.0 ) }
}

#[derive( Error, Debug )]
pub enum LinkError {
	#[error( "Filesystem Error: {0}" )] Filesystem( #[from] FsError ),
	#[error( "Compilation Failed: {0}" )] Compilation( wasmtime::Error ),
	#[error( "Instantiation Failed: {0}" )] Instantiation( wasmtime::Error ),
	/// Exporting the instance under its module name was rejected.
	#[error( "Registration of '{0}' Failed: {1}" )] Registration( String, wasmtime::Error ),
	/// The background compilation task panicked or was cancelled.
	#[error( "Background Compilation Aborted: {0}" )] Aborted( String ),
	/// The path does not name a `.wasm` file.
	#[error( "Invalid Library Path: {0}" )] InvalidPath( String ),
	/// Some other host-defined failure.
	#[error( "{0}" )] Other( String ),
}

/// The host facility that loads a staged module into the running instance and makes
/// its symbols available.
#[async_trait]
pub trait DynamicLinker: Send + Sync {

	/// Loads the module stored at `path`.
	///
	/// # Errors
	/// Fails if the file cannot be read, compiled or instantiated.
	async fn load_dynamic_library( &self, path: &str, options: LinkOptions ) -> Result<LibraryHandle, LinkError> ;

}

/// The library name a staged path is linked under: its file stem.
pub(crate) fn library_name( path: &str ) -> Result<&str, LinkError> {
	path.rsplit( '/' ).next()
		.and_then(| file | file.strip_suffix( crate::module_name::MODULE_EXTENSION ))
		.filter(| stem | !stem.is_empty() )
		.ok_or_else(|| LinkError::InvalidPath( path.to_string() ))
}

#[cfg( test )]
mod tests {

	use super::* ;

	#[test]
	fn library_name_is_file_stem() {
		assert_eq!( library_name( "/itexoft/foo.wasm" ).unwrap(), "foo" );
		assert_eq!( library_name( "foo.bar.wasm" ).unwrap(), "foo.bar" );
		assert!( library_name( "/itexoft/.wasm" ).is_err() );
		assert!( library_name( "/itexoft/foo" ).is_err() );
	}

	#[test]
	fn link_options_deserialise_with_defaults() {
		let options: LinkOptions = serde_json::from_str( r#"{ "global": false }"# ).unwrap();
		assert_eq!( options, LinkOptions { load_async: true, global: false, nodelete: true });
	}

}

//! The host side of the loader: its configuration accessor and its module object.

use std::sync::Arc ;
use serde_json::Value ;
use thiserror::Error ;

use crate::fs::VirtualFs ;
use crate::link::DynamicLinker ;

/// A required host facility is missing.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum EnvironmentError {
	#[error( "document base URI is not available" )] BaseUriUnavailable,
	/// A path could not be resolved against the base URI.
	#[error( "cannot resolve '{path}' against the document base URI: {reason}" )]
	UnresolvablePath { path: String, reason: String },
	/// The host's module object could not be obtained.
	#[error( "runtime module is not available: {0}" )] RuntimeUnavailable( String ),
	#[error( "virtual filesystem is not available" )] FilesystemUnavailable,
	#[error( "dynamic linker is not available" )] LinkerUnavailable,
}

/// The host's module object: the facilities side modules are staged on and linked with.
///
/// Either facility may be absent; this is only reported once a load actually needs it.
#[derive( Clone, Default )]
pub struct RuntimeModule {
	fs: Option<Arc<dyn VirtualFs>>,
	linker: Option<Arc<dyn DynamicLinker>>,
}

impl RuntimeModule {

	pub fn new() -> Self { Self::default() }

	pub fn with_fs( mut self, fs: Arc<dyn VirtualFs> ) -> Self {
		self.fs = Some( fs );
		self
	}

	pub fn with_linker( mut self, linker: Arc<dyn DynamicLinker> ) -> Self {
		self.linker = Some( linker );
		self
	}

	/// # Errors
	/// [`EnvironmentError::FilesystemUnavailable`] if the host provides no filesystem.
	pub fn fs( &self ) -> Result<&Arc<dyn VirtualFs>, EnvironmentError> {
		self.fs.as_ref().ok_or( EnvironmentError::FilesystemUnavailable )
	}

	/// # Errors
	/// [`EnvironmentError::LinkerUnavailable`] if the host provides no dynamic linker.
	pub fn linker( &self ) -> Result<&Arc<dyn DynamicLinker>, EnvironmentError> {
		self.linker.as_ref().ok_or( EnvironmentError::LinkerUnavailable )
	}

}

impl std::fmt::Debug for RuntimeModule {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "RuntimeModule" )
			.field( "fs", &self.fs.as_ref().map(| _ | "<VirtualFs>" ))
			.field( "linker", &self.linker.as_ref().map(| _ | "<DynamicLinker>" ))
			.finish()
	}
}

/// Produces the host's [`RuntimeModule`] the first time a load needs it.
pub type RuntimeFactory = Box<dyn Fn() -> Result<RuntimeModule, EnvironmentError> + Send + Sync> ;

/// The API object the host passes to
/// [`SideModuleLoader::on_runtime_ready`]( crate::SideModuleLoader::on_runtime_ready ).
pub trait RuntimeApi {
	/// The host's full runtime configuration, if it has one.
	fn get_config( &self ) -> Option<Value> ;
}

impl<F> RuntimeApi for F
where
	F: Fn() -> Option<Value>,
{
	fn get_config( &self ) -> Option<Value> { self() }
}

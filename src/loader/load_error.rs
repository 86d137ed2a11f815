use std::sync::Arc ;
use thiserror::Error ;

use crate::config::ConfigError ;
use crate::fetch::FetchError ;
use crate::fs::FsError ;
use crate::link::LinkError ;
use crate::module_name::ValidationError ;
use crate::runtime::EnvironmentError ;

/// Errors surfaced by every loader operation.
///
/// Cheap to clone, so a single failed auto-load pass can be reported to each of its
/// waiters. Failures of the host collaborators are shared behind an [`Arc`].
#[derive( Error, Debug, Clone )]
pub enum LoadError {
	/// The host configuration is missing or malformed.
	#[error( "Config Error: {0}" )] Config( #[from] ConfigError ),
	/// A module name is empty or contains a path separator.
	#[error( "Validation Error: {0}" )] Validation( #[from] ValidationError ),
	/// An operation was attempted before the host configuration was applied.
	#[error( "native libraries registry is not initialized" )] Uninitialized,
	/// The host configuration was applied a second time.
	#[error( "native libraries registry is already initialized" )] AlreadyInitialized,
	#[error( "native module '{0}' is not registered" )] UnknownModule( String ),
	/// A dynamically typed payload is not a byte buffer.
	#[error( "expected a byte buffer, got {0}" )] NotBytes( String ),
	/// A required host facility is unavailable.
	#[error( "Environment Error: {0}" )] Environment( #[from] EnvironmentError ),
	/// The auto-load task ended without reporting an outcome.
	#[error( "auto-load pass was aborted" )] AutoLoadAborted,
	/// The server answered with a non-success status.
	#[error( "Failed to fetch '{url}': {status} {status_text}" )]
	Network { url: String, status: u16, status_text: String },
	/// The request could not be completed at all.
	#[error( "Fetch Error: {0}" )] Fetch( Arc<FetchError> ),
	#[error( "Filesystem Error: {0}" )] Filesystem( Arc<FsError> ),
	#[error( "Link Error: {0}" )] Link( Arc<LinkError> ),
}

impl From<FetchError> for LoadError {
	fn from( error: FetchError ) -> Self { Self::Fetch( Arc::new( error )) }
}

impl From<FsError> for LoadError {
	fn from( error: FsError ) -> Self { Self::Filesystem( Arc::new( error )) }
}

impl From<LinkError> for LoadError {
	fn from( error: LinkError ) -> Self { Self::Link( Arc::new( error )) }
}

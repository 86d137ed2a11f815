//! Process-wide publication of a loader for cross-boundary callers.
//!
//! Code that cannot be handed a [`SideModuleLoader`] directly, such as exports
//! invoked from the managed runtime, looks it up here. Publishing is optional and
//! happens at most once per process.

use std::sync::{ Arc, OnceLock };
use thiserror::Error ;

use crate::SideModuleLoader ;

/// The well-known name the loader's operations are published under.
pub const NAMESPACE: &str = "itexoft.wasmSideModule" ;

static INSTALLED: OnceLock<Arc<SideModuleLoader>> = OnceLock::new();

#[derive( Error, Debug )]
pub enum NamespaceError {
	#[error( "a loader is already installed under {NAMESPACE}" )] AlreadyInstalled,
}

/// Publishes `loader` under [`NAMESPACE`].
///
/// # Errors
/// [`NamespaceError::AlreadyInstalled`] if a loader was published before; the
/// earlier one stays in place.
pub fn install( loader: Arc<SideModuleLoader> ) -> Result<&'static Arc<SideModuleLoader>, NamespaceError> {
	INSTALLED.set( loader ).map_err(| _ | NamespaceError::AlreadyInstalled )?;
	tracing::debug!( namespace = NAMESPACE, "side module loader installed" );
	INSTALLED.get().ok_or( NamespaceError::AlreadyInstalled )
}

/// The published loader, if any.
pub fn get() -> Option<&'static Arc<SideModuleLoader>> { INSTALLED.get() }

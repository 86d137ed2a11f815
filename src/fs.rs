//! Virtual filesystem facility used to stage side modules before linking.
//!
//! Paths are virtual absolute paths (`/dir/file.wasm`), always `/`-separated
//! regardless of the platform. Two implementations are provided:
//!
//! - [`MemoryFs`]: a purely in-memory tree, the usual choice inside a host instance.
//! - [`DiskFs`]: maps the virtual tree onto a directory of the real filesystem.

mod memory_fs ;
mod disk_fs ;

pub use memory_fs::MemoryFs ;
pub use disk_fs::DiskFs ;

use thiserror::Error ;

/// Errors produced by a [`VirtualFs`].
#[derive( Error, Debug )]
pub enum FsError {
	#[error( "IO Error: {0}" )] Io( #[from] std::io::Error ),
	/// The path is not absolute or tries to leave the filesystem root.
	#[error( "Invalid Path: {0}" )] InvalidPath( String ),
	/// The parent directory of a written file does not exist.
	#[error( "No Such Directory: {0}" )] MissingDirectory( String ),
	#[error( "No Such File: {0}" )] NotFound( String ),
	/// A directory was requested where a file exists, or vice versa.
	#[error( "Not A Directory: {0}" )] NotADirectory( String ),
}

/// A writable filesystem the dynamic-link primitive reads staged modules from.
pub trait VirtualFs: Send + Sync {

	/// Creates `path` and every missing ancestor. Succeeds if it already exists.
	///
	/// # Errors
	/// Fails if the path is invalid or a component of it is a file.
	fn mkdir_tree( &self, path: &str ) -> Result<(), FsError> ;

	/// Writes `data` to `path`, replacing any previous content.
	///
	/// # Errors
	/// Fails if the parent directory does not exist.
	fn write_file( &self, path: &str, data: &[u8] ) -> Result<(), FsError> ;

	/// Reads the full content of the file at `path`.
	///
	/// # Errors
	/// Fails if there is no file at `path`.
	fn read_file( &self, path: &str ) -> Result<Vec<u8>, FsError> ;

}

/// Splits a virtual absolute path into its components, rejecting anything that
/// could escape the root.
pub(crate) fn components( path: &str ) -> Result<Vec<&str>, FsError> {
	let Some( relative ) = path.strip_prefix( '/' ) else {
		return Err( FsError::InvalidPath( path.to_string() ));
	};
	relative.split( '/' )
		.filter(| component | !component.is_empty() && *component != "." )
		.map(| component | match component {
			".." => Err( FsError::InvalidPath( path.to_string() )),
			component if component.contains( '\\' ) => Err( FsError::InvalidPath( path.to_string() )),
			component => Ok( component ),
		})
		.collect()
}

/// Joins components back into a normalised virtual path.
pub(crate) fn normalise( components: &[&str] ) -> String {
	format!( "/{}", components.join( "/" ))
}

#[cfg( test )]
mod tests {

	use super::* ;

	#[test]
	fn components_normalise_redundant_separators() {
		assert_eq!( components( "//a/./b/" ).unwrap(), vec![ "a", "b" ]);
		assert_eq!( normalise( &components( "/a//b" ).unwrap() ), "/a/b" );
		assert_eq!( normalise( &components( "/" ).unwrap() ), "/" );
	}

	#[test]
	fn components_reject_escapes() {
		assert!( matches!( components( "relative/path" ), Err( FsError::InvalidPath( _ ))));
		assert!( matches!( components( "/a/../b" ), Err( FsError::InvalidPath( _ ))));
		assert!( matches!( components( "/a\\b" ), Err( FsError::InvalidPath( _ ))));
	}

}

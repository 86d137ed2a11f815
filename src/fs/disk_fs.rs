use std::path::{ Path, PathBuf };

use super::{ components, FsError, VirtualFs };



/// A [`VirtualFs`] backed by a directory on the real filesystem.
///
/// The virtual root `/` corresponds to `root`; virtual paths can never reach outside it.
#[derive( Debug, Clone )]
pub struct DiskFs {
	root: PathBuf,
}

impl DiskFs {

	pub fn new( root: impl Into<PathBuf> ) -> Self { Self { root: root.into() } }

	#[inline] pub fn root( &self ) -> &Path { &self.root }

	/// Maps a virtual path onto the real filesystem.
	///
	/// # Errors
	/// Fails if the virtual path is not absolute or escapes the root.
	pub fn host_path( &self, path: &str ) -> Result<PathBuf, FsError> {
		Ok( components( path )?.into_iter().fold( self.root.clone(), | acc, component | acc.join( component )))
	}

}

impl VirtualFs for DiskFs {

	fn mkdir_tree( &self, path: &str ) -> Result<(), FsError> {
		let target = self.host_path( path )?;
		if target.is_file() { return Err( FsError::NotADirectory( path.to_string() )) }
		Ok( std::fs::create_dir_all( target )? )
	}

	fn write_file( &self, path: &str, data: &[u8] ) -> Result<(), FsError> {
		let target = self.host_path( path )?;
		match target.parent() {
			Some( parent ) if parent.is_dir() => Ok( std::fs::write( target, data )? ),
			_ => Err( FsError::MissingDirectory( path.to_string() )),
		}
	}

	fn read_file( &self, path: &str ) -> Result<Vec<u8>, FsError> {
		let target = self.host_path( path )?;
		match target.is_file() {
			true => Ok( std::fs::read( target )? ),
			false => Err( FsError::NotFound( path.to_string() )),
		}
	}

}

use std::collections::{ HashMap, HashSet };
use std::sync::{ Mutex, PoisonError };

use super::{ components, normalise, FsError, VirtualFs };



/// An in-memory [`VirtualFs`].
///
/// Starts out with only the root directory. Writes into a directory that was never
/// created fail, mirroring how the staging directory has to be made first.
#[derive( Debug )]
pub struct MemoryFs {
	inner: Mutex<MemoryFsInner>,
}

#[derive( Debug )]
struct MemoryFsInner {
	directories: HashSet<String>,
	files: HashMap<String, Vec<u8>>,
	writes: usize,
}

impl Default for MemoryFs {
	fn default() -> Self { Self::new() }
}

impl MemoryFs {

	pub fn new() -> Self {
		Self { inner: Mutex::new( MemoryFsInner {
			directories: HashSet::from([ "/".to_string() ]),
			files: HashMap::new(),
			writes: 0,
		})}
	}

	/// Whether a file exists at `path`.
	pub fn contains_file( &self, path: &str ) -> bool {
		let Ok( components ) = components( path ) else { return false };
		self.lock().files.contains_key( &normalise( &components ))
	}

	/// Whether a directory exists at `path`.
	pub fn contains_dir( &self, path: &str ) -> bool {
		let Ok( components ) = components( path ) else { return false };
		self.lock().directories.contains( &normalise( &components ))
	}

	/// Paths of every file, sorted.
	pub fn file_paths( &self ) -> Vec<String> {
		let mut paths = self.lock().files.keys().cloned().collect::<Vec<_>>();
		paths.sort_unstable();
		paths
	}

	/// Number of successful `write_file` calls so far.
	pub fn write_count( &self ) -> usize { self.lock().writes }

	fn lock( &self ) -> std::sync::MutexGuard<'_, MemoryFsInner> {
		self.inner.lock().unwrap_or_else( PoisonError::into_inner )
	}

}

impl VirtualFs for MemoryFs {

	fn mkdir_tree( &self, path: &str ) -> Result<(), FsError> {
		let components = components( path )?;
		let mut inner = self.lock();
		( 1..=components.len() )
			.map(| depth | normalise( &components[ ..depth ] ))
			.try_for_each(| directory | match inner.files.contains_key( &directory ) {
				true => Err( FsError::NotADirectory( directory )),
				false => {
					inner.directories.insert( directory );
					Ok(())
				}
			})
	}

	fn write_file( &self, path: &str, data: &[u8] ) -> Result<(), FsError> {
		let components = components( path )?;
		let Some(( _, parent )) = components.split_last() else {
			return Err( FsError::NotADirectory( path.to_string() ));
		};
		let parent = normalise( parent );
		let file = normalise( &components );
		let mut inner = self.lock();
		if !inner.directories.contains( &parent ) { return Err( FsError::MissingDirectory( parent )) }
		if inner.directories.contains( &file ) { return Err( FsError::NotADirectory( file )) }
		inner.files.insert( file, data.to_vec() );
		inner.writes += 1 ;
		Ok(())
	}

	fn read_file( &self, path: &str ) -> Result<Vec<u8>, FsError> {
		let file = normalise( &components( path )? );
		self.lock().files.get( &file ).cloned().ok_or( FsError::NotFound( file ))
	}

}

#[cfg( test )]
mod tests {

	use super::* ;

	#[test]
	fn write_requires_existing_directory() {
		let fs = MemoryFs::new();
		assert!( matches!( fs.write_file( "/stage/a.wasm", b"x" ), Err( FsError::MissingDirectory( dir )) if dir == "/stage" ));
		fs.mkdir_tree( "/stage" ).unwrap();
		fs.write_file( "/stage/a.wasm", b"x" ).unwrap();
		assert_eq!( fs.read_file( "/stage/a.wasm" ).unwrap(), b"x" );
	}

	#[test]
	fn mkdir_tree_is_idempotent_and_creates_ancestors() {
		let fs = MemoryFs::new();
		fs.mkdir_tree( "/a/b/c" ).unwrap();
		fs.mkdir_tree( "/a/b/c" ).unwrap();
		assert!( fs.contains_dir( "/a" ));
		assert!( fs.contains_dir( "/a/b" ));
		assert!( fs.contains_dir( "/a/b/c/" ));
	}

	#[test]
	fn write_overwrites_previous_content() {
		let fs = MemoryFs::new();
		fs.mkdir_tree( "/s" ).unwrap();
		fs.write_file( "/s/m.wasm", b"old" ).unwrap();
		fs.write_file( "/s/m.wasm", b"new" ).unwrap();
		assert_eq!( fs.read_file( "/s/m.wasm" ).unwrap(), b"new" );
		assert_eq!( fs.write_count(), 2 );
		assert_eq!( fs.file_paths(), vec![ "/s/m.wasm".to_string() ]);
	}

	#[test]
	fn directory_cannot_shadow_file() {
		let fs = MemoryFs::new();
		fs.mkdir_tree( "/s" ).unwrap();
		fs.write_file( "/s/m", b"" ).unwrap();
		assert!( matches!( fs.mkdir_tree( "/s/m/x" ), Err( FsError::NotADirectory( _ ))));
	}

}

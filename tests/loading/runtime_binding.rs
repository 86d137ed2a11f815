use std::sync::Arc ;
use std::sync::atomic::{ AtomicUsize, Ordering };
use serde_json::json ;
use wasm_sideload::{ EnvironmentError, LoadError, RuntimeModule, SideModuleLoader };
use wasm_sideload::fetch::Fetcher ;
use wasm_sideload::fs::{ MemoryFs, VirtualFs };

use crate::doubles::{ host_config, Harness, StubFetcher };

fn loader_with( runtime: impl Fn() -> Result<RuntimeModule, EnvironmentError> + Send + Sync + 'static ) -> SideModuleLoader {
	let loader = SideModuleLoader::new( runtime, Arc::new( StubFetcher::new() ) as Arc<dyn Fetcher> );
	loader.initialize( Some( &host_config( &[ "a" ], json!({}), &[] ))).unwrap();
	loader
}

#[tokio::test]
async fn runtime_is_bound_once_on_first_load() {

	let harness = Harness::initialised( StubFetcher::new(), &[ "a", "b" ], json!({}), &[] );
	assert_eq!( harness.binds(), 0 );

	harness.loader.load( b"a", "a" ).await.unwrap();
	harness.loader.load( b"b", "b" ).await.unwrap();
	harness.loader.load( b"a", "a" ).await.unwrap();

	assert_eq!( harness.binds(), 1 );

}

#[tokio::test]
async fn unavailable_runtime_is_retried_on_next_load() {

	let attempts = Arc::new( AtomicUsize::new( 0 ));
	let counter = Arc::clone( &attempts );
	let fs = Arc::new( MemoryFs::new() );
	let host_fs = Arc::clone( &fs );
	let loader = loader_with( move || match counter.fetch_add( 1, Ordering::SeqCst ) {
		0 => Err( EnvironmentError::RuntimeUnavailable( "runtime still starting".into() )),
		_ => Ok( RuntimeModule::new().with_fs( Arc::clone( &host_fs ) as Arc<dyn VirtualFs> )),
	});

	let first = loader.load( b"a", "a" ).await ;
	assert!( matches!( first, Err( LoadError::Environment( EnvironmentError::RuntimeUnavailable( _ )))));

	// bound now, but the host has no linker
	let second = loader.load( b"a", "a" ).await ;
	assert!( matches!( second, Err( LoadError::Environment( EnvironmentError::LinkerUnavailable ))));
	assert_eq!( attempts.load( Ordering::SeqCst ), 2 );
	assert_eq!( fs.write_count(), 0 );

}

#[tokio::test]
async fn missing_filesystem_is_an_environment_error() {

	let loader = loader_with(|| Ok( RuntimeModule::new() ));

	assert!( matches!( loader.load( b"a", "a" ).await, Err( LoadError::Environment( EnvironmentError::FilesystemUnavailable ))));
	assert!( loader.runtime().is_ok() );

}

#[tokio::test]
async fn staging_dir_and_link_options_are_configurable() {

	use wasm_sideload::link::{ DynamicLinker, LinkOptions };
	use crate::doubles::RecordingLinker ;

	let fs = Arc::new( MemoryFs::new() );
	let linker = Arc::new( RecordingLinker::new( Arc::clone( &fs )));
	let runtime = RuntimeModule::new()
		.with_fs( Arc::clone( &fs ) as Arc<dyn VirtualFs> )
		.with_linker( Arc::clone( &linker ) as Arc<dyn DynamicLinker> );
	let options = LinkOptions { load_async: false, global: false, nodelete: true };
	let loader = SideModuleLoader::new( move || Ok( runtime.clone() ), Arc::new( StubFetcher::new() ) as Arc<dyn Fetcher> )
		.with_staging_dir( "/native/modules/" )
		.with_link_options( options );
	loader.initialize( Some( &host_config( &[ "a" ], json!({}), &[] ))).unwrap();

	loader.load( b"a", "a" ).await.unwrap();

	assert!( fs.contains_dir( "/native/modules" ));
	assert_eq!( linker.calls()[ 0 ].path, "/native/modules/a.wasm" );
	assert_eq!( linker.calls()[ 0 ].options, options );

}

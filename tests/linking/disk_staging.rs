use std::sync::Arc ;
use serde_json::json ;
use wasm_sideload::LoadError ;
use wasm_sideload::fs::{ DiskFs, FsError, VirtualFs };

use crate::doubles::{ host_config, url, StubFetcher };
use crate::wasm_host::{ WasmHost, BASE, USER };

#[tokio::test]
async fn modules_are_staged_under_the_disk_root() {

	let root = tempfile::tempdir().unwrap();
	let fs = Arc::new( DiskFs::new( root.path() ));
	let host = WasmHost::on(
		Arc::clone( &fs ) as Arc<dyn VirtualFs>,
		StubFetcher::new().serve( url( "base.wasm" ), BASE ).serve( url( "user.wasm" ), USER ),
	);
	let config = host_config( &[ "base", "user" ], json!({}), &[ "base", "user" ]);

	host.loader.on_runtime_ready( &|| Some( config.clone() )).await.unwrap();

	let staged = root.path().join( "itexoft" );
	assert_eq!( std::fs::read( staged.join( "base.wasm" )).unwrap(), BASE.as_bytes() );
	assert_eq!( std::fs::read( staged.join( "user.wasm" )).unwrap(), USER.as_bytes() );
	assert_eq!( host.linker.call_i32( "user", "get" ).unwrap(), 21 );

}

#[tokio::test]
async fn nested_staging_dirs_are_created() {

	let root = tempfile::tempdir().unwrap();
	let host = WasmHost::configured( Arc::new( DiskFs::new( root.path() )), StubFetcher::new(), | loader | {
		loader.with_staging_dir( "/opt/side/modules/" )
	});
	host.loader.initialize( Some( &host_config( &[ "base" ], json!({}), &[] ))).unwrap();

	host.loader.load( BASE.as_bytes(), "base" ).await.unwrap();

	assert!( root.path().join( "opt/side/modules/base.wasm" ).is_file() );
	assert!( host.linker.is_linked( "base" ));

}

#[tokio::test]
async fn staging_dir_cannot_escape_the_root() {

	let root = tempfile::tempdir().unwrap();
	let host = WasmHost::configured( Arc::new( DiskFs::new( root.path().join( "jail" ))), StubFetcher::new(), | loader | {
		loader.with_staging_dir( "/../outside" )
	});
	host.loader.initialize( Some( &host_config( &[ "base" ], json!({}), &[] ))).unwrap();

	let result = host.loader.load( BASE.as_bytes(), "base" ).await ;

	match result {
		Err( LoadError::Filesystem( err )) => assert!( matches!( *err, FsError::InvalidPath( _ ))),
		other => panic!( "expected an invalid path, got {:?}", other ),
	}
	assert!( !root.path().join( "outside" ).exists() );
	assert!( !host.linker.is_linked( "base" ));

}

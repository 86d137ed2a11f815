use serde_json::json ;
use wasm_sideload::LoadError ;

use crate::doubles::{ host_config, Harness, StubFetcher };

#[test]
fn second_initialization_is_rejected() {

	let harness = Harness::initialised( StubFetcher::new(), &[ "a" ], json!({}), &[] );

	let result = harness.loader.initialize( Some( &host_config( &[ "z" ], json!({}), &[] )));

	assert!( matches!( result, Err( LoadError::AlreadyInitialized )));
	assert!( harness.loader.has( "a" ).unwrap() );
	assert!( !harness.loader.has( "z" ).unwrap() );

}

#[test]
fn malformed_second_configuration_reports_config_error_first() {

	let harness = Harness::initialised( StubFetcher::new(), &[ "a" ], json!({}), &[] );

	let result = harness.loader.initialize( Some( &json!({ "extensions": {} })));

	assert!( matches!( result, Err( LoadError::Config( _ ))));
	assert!( harness.loader.has( "a" ).unwrap() );

}

#[tokio::test]
async fn runtime_ready_twice_fails_without_reloading() {

	let harness = Harness::new( StubFetcher::new().serve( crate::doubles::url( "a.wasm" ), b"a" ));
	let config = host_config( &[ "a" ], json!({}), &[ "a" ]);

	harness.loader.on_runtime_ready( &|| Some( config.clone() )).await.unwrap();
	let second = harness.loader.on_runtime_ready( &|| Some( config.clone() )).await ;

	assert!( matches!( second, Err( LoadError::AlreadyInitialized )));
	assert_eq!( harness.linker.linked(), vec![ "a" ]);
	assert_eq!( harness.fetcher.requests().len(), 1 );

}

use serde_json::json ;
use wasm_sideload::LoadError ;

use crate::doubles::{ url, Harness, StubFetcher };

fn harness_failing_on_b() -> Harness {
	Harness::initialised(
		StubFetcher::new()
			.serve( url( "a.wasm" ), b"a" )
			.respond( url( "b.wasm" ), 503, "Service Unavailable", b"" )
			.serve( url( "c.wasm" ), b"c" ),
		&[ "a", "b", "c" ], json!({}), &[ "a", "b", "c" ],
	)
}

#[tokio::test]
async fn first_failure_aborts_the_rest() {

	let harness = harness_failing_on_b();

	let result = harness.loader.run_auto_load().await ;

	assert!( matches!( result, Err( LoadError::Network { status: 503, .. })));
	assert_eq!( harness.linker.linked(), vec![ "a" ]);
	assert_eq!( harness.fetcher.requested_urls(), vec![ url( "a.wasm" ), url( "b.wasm" ) ]);

}

#[tokio::test]
async fn failure_is_memoized_not_retried() {

	let harness = harness_failing_on_b();

	let first = harness.loader.run_auto_load().await.unwrap_err();
	let second = harness.loader.run_auto_load().await.unwrap_err();

	assert_eq!( first.to_string(), second.to_string() );
	assert_eq!( harness.fetcher.requests().len(), 2 );
	assert!( matches!( harness.loader.auto_load_outcome(), Some( Err( LoadError::Network { status: 503, .. }))));

	// manual loads are unaffected by the failed pass
	harness.loader.load_by_name( "c" ).await.unwrap();
	assert_eq!( harness.linker.linked(), vec![ "a", "c" ]);

}

#[tokio::test]
async fn concurrent_callers_observe_the_same_failure() {

	let harness = harness_failing_on_b();

	let ( first, second ) = tokio::join!( harness.loader.run_auto_load(), harness.loader.run_auto_load() );

	assert!( matches!( first, Err( LoadError::Network { status: 503, .. })));
	assert!( matches!( second, Err( LoadError::Network { status: 503, .. })));
	assert_eq!( harness.fetcher.requests().len(), 2 );

}

#[tokio::test]
async fn link_failure_surfaces_through_runtime_ready() {

	let harness = Harness::new( StubFetcher::new().serve( url( "a.wasm" ), b"a" ).serve( url( "b.wasm" ), b"b" ));
	harness.linker.fail_on( "a" );
	let config = crate::doubles::host_config( &[ "a", "b" ], json!({}), &[ "a", "b" ]);

	let result = harness.loader.on_runtime_ready( &|| Some( config.clone() )).await ;

	assert!( matches!( result, Err( LoadError::Link( _ ))));
	assert!( harness.linker.linked().is_empty() );
	assert_eq!( harness.fetcher.requested_urls(), vec![ url( "a.wasm" ) ]);
	assert!( harness.loader.is_initialized() );

}

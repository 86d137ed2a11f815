use serde_json::json ;

use crate::doubles::{ host_config, url, Harness, StubFetcher };

fn harness() -> Harness {
	Harness::new(
		StubFetcher::new()
			.serve( url( "a.wasm" ), b"a" )
			.serve( url( "b.wasm" ), b"b" ),
	)
}

async fn until_linked( harness: &Harness, count: usize ) {
	while harness.linker.linked().len() < count { tokio::task::yield_now().await }
}

#[tokio::test]
async fn dropped_caller_does_not_restart_the_pass() {

	let harness = harness();
	harness.loader.initialize( Some( &host_config( &[ "a", "b" ], json!({}), &[ "a", "b" ]))).unwrap();

	tokio::select! {
		biased ;
		_ = harness.loader.run_auto_load() => {},
		() = until_linked( &harness, 1 ) => {},
	}
	harness.loader.run_auto_load().await.unwrap();

	assert_eq!( harness.linker.linked(), vec![ "a", "b" ]);
	assert_eq!( harness.fetcher.requested_urls(), vec![ url( "a.wasm" ), url( "b.wasm" ) ]);

}

#[tokio::test]
async fn pass_finishes_without_any_caller_left() {

	let harness = harness();
	let config = host_config( &[ "a", "b" ], json!({}), &[ "a", "b" ]);
	let api = || Some( config.clone() );

	tokio::select! {
		biased ;
		_ = harness.loader.on_runtime_ready( &api ) => {},
		() = until_linked( &harness, 1 ) => {},
	}
	until_linked( &harness, 2 ).await ;
	while harness.loader.auto_load_outcome().is_none() { tokio::task::yield_now().await }

	assert!( matches!( harness.loader.auto_load_outcome(), Some( Ok(()) )));
	assert_eq!( harness.linker.linked(), vec![ "a", "b" ]);
	assert_eq!( harness.fetcher.requests().len(), 2 );

}

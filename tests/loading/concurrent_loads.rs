use serde_json::json ;

use crate::doubles::{ url, Harness, StubFetcher };

#[tokio::test]
async fn loads_of_one_module_do_not_interleave() {

	let harness = Harness::initialised( StubFetcher::new(), &[ "a" ], json!({}), &[] );

	let ( first, second, third ) = tokio::join!(
		harness.loader.load( b"one", "a" ),
		harness.loader.load( b"two", "a" ),
		harness.loader.load( b"three", "a" ),
	);

	assert!( first.is_ok() && second.is_ok() && third.is_ok() );
	assert_eq!( harness.linker.max_in_flight(), 1 );
	let calls = harness.linker.calls();
	assert_eq!( calls.len(), 3 );
	// nobody overwrote the staged file while it was being linked
	assert!( calls.iter().all(| call | call.bytes_at_start == call.bytes_at_end ));

}

#[tokio::test]
async fn loads_of_different_modules_run_concurrently() {

	let harness = Harness::initialised( StubFetcher::new(), &[ "a", "b" ], json!({}), &[] );

	let ( a, b ) = tokio::join!(
		harness.loader.load( b"a", "a" ),
		harness.loader.load( b"b", "b" ),
	);

	assert!( a.is_ok() && b.is_ok() );
	assert_eq!( harness.linker.max_in_flight(), 2 );

}

#[tokio::test]
async fn concurrent_fetches_of_one_module_link_one_at_a_time() {

	let harness = Harness::initialised(
		StubFetcher::new().serve( url( "a.wasm" ), b"a" ).serve( url( "b.wasm" ), b"b" ),
		&[ "a", "b" ], json!({}), &[],
	);

	let ( a, b, again ) = tokio::join!(
		harness.loader.load_by_name( "a" ),
		harness.loader.load_by_name( "b" ),
		harness.loader.load_by_name( "a" ),
	);

	assert!( a.is_ok() && b.is_ok() && again.is_ok() );
	let mut linked = harness.linker.linked();
	linked.sort();
	assert_eq!( linked, vec![ "a", "a", "b" ]);
	assert!( harness.linker.calls().iter().all(| call | call.bytes_at_start == call.bytes_at_end ));

}

//! Network access used by [`SideModuleLoader::load_by_name`]( crate::SideModuleLoader::load_by_name ).
//!
//! Fetching is split in two steps, like a browser `fetch`: the request resolves to a
//! response whose status can be inspected before the body is read.

mod http_fetcher ;

pub use http_fetcher::HttpFetcher ;

use async_trait::async_trait ;
use reqwest::Url ;
use serde::{ Deserialize, Serialize };
use thiserror::Error ;

/// When credentials (cookies, authorization) accompany a request.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize )]
#[serde( rename_all = "kebab-case" )]
pub enum CredentialsMode {
	/// Never send credentials.
	Omit,
	/// Send credentials only to the origin of the document.
	#[default] SameOrigin,
	/// Always send credentials.
	Include,
}

#[derive( Error, Debug )]
pub enum FetchError {
	#[error( "Transport Error: {0}" )] Transport( #[from] reqwest::Error ),
	#[error( "Body Read Error: {0}" )] Body( String ),
}

/// A single outgoing request.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct FetchRequest {
	pub url: Url,
	pub credentials: CredentialsMode,
}

/// A response whose headers have arrived but whose body may not have.
#[async_trait]
pub trait FetchResponse: Send {

	fn status( &self ) -> u16 ;

	/// Reason phrase accompanying the status. Empty, or the canonical phrase, if the
	/// server sent none.
	fn status_text( &self ) -> &str ;

	#[inline] fn ok( &self ) -> bool { ( 200..300 ).contains( &self.status() ) }

	/// Reads the full body.
	///
	/// # Errors
	/// Fails if the connection drops before the body is complete.
	async fn bytes( self: Box<Self> ) -> Result<Vec<u8>, FetchError> ;

}

/// Performs HTTP requests on behalf of the loader.
#[async_trait]
pub trait Fetcher: Send + Sync {

	/// # Errors
	/// Fails only on transport problems; an unsuccessful status is still a response.
	async fn fetch( &self, request: FetchRequest ) -> Result<Box<dyn FetchResponse>, FetchError> ;

}

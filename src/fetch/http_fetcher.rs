use async_trait::async_trait ;
use hyper::ext::ReasonPhrase ;
use reqwest::header::HeaderMap ;
use reqwest::{ Client, Response, Url };

use super::{ CredentialsMode, FetchError, FetchRequest, FetchResponse, Fetcher };



/// A [`Fetcher`] built on `reqwest`.
///
/// Credentials are an explicit set of headers bound to an origin. They are attached
/// according to each request's [`CredentialsMode`].
#[derive( Debug, Clone, Default )]
pub struct HttpFetcher {
	client: Client,
	origin: Option<Url>,
	credentials: HeaderMap,
}

impl HttpFetcher {

	pub fn new() -> Self { Self::default() }

	/// Uses an existing client, sharing its connection pool and settings.
	pub fn with_client( mut self, client: Client ) -> Self {
		self.client = client ;
		self
	}

	/// Sets the credential headers and the document origin they belong to.
	pub fn with_credentials( mut self, origin: Url, credentials: HeaderMap ) -> Self {
		self.origin = Some( origin );
		self.credentials = credentials ;
		self
	}

	/// Whether credentials go along with a request for `url` under `mode`.
	pub fn sends_credentials( &self, url: &Url, mode: CredentialsMode ) -> bool {
		match mode {
			CredentialsMode::Omit => false,
			CredentialsMode::Include => true,
			CredentialsMode::SameOrigin => self.origin.as_ref().is_some_and(| origin | origin.origin() == url.origin() ),
		}
	}

}

#[async_trait]
impl Fetcher for HttpFetcher {

	async fn fetch( &self, request: FetchRequest ) -> Result<Box<dyn FetchResponse>, FetchError> {
		let mut builder = self.client.get( request.url.clone() );
		if self.sends_credentials( &request.url, request.credentials ) {
			builder = builder.headers( self.credentials.clone() );
		}
		let response = builder.send().await?;
		Ok( Box::new( HttpResponse { response }))
	}

}

struct HttpResponse {
	response: Response,
}

#[async_trait]
impl FetchResponse for HttpResponse {

	fn status( &self ) -> u16 { self.response.status().as_u16() }

	/// The reason phrase the server sent, or the canonical one for the status when it
	/// sent none (always the case over HTTP/2).
	fn status_text( &self ) -> &str {
		self.response.extensions()
			.get::<ReasonPhrase>()
			.and_then(| phrase | std::str::from_utf8( phrase.as_bytes() ).ok() )
			.or_else(|| self.response.status().canonical_reason() )
			.unwrap_or( "" )
	}

	async fn bytes( self: Box<Self> ) -> Result<Vec<u8>, FetchError> {
		Ok( self.response.bytes().await?.to_vec() )
	}

}

#[cfg( test )]
mod tests {

	use super::* ;

	fn url( url: &str ) -> Url { Url::parse( url ).unwrap() }

	#[test]
	fn same_origin_credentials_follow_the_document_origin() {
		let fetcher = HttpFetcher::new().with_credentials( url( "https://app.example/index.html" ), HeaderMap::new() );
		assert!( fetcher.sends_credentials( &url( "https://app.example/lib/a.wasm" ), CredentialsMode::SameOrigin ));
		assert!( !fetcher.sends_credentials( &url( "https://cdn.example/a.wasm" ), CredentialsMode::SameOrigin ));
		assert!( !fetcher.sends_credentials( &url( "http://app.example/a.wasm" ), CredentialsMode::SameOrigin ));
		assert!( !fetcher.sends_credentials( &url( "https://app.example:8443/a.wasm" ), CredentialsMode::SameOrigin ));
	}

	#[test]
	fn omit_and_include_ignore_origin() {
		let fetcher = HttpFetcher::new().with_credentials( url( "https://app.example/" ), HeaderMap::new() );
		assert!( !fetcher.sends_credentials( &url( "https://app.example/a.wasm" ), CredentialsMode::Omit ));
		assert!( fetcher.sends_credentials( &url( "https://cdn.example/a.wasm" ), CredentialsMode::Include ));
	}

	#[test]
	fn no_origin_means_no_same_origin_credentials() {
		assert!( !HttpFetcher::new().sends_credentials( &url( "https://app.example/a.wasm" ), CredentialsMode::SameOrigin ));
	}

}

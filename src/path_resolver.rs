use reqwest::Url ;

use crate::module_name::ModuleName ;
use crate::runtime::EnvironmentError ;



/// Turns a module name into the absolute URL its bytes are fetched from.
///
/// The path is the module's configured override when there is one, `<name>.wasm`
/// otherwise, and is resolved against the document base URI the same way a browser
/// resolves a relative link.
#[derive( Debug, Clone, Default )]
pub struct PathResolver {
	base_uri: Option<Url>,
}

impl PathResolver {

	pub fn new( base_uri: Option<Url> ) -> Self { Self { base_uri } }

	#[inline] pub fn base_uri( &self ) -> Option<&Url> { self.base_uri.as_ref() }

	/// # Errors
	/// Fails if no base URI is available or the chosen path cannot be joined onto it.
	pub fn resolve( &self, name: &ModuleName, path_override: Option<&str> ) -> Result<Url, EnvironmentError> {
		let path = path_override.map_or_else(|| name.file_name(), str::to_string );
		let base = self.base_uri.as_ref().ok_or( EnvironmentError::BaseUriUnavailable )?;
		base.join( &path ).map_err(| err | EnvironmentError::UnresolvablePath { path, reason: err.to_string() })
	}

}

#[cfg( test )]
mod tests {

	use super::* ;

	fn resolver( base: &str ) -> PathResolver {
		PathResolver::new( Some( Url::parse( base ).unwrap() ))
	}

	#[test]
	fn default_path_is_relative_to_document() {
		let name = ModuleName::new( "foo" ).unwrap();
		let url = resolver( "https://app.example/sub/index.html" ).resolve( &name, None ).unwrap();
		assert_eq!( url.as_str(), "https://app.example/sub/foo.wasm" );
	}

	#[test]
	fn override_replaces_default_path() {
		let name = ModuleName::new( "foo" ).unwrap();
		let url = resolver( "https://app.example/sub/" ).resolve( &name, Some( "custom/foo-v2.wasm" )).unwrap();
		assert_eq!( url.as_str(), "https://app.example/sub/custom/foo-v2.wasm" );
	}

	#[test]
	fn absolute_override_ignores_base_path() {
		let name = ModuleName::new( "foo" ).unwrap();
		let resolver = resolver( "https://app.example/sub/" );
		assert_eq!( resolver.resolve( &name, Some( "/root.wasm" )).unwrap().as_str(), "https://app.example/root.wasm" );
		assert_eq!( resolver.resolve( &name, Some( "https://cdn.example/x.wasm" )).unwrap().as_str(), "https://cdn.example/x.wasm" );
	}

	#[test]
	fn missing_base_uri_is_an_environment_error() {
		let name = ModuleName::new( "foo" ).unwrap();
		assert!( matches!( PathResolver::new( None ).resolve( &name, None ), Err( EnvironmentError::BaseUriUnavailable )));
	}

}

//! Module identifiers.
//!
//! A [`ModuleName`] is both the registry key of a side module and the stem of the
//! file it is staged under, so it may never contain a path separator.

use std::borrow::Borrow ;
use std::fmt::Display ;
use thiserror::Error ;

/// Extension appended to a [`ModuleName`] to form its default file name.
pub const MODULE_EXTENSION: &str = ".wasm" ;

/// Reasons a module identifier is rejected.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum ValidationError {
	/// The name is an empty string.
	#[error( "name is empty" )] Empty,
	/// The name contains `/` or `\`.
	#[error( "name contains path separators: '{0}'" )] PathSeparator( String ),
	/// The name was supplied as something other than a string.
	#[error( "name must be a string, found {0}" )] NotAString( String ),
}

/// Checks that `name` is usable as a module identifier.
///
/// # Errors
/// Fails if `name` is empty or contains `/` or `\`.
pub fn validate( name: &str ) -> Result<(), ValidationError> {
	if name.is_empty() { return Err( ValidationError::Empty ) }
	if name.contains([ '/', '\\' ]) { return Err( ValidationError::PathSeparator( name.to_string() )) }
	Ok(())
}

/// A validated side module identifier.
///
/// Can only be constructed through [`validate`], so holding one is proof the
/// name is non-empty and free of path separators.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct ModuleName( String );

impl ModuleName {

	/// Validates `name` and wraps it.
	///
	/// # Errors
	/// See [`validate`].
	pub fn new( name: impl Into<String> ) -> Result<Self, ValidationError> {
		let name = name.into();
		validate( &name )?;
		Ok( Self( name ))
	}

	#[inline] pub fn as_str( &self ) -> &str { &self.0 }

	/// The file name this module is staged and fetched under by default.
	#[inline] pub fn file_name( &self ) -> String { format!( "{}{}", self.0, MODULE_EXTENSION ) }

}

impl TryFrom<&str> for ModuleName {
	type Error = ValidationError ;
	fn try_from( name: &str ) -> Result<Self, Self::Error> { Self::new( name ) }
}

impl TryFrom<String> for ModuleName {
	type Error = ValidationError ;
	fn try_from( name: String ) -> Result<Self, Self::Error> { Self::new( name ) }
}

impl TryFrom<&serde_json::Value> for ModuleName {
	type Error = ValidationError ;
	fn try_from( value: &serde_json::Value ) -> Result<Self, Self::Error> {
		match value {
			serde_json::Value::String( name ) => Self::new( name.as_str() ),
			other => Err( ValidationError::NotAString( other.to_string() )),
		}
	}
}

impl AsRef<str> for ModuleName {
	fn as_ref( &self ) -> &str { &self.0 }
}

impl Borrow<str> for ModuleName {
	fn borrow( &self ) -> &str { &self.0 }
}

impl Display for ModuleName {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result { f.write_str( &self.0 ) }
}

#[cfg( test )]
mod tests {

	use super::* ;

	#[test]
	fn accepts_plain_names() {
		assert!( validate( "libfoo" ).is_ok() );
		assert!( validate( "a.b-c_d" ).is_ok() );
		assert!( validate( ".." ).is_ok() );
		assert!( validate( " " ).is_ok() );
	}

	#[test]
	fn rejects_empty_and_separators() {
		assert_eq!( validate( "" ), Err( ValidationError::Empty ));
		assert_eq!( validate( "a/b" ), Err( ValidationError::PathSeparator( "a/b".into() )));
		assert_eq!( validate( "a\\b" ), Err( ValidationError::PathSeparator( "a\\b".into() )));
		assert_eq!( validate( "/" ), Err( ValidationError::PathSeparator( "/".into() )));
	}

	#[test]
	fn rejects_non_string_json() {
		let err = ModuleName::try_from( &serde_json::json!( 42 )).unwrap_err();
		assert_eq!( err, ValidationError::NotAString( "42".into() ));
		assert!( ModuleName::try_from( &serde_json::Value::Null ).is_err() );
	}

	#[test]
	fn file_name_appends_extension() {
		assert_eq!( ModuleName::new( "foo" ).unwrap().file_name(), "foo.wasm" );
	}

}

//! Binding of the host's runtime configuration into registry state.
//!
//! The host hands over its whole configuration bag; only
//! `extensions.extra.{ itexoftNativeModules, itexoftNativeModulePaths, itexoftNativeAutoLoad }`
//! is read. All three keys are required, but any of them may be empty.

use std::collections::{ HashMap, HashSet };
use itertools::Itertools ;
use pipe_trait::Pipe ;
use serde_json::{ Map, Value };
use thiserror::Error ;

use crate::module_name::ModuleName ;
use crate::LoadError ;

pub const MODULES_KEY: &str = "itexoftNativeModules" ;
pub const MODULE_PATHS_KEY: &str = "itexoftNativeModulePaths" ;
pub const AUTO_LOAD_KEY: &str = "itexoftNativeAutoLoad" ;

const EXTRA_PATH: &str = "runtime config.extensions.extra" ;

/// Errors caused by a missing or malformed host configuration.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum ConfigError {
	/// A section of the configuration is absent or not an object.
	#[error( "{0} is not available" )] SectionUnavailable( &'static str ),
	/// A required key is absent from `extensions.extra`.
	#[error( "runtime config.extensions.extra.{0} is missing" )] MissingKey( &'static str ),
	/// A key is present but holds the wrong kind of value.
	#[error( "runtime config.extensions.extra.{key} must be {expected}" )]
	WrongType { key: &'static str, expected: &'static str },
	/// A path override maps to an empty string or a non-string.
	#[error( "runtime config.extensions.extra.itexoftNativeModulePaths values must be non-empty strings (offending module '{0}')" )]
	InvalidPath( String ),
	/// The auto-load list names a module that is not registered.
	#[error( "runtime config.extensions.extra.itexoftNativeAutoLoad contains unknown module '{0}'" )]
	UnknownAutoLoad( String ),
}

/// Registry contents produced from a validated configuration.
#[derive( Debug, Clone, Default, PartialEq, Eq )]
pub struct NativeModulesConfig {
	/// Every module the host declared as loadable.
	pub modules: HashSet<ModuleName>,
	/// Explicit fetch paths, keyed by module.
	pub paths: HashMap<ModuleName, String>,
	/// Modules loaded at startup, in declaration order, without duplicates.
	pub auto_load: Vec<ModuleName>,
}

impl NativeModulesConfig {

	/// Reads and validates the native module section of a host configuration.
	///
	/// Nothing is partially applied: either the whole section is valid and a config is
	/// returned, or the first problem found is reported.
	///
	/// # Errors
	/// [`LoadError::Config`] for structural problems and unknown auto-load entries,
	/// [`LoadError::Validation`] for malformed module names.
	pub fn from_host_config( config: Option<&Value> ) -> Result<Self, LoadError> {

		let config = config
			.and_then( Value::as_object )
			.ok_or( ConfigError::SectionUnavailable( "runtime config" ))?;
		let extensions = config.get( "extensions" )
			.and_then( Value::as_object )
			.ok_or( ConfigError::SectionUnavailable( "runtime config.extensions" ))?;
		let extra = extensions.get( "extra" )
			.and_then( Value::as_object )
			.ok_or( ConfigError::SectionUnavailable( EXTRA_PATH ))?;

		let modules = required( extra, MODULES_KEY )?;
		let paths = required( extra, MODULE_PATHS_KEY )?;
		let auto_load = required( extra, AUTO_LOAD_KEY )?;

		let modules = name_list( MODULES_KEY, modules )?.into_iter().collect::<HashSet<_>>();
		let paths = path_map( paths )?;
		let auto_load = name_list( AUTO_LOAD_KEY, auto_load )?
			.into_iter()
			.map(| name | match modules.contains( &name ) {
				true => Ok( name ),
				false => Err( ConfigError::UnknownAutoLoad( name.to_string() )),
			})
			.collect::<Result<Vec<_>, _>>()?
			.into_iter()
			.unique()
			.collect();

		Ok( Self { modules, paths, auto_load })

	}

}

#[inline] fn required<'a>( extra: &'a Map<String, Value>, key: &'static str ) -> Result<&'a Value, ConfigError> {
	extra.get( key ).ok_or( ConfigError::MissingKey( key ))
}

fn name_list( key: &'static str, value: &Value ) -> Result<Vec<ModuleName>, LoadError> {
	value.as_array()
		.ok_or( ConfigError::WrongType { key, expected: "an array" })?
		.iter()
		.map( ModuleName::try_from )
		.collect::<Result<Vec<_>, _>>()?
		.pipe( Ok )
}

fn path_map( value: &Value ) -> Result<HashMap<ModuleName, String>, LoadError> {
	value.as_object()
		.ok_or( ConfigError::WrongType { key: MODULE_PATHS_KEY, expected: "an object" })?
		.iter()
		.map(|( name, path )| -> Result<_, LoadError> {
			let name = ModuleName::new( name.as_str() )?;
			match path.as_str() {
				Some( path ) if !path.is_empty() => Ok(( name, path.to_string() )),
				_ => Err( ConfigError::InvalidPath( name.to_string() ).into() ),
			}
		})
		.collect()
}

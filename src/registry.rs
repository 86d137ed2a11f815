//! In-memory registry of known side modules.
//!
//! The registry starts out uninitialized. It is populated exactly once from a
//! [`NativeModulesConfig`]; afterwards only the set of known names may grow, through
//! [`Registry::add`]. Path overrides and the auto-load list are frozen.

use std::collections::{ HashMap, HashSet };

use crate::config::NativeModulesConfig ;
use crate::module_name::ModuleName ;
use crate::LoadError ;



/// The known side modules, their path overrides and the auto-load list.
#[derive( Debug, Default )]
pub struct Registry {
	state: Option<NativeModulesConfig>,
}

impl Registry {

	/// Creates an empty, uninitialized registry.
	pub fn new() -> Self { Self { state: None } }

	/// Populates the registry.
	///
	/// # Errors
	/// [`LoadError::AlreadyInitialized`] if the registry was populated before. The
	/// existing contents are left untouched in that case.
	pub fn initialize( &mut self, config: NativeModulesConfig ) -> Result<(), LoadError> {
		match self.state {
			Some( _ ) => Err( LoadError::AlreadyInitialized ),
			None => {
				self.state = Some( config );
				Ok(())
			},
		}
	}

	#[inline] pub fn is_initialized( &self ) -> bool { self.state.is_some() }

	/// Registers another loadable module. Adding a known name is a no-op.
	///
	/// # Errors
	/// Fails if `name` is malformed or the registry is uninitialized.
	pub fn add( &mut self, name: &str ) -> Result<(), LoadError> {
		let name = ModuleName::new( name )?;
		self.state_mut()?.modules.insert( name );
		Ok(())
	}

	/// Whether `name` is a known module.
	///
	/// # Errors
	/// Fails if `name` is malformed or the registry is uninitialized.
	pub fn has( &self, name: &str ) -> Result<bool, LoadError> {
		crate::module_name::validate( name )?;
		Ok( self.state()?.modules.contains( name ))
	}

	/// Validates `name` and checks it is registered, in that order.
	///
	/// # Errors
	/// [`LoadError::Validation`], then [`LoadError::Uninitialized`], then
	/// [`LoadError::UnknownModule`].
	pub fn require_known( &self, name: &str ) -> Result<ModuleName, LoadError> {
		let name = ModuleName::new( name )?;
		match self.state()?.modules.contains( &name ) {
			true => Ok( name ),
			false => Err( LoadError::UnknownModule( name.to_string() )),
		}
	}

	/// The explicit fetch path configured for `name`, if any.
	pub fn path_override( &self, name: &ModuleName ) -> Option<&str> {
		self.state.as_ref()?.paths.get( name ).map( String::as_str )
	}

	/// Modules to load at startup, in declaration order.
	///
	/// # Errors
	/// [`LoadError::Uninitialized`] if the auto-load list was never established.
	pub fn auto_load( &self ) -> Result<&[ModuleName], LoadError> {
		Ok( &self.state()?.auto_load )
	}

	/// Read-only view of every known module.
	///
	/// # Errors
	/// [`LoadError::Uninitialized`] if the registry was never populated.
	pub fn modules( &self ) -> Result<&HashSet<ModuleName>, LoadError> {
		Ok( &self.state()?.modules )
	}

	/// Read-only view of the configured path overrides.
	///
	/// # Errors
	/// [`LoadError::Uninitialized`] if the registry was never populated.
	pub fn path_overrides( &self ) -> Result<&HashMap<ModuleName, String>, LoadError> {
		Ok( &self.state()?.paths )
	}

	#[inline] fn state( &self ) -> Result<&NativeModulesConfig, LoadError> {
		self.state.as_ref().ok_or( LoadError::Uninitialized )
	}

	#[inline] fn state_mut( &mut self ) -> Result<&mut NativeModulesConfig, LoadError> {
		self.state.as_mut().ok_or( LoadError::Uninitialized )
	}

}

#[cfg( test )]
mod tests {

	use super::* ;

	fn names( names: &[&str] ) -> HashSet<ModuleName> {
		names.iter().map(| name | ModuleName::new( *name ).unwrap() ).collect()
	}

	#[test]
	fn uninitialized_registry_rejects_everything() {
		let mut registry = Registry::new();
		assert!( matches!( registry.has( "a" ), Err( LoadError::Uninitialized )));
		assert!( matches!( registry.add( "a" ), Err( LoadError::Uninitialized )));
		assert!( matches!( registry.auto_load(), Err( LoadError::Uninitialized )));
		assert!( matches!( registry.require_known( "a" ), Err( LoadError::Uninitialized )));
	}

	#[test]
	fn validation_precedes_initialization_check() {
		let registry = Registry::new();
		assert!( matches!( registry.has( "a/b" ), Err( LoadError::Validation( _ ))));
		assert!( matches!( registry.require_known( "" ), Err( LoadError::Validation( _ ))));
	}

	#[test]
	fn add_is_idempotent() {
		let mut registry = Registry::new();
		registry.initialize( NativeModulesConfig { modules: names( &[ "a" ]), ..Default::default() }).unwrap();
		registry.add( "b" ).unwrap();
		registry.add( "b" ).unwrap();
		assert!( registry.has( "b" ).unwrap() );
		assert_eq!( registry.modules().unwrap().len(), 2 );
	}

	#[test]
	fn second_initialization_keeps_first_state() {
		let mut registry = Registry::new();
		registry.initialize( NativeModulesConfig { modules: names( &[ "a" ]), ..Default::default() }).unwrap();
		let result = registry.initialize( NativeModulesConfig { modules: names( &[ "z" ]), ..Default::default() });
		assert!( matches!( result, Err( LoadError::AlreadyInitialized )));
		assert!( registry.has( "a" ).unwrap() );
		assert!( !registry.has( "z" ).unwrap() );
	}

}

use std::sync::{ Arc, PoisonError };
use tokio::sync::watch ;

use crate::module_name::ModuleName ;
use super::{ LoadError, SideModuleLoader };

/// Outcome of the auto-load pass; `None` while it is running.
pub(super) type AutoLoadOutcome = Option<Result<(), LoadError>> ;



impl SideModuleLoader {

	/// Loads every auto-load module, one after another in declaration order.
	///
	/// The pass runs at most once per loader, as a task of its own: dropping the
	/// caller that started it does not stop or restart it. Callers arriving while it
	/// is in flight wait for it, callers arriving after it finished get its outcome;
	/// neither starts any work. A failed pass stays failed: the first failing module
	/// aborts the rest, and every caller observes that same error.
	///
	/// # Errors
	/// [`LoadError::Uninitialized`] if the registry was never populated (this is not
	/// memoized), [`LoadError::AutoLoadAborted`] if the pass task died, otherwise the
	/// error of the first module that failed to load.
	pub async fn run_auto_load( self: &Arc<Self> ) -> Result<(), LoadError> {
		let mut outcome = self.auto_load_pass()?;
		let finished = ( *outcome.wait_for( Option::is_some ).await.map_err(| _ | LoadError::AutoLoadAborted )? ).clone();
		finished.unwrap_or( Err( LoadError::AutoLoadAborted ))
	}

	/// Outcome of the auto-load pass, if it has finished.
	pub fn auto_load_outcome( &self ) -> Option<Result<(), LoadError>> {
		self.auto_load.lock().unwrap_or_else( PoisonError::into_inner )
			.as_ref()
			.and_then(| outcome | ( *outcome.borrow() ).clone() )
	}

	/// Subscribes to the pass, starting it on first use.
	fn auto_load_pass( self: &Arc<Self> ) -> Result<watch::Receiver<AutoLoadOutcome>, LoadError> {

		let mut pass = self.auto_load.lock().unwrap_or_else( PoisonError::into_inner );
		if let Some( outcome ) = pass.as_ref() { return Ok( outcome.clone() ) }

		let modules = self.registry().auto_load()?.to_vec();
		let ( sender, receiver ) = watch::channel( None );
		let loader = Arc::clone( self );
		tokio::spawn( async move {
			let outcome = loader.load_in_order( modules ).await ;
			sender.send_replace( Some( outcome ));
		});

		*pass = Some( receiver.clone() );
		Ok( receiver )

	}

	async fn load_in_order( &self, modules: Vec<ModuleName> ) -> Result<(), LoadError> {
		tracing::debug!( count = modules.len(), "starting auto-load pass" );
		for name in &modules {
			if let Err( err ) = self.load_by_name( name.as_str() ).await {
				tracing::warn!( module = %name, error = %err, "auto-load aborted" );
				return Err( err );
			}
		}
		tracing::info!( count = modules.len(), "auto-load pass complete" );
		Ok(())
	}

}

//! Runtime adapters hosting the periodic sampling and cleanup timers.

pub mod timer;
pub mod tokio_spawner;

use std::future::Future;

pub use timer::PeriodicTask;
pub use tokio_spawner::TokioSpawner;

/// Abstraction for spawning background futures on a runtime.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

//! Thread pools the store node server runs its connections on.

use crate::errors::Result;

mod naive;
mod rayon;
mod shared_queue;

pub use self::naive::NaiveThreadPool;
pub use self::rayon::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;

/// A pool that runs jobs on some set of threads
pub trait ThreadPool {
    /// Create a pool with `threads` threads
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// Run `job` on the pool. A panicking job must not
    /// take the pool down with it.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}

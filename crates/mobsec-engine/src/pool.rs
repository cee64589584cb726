//! Worker pool abstraction used by the asynchronous executor

use std::sync::Arc;

/// A unit of work handed to a worker pool
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A caller-owned pool that runs submitted jobs.
///
/// The executor only submits work; creating and shutting down the pool is
/// up to the caller. A pool that drops a job without running it makes the
/// matching result handle resolve to an abandoned error.
pub trait ExecutorService: Send + Sync {
    /// Queue a job for execution
    fn submit(&self, job: Job);
}

impl ExecutorService for rayon::ThreadPool {
    fn submit(&self, job: Job) {
        self.spawn(job);
    }
}

impl<P: ExecutorService + ?Sized> ExecutorService for Arc<P> {
    fn submit(&self, job: Job) {
        (**self).submit(job);
    }
}

/// Build a fixed-size rayon pool for check execution
pub fn fixed_thread_pool(threads: usize) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|i| format!("mobsec-check-{}", i))
        .build()
}

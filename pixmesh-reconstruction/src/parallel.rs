//! Parallel processing utilities for per-object work
//!
//! Objects cut out of one image share no state, so outlining and face
//! building fan out over a rayon pool. A dedicated pool can be installed once
//! with [`init_thread_pool`]; otherwise rayon's global pool is used.

use pixmesh_core::{Error, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::OnceLock;

static THREAD_POOL: OnceLock<ThreadPool> = OnceLock::new();

/// Below this many items work stays on the calling thread
pub const MIN_PARALLEL_ITEMS: usize = 2;

/// Worker settings for the object pool
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Worker count, `None` lets rayon pick one per core
    pub num_threads: Option<usize>,
    /// Worker stack size in bytes
    pub stack_size: Option<usize>,
    /// Workers are named `<prefix>-object-<index>`
    pub thread_name_prefix: String,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            stack_size: None,
            thread_name_prefix: "pixmesh".to_string(),
        }
    }
}

impl ThreadPoolConfig {
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Spawns a pool with these settings without installing it
    pub fn build(&self) -> Result<ThreadPool> {
        let prefix = self.thread_name_prefix.clone();
        // rayon reads 0 as one worker per core
        let builder = ThreadPoolBuilder::new()
            .num_threads(self.num_threads.unwrap_or(0))
            .thread_name(move |index| format!("{}-object-{}", prefix, index));
        let builder = match self.stack_size {
            Some(stack_size) => builder.stack_size(stack_size),
            None => builder,
        };

        builder.build().map_err(|e| {
            Error::Algorithm(format!(
                "cannot spawn object workers ({:?} threads requested): {}",
                self.num_threads, e
            ))
        })
    }
}

/// Installs the pool that per-object outlining and face building run on.
///
/// Only the first successful call takes effect. Later calls keep the running
/// pool, log that their settings were ignored and report its size.
///
/// # Returns
/// * `usize` - Worker count of the installed pool
///
/// # Errors
/// * `Error::Algorithm` - rayon could not spawn the workers
pub fn init_thread_pool(config: &ThreadPoolConfig) -> Result<usize> {
    if let Some(pool) = THREAD_POOL.get() {
        log::debug!(
            "object pool already running with {} workers, ignoring {:?}",
            pool.current_num_threads(),
            config
        );
        return Ok(pool.current_num_threads());
    }

    let pool = config.build()?;
    match THREAD_POOL.set(pool) {
        Ok(()) => log::debug!("object pool ready with {} workers", current_num_threads()),
        Err(unused) => log::debug!(
            "object pool installed concurrently, dropping a second one with {} workers",
            unused.current_num_threads()
        ),
    }
    Ok(current_num_threads())
}

/// Threads available to [`parallel_map`]
pub fn current_num_threads() -> usize {
    THREAD_POOL
        .get()
        .map_or_else(rayon::current_num_threads, |pool| pool.current_num_threads())
}

fn execute_parallel<F, R>(op: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    match THREAD_POOL.get() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Maps `f` over `data`, in parallel when `enabled`, keeping input order
pub fn parallel_map<T, U, F>(data: &[T], enabled: bool, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    if !enabled || data.len() < MIN_PARALLEL_ITEMS {
        return data.iter().map(f).collect();
    }

    execute_parallel(|| data.par_iter().map(f).collect())
}

/// Fallible [`parallel_map`]; the first error in input order is not
/// guaranteed, only that some error is returned when any item fails
pub fn try_parallel_map<T, U, F>(data: &[T], enabled: bool, f: F) -> Result<Vec<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> Result<U> + Sync + Send,
{
    if !enabled || data.len() < MIN_PARALLEL_ITEMS {
        return data.iter().map(f).collect();
    }

    execute_parallel(|| data.par_iter().map(f).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_pool_config() {
        let config = ThreadPoolConfig::default().with_threads(4).with_stack_size(16 * 1024 * 1024);

        assert_eq!(config.num_threads, Some(4));
        assert_eq!(config.stack_size, Some(16 * 1024 * 1024));
        assert_eq!(config.thread_name_prefix, "pixmesh");
    }

    #[test]
    fn test_build_names_object_workers() {
        let pool = ThreadPoolConfig::default().with_threads(2).build().unwrap();
        assert_eq!(pool.current_num_threads(), 2);
        let name = pool.install(|| std::thread::current().name().map(str::to_string));
        assert!(name.is_some_and(|n| n.starts_with("pixmesh-object-")));
    }

    #[test]
    fn test_init_keeps_first_pool() {
        let first = init_thread_pool(&ThreadPoolConfig::default().with_threads(2)).unwrap();
        let second = init_thread_pool(&ThreadPoolConfig::default().with_threads(3)).unwrap();
        assert_eq!(first, second);
        assert_eq!(current_num_threads(), first);
    }

    #[test]
    fn test_parallel_map_keeps_order() {
        let data: Vec<u32> = (0..100).collect();
        let serial = parallel_map(&data, false, |x| x * 2);
        let parallel = parallel_map(&data, true, |x| x * 2);
        assert_eq!(serial, parallel);
        assert_eq!(parallel[99], 198);
    }

    #[test]
    fn test_try_parallel_map_propagates_errors() {
        let data: Vec<i32> = (0..20).collect();
        let ok = try_parallel_map(&data, true, |x| Ok(x + 1)).unwrap();
        assert_eq!(ok.len(), 20);

        let failed = try_parallel_map(&data, true, |x| {
            if *x == 13 {
                Err(Error::Algorithm("unlucky".to_string()))
            } else {
                Ok(*x)
            }
        });
        assert!(failed.is_err());
    }
}

//! Parallel processing configuration and management
//!
//! This module provides abstractions for configuring Rayon's thread pools,
//! either globally for a process or per engine through [`ParallelConfig::install`].

use crate::errors::{GroupAggError, Result};
use rayon::ThreadPoolBuilder;

/// Configuration for parallel processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    #[must_use]
    pub const fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Set up the global Rayon thread pool with the specified configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the global pool was already initialized.
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    GroupAggError::ThreadPoolError(format!(
                        "Failed to initialize thread pool with {} threads: {}",
                        num_threads, e
                    ))
                })?;

            tracing::info!(threads = num_threads, "configured global thread pool");
        } else {
            tracing::info!("using default thread pool configuration");
        }

        Ok(())
    }

    /// Run `op` on a dedicated pool when a thread count is set, otherwise on
    /// the current (global) pool
    ///
    /// # Errors
    ///
    /// Returns an error if the dedicated pool cannot be built.
    pub fn install<R, F>(&self, op: F) -> Result<R>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match self.num_threads {
            Some(num_threads) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|e| {
                        GroupAggError::ThreadPoolError(format!(
                            "Failed to build pool with {} threads: {}",
                            num_threads, e
                        ))
                    })?;
                Ok(pool.install(op))
            }
            None => Ok(op()),
        }
    }

    /// Get the current number of threads being used
    #[must_use]
    pub fn current_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(rayon::current_num_threads)
    }

    /// Create a configuration that uses all available CPU cores
    #[must_use]
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    /// Create a configuration that uses a specific number of threads
    #[must_use]
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Create a configuration that uses the default thread pool
    #[must_use]
    pub const fn new_default() -> Self {
        Self { num_threads: None }
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self::new_default()
    }
}

/// Get information about the current parallel configuration
#[must_use]
pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

impl ParallelInfo {
    /// Print parallel processing information
    pub fn print_info(&self) {
        println!("📊 Parallel Processing Information:");
        println!("   Current threads: {}", self.current_threads);
        println!("   Available CPU cores: {}", self.available_cores);
        println!("   Available parallelism: {}", self.available_parallelism);
    }
}

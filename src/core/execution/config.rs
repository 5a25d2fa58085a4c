/// Configuration for running batches of independent simulations
///
/// Each replication owns its own engine and RNG, so replications can run on
/// separate threads without sharing state.

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Replications run one after another on the calling thread
    #[default]
    Sequential,
    /// Replications run in parallel on a Rayon thread pool
    Rayon,
}

/// Configuration for a batch of replications
#[derive(Debug, Clone)]
pub struct ReplicationConfig {
    /// Number of independent runs
    pub replications: usize,
    /// Seed of the first run; run `i` uses `base_seed + i`
    pub base_seed: u64,
    /// The concurrency mode to use for execution
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
}

impl ReplicationConfig {
    /// Create a new replication configuration
    ///
    /// Defaults to Sequential mode with no dedicated thread pool
    pub fn new(replications: usize, base_seed: u64) -> Self {
        Self {
            replications,
            base_seed,
            concurrency_mode: ConcurrencyMode::default(),
            thread_pool_size: None,
        }
    }

    /// Set the concurrency mode for the batch
    ///
    /// # Arguments
    /// * `mode` - The concurrency mode to use
    ///
    /// # Returns
    /// A new configuration with the specified concurrency mode
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Arguments
    /// * `size` - The number of threads to use in the thread pool
    ///
    /// # Returns
    /// A new configuration with the specified thread pool size
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    /// Seeds of every replication, in order
    pub fn seeds(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.replications as u64).map(move |i| self.base_seed.wrapping_add(i))
    }
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self::new(1, 42)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReplicationConfig::default();
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Sequential);
        assert_eq!(config.thread_pool_size, None);
        assert_eq!(config.replications, 1);
    }

    #[test]
    fn test_config_builder() {
        let config = ReplicationConfig::new(3, 100)
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(4);

        assert_eq!(config.concurrency_mode, ConcurrencyMode::Rayon);
        assert_eq!(config.thread_pool_size, Some(4));
        assert_eq!(config.seeds().collect::<Vec<_>>(), vec![100, 101, 102]);
    }
}

/// Sizing of the reference scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum number of threads that can be created.
    pub max_threads: usize,
    /// Capacity of the interrupt post-processing queue.
    pub post_queue_len: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_threads: 16,
            post_queue_len: 16,
        }
    }
}

impl SchedulerConfig {
    /// Creates a new scheduler configuration builder.
    pub fn builder() -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::default()
    }
}

/// Builder for [`SchedulerConfig`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    /// Sets the maximum number of threads.
    pub fn max_threads(mut self, max: usize) -> Self {
        self.config.max_threads = max.min(usize::from(u8::MAX) + 1);
        self
    }

    /// Sets the capacity of the post-processing queue.
    pub fn post_queue_len(mut self, len: usize) -> Self {
        self.config.post_queue_len = len;
        self
    }

    pub fn build(self) -> SchedulerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = SchedulerConfig::builder().post_queue_len(2).build();
        assert_eq!(config.post_queue_len, 2);
        assert_eq!(config.max_threads, SchedulerConfig::default().max_threads);
    }

    #[test]
    fn thread_count_fits_ids() {
        let config = SchedulerConfig::builder().max_threads(1000).build();
        assert_eq!(config.max_threads, 256);
    }
}

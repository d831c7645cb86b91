//! Tunable knobs for a data server instance.
//!
//! Grounded on the teacher's `SessionConfig`-style builder pattern (small
//! `Copy` struct, `with_*` setters returning `Self`, a sensible `Default`)
//! rather than a `config`/`figment`-style file-backed loader -- this crate
//! has no filesystem of its own to read a config file from; the host
//! process that embeds it is expected to construct one of these from
//! whatever configuration system it already uses.

/// Server-wide tunables for alignment and recall behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataServerConfig {
    /// Number of stripes a single RW-redundant `LayoutGet` widens across
    /// (`§4.7`). The original's `N_SHARED_STRIPES` default.
    pub shared_stripes: u64,
    /// Maximum number of recall events a single `ReceiveRecalls` call will
    /// deliver, independent of whatever limit the caller passes in.
    pub max_recall_batch: usize,
}

impl DataServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shared_stripes(mut self, shared_stripes: u64) -> Self {
        self.shared_stripes = shared_stripes;
        self
    }

    pub fn with_max_recall_batch(mut self, max_recall_batch: usize) -> Self {
        self.max_recall_batch = max_recall_batch;
        self
    }
}

impl Default for DataServerConfig {
    fn default() -> Self {
        DataServerConfig {
            shared_stripes: 8,
            max_recall_batch: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_original_shared_stripes_constant() {
        assert_eq!(DataServerConfig::default().shared_stripes, 8);
    }

    #[test]
    fn builder_setters_compose() {
        let cfg = DataServerConfig::new()
            .with_shared_stripes(4)
            .with_max_recall_batch(1);
        assert_eq!(cfg.shared_stripes, 4);
        assert_eq!(cfg.max_recall_batch, 1);
    }
}

// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssemblyMode {
    /// whole genome, template pairs available, last-chance retries enabled
    Genome,
    /// fragment / transcript libraries, repeat-frequency levels instead of repeat flags
    Est,
    /// contigs may be trimmed by the caller and handed back for resync
    Mapping,
}

impl AssemblyMode {
    pub fn uses_last_chance(&self) -> bool {
        *self == AssemblyMode::Genome
    }

    pub fn uses_repeat_levels(&self) -> bool {
        *self == AssemblyMode::Est
    }

    pub fn allows_resync(&self) -> bool {
        *self == AssemblyMode::Mapping
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathfinderConfig {
    pub mode: AssemblyMode,
    pub blacklist_release_after: u32,
    pub blacklist_max_entries: usize,
    pub seed_cluster_cap: usize,
    pub seed_cache_max: usize,
    pub max_attempts_per_contig: Option<u64>,
    pub max_time_per_contig: Option<Duration>,
    pub resync_end_distance: u32,
    pub ban_bulk_reset_fraction: f64,
    pub est_repeat_level_ceiling: u8,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        PathfinderConfig {
            mode: AssemblyMode::Genome,
            blacklist_release_after: 8,
            blacklist_max_entries: 256,
            seed_cluster_cap: 4096,
            seed_cache_max: 100000,
            max_attempts_per_contig: None,
            max_time_per_contig: None,
            resync_end_distance: 2000,
            ban_bulk_reset_fraction: 0.125,
            est_repeat_level_ceiling: 1,
        }
    }
}

impl PathfinderConfig {
    pub fn with_mode(mode: AssemblyMode) -> Self {
        PathfinderConfig {
            mode,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blacklist_release_after == 0 {
            return Err(ConfigError::Invalid {
                field: "blacklist_release_after",
                reason: "must be at least one merge".to_string(),
            });
        }
        if self.blacklist_max_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "blacklist_max_entries",
                reason: "must be positive".to_string(),
            });
        }
        if self.seed_cluster_cap == 0 {
            return Err(ConfigError::Invalid {
                field: "seed_cluster_cap",
                reason: "must be positive".to_string(),
            });
        }
        if self.seed_cache_max == 0 {
            return Err(ConfigError::Invalid {
                field: "seed_cache_max",
                reason: "must be positive".to_string(),
            });
        }
        if let Some(0) = self.max_attempts_per_contig {
            return Err(ConfigError::Invalid {
                field: "max_attempts_per_contig",
                reason: "a zero budget would never place a read".to_string(),
            });
        }
        if !(self.ban_bulk_reset_fraction > 0.0 && self.ban_bulk_reset_fraction <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "ban_bulk_reset_fraction",
                reason: format!("{} is not in (0, 1]", self.ban_bulk_reset_fraction),
            });
        }
        Ok(())
    }
}

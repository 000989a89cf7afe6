use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::cache::{AccessResult, MemoryLevel};
use crate::config::HierarchyConfig;
use crate::hierarchy::{ConfigError, Hierarchy, LevelStats};

/// Whether an access reads or writes its block
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessKind {
    Load,
    Store,
}

/// A single access of a trace
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Access {
    pub address: u64,
    pub kind: AccessKind,
}

impl Access {
    pub fn load(address: u64) -> Self {
        Self {
            address,
            kind: AccessKind::Load,
        }
    }

    pub fn store(address: u64) -> Self {
        Self {
            address,
            kind: AccessKind::Store,
        }
    }
}

/// The simulator drives accesses through a hierarchy, and collects one result per access.
///
/// It supports calling simulate multiple times; each call continues from the state the previous
/// one left the caches in, appends to the results, and adds to the time taken to simulate.
/// Starting over means building a new hierarchy
pub struct Simulator {
    hierarchy: Hierarchy,
    results: Vec<AccessResult>,
    simulation_time: Duration,
}

impl Simulator {
    /// Creates a new simulator over an assembled hierarchy
    pub fn new(hierarchy: Hierarchy) -> Self {
        Self {
            hierarchy,
            results: Vec::new(),
            simulation_time: Duration::new(0, 0),
        }
    }

    /// Creates a new simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A hierarchy configuration, usually resulting from parsing JSON
    ///
    /// returns: Result<Simulator, ConfigError>
    pub fn from_config(config: &HierarchyConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Hierarchy::from_config(config)?))
    }

    /// Performs a single access against the top of the hierarchy and records its result
    pub fn access(&mut self, access: Access) -> &AccessResult {
        let result = match access.kind {
            AccessKind::Load => self.hierarchy.load(access.address),
            AccessKind::Store => self.hierarchy.store(access.address),
        };
        self.results.push(result);
        &self.results[self.results.len() - 1]
    }

    /// Simulates a sequence of accesses, in order
    ///
    /// # Arguments
    ///
    /// * `accesses`: The accesses to perform
    ///
    /// returns: the results of this batch, one per access, in the same order
    pub fn simulate<I: IntoIterator<Item = Access>>(&mut self, accesses: I) -> &[AccessResult] {
        let start = Instant::now();
        let first = self.results.len();
        for access in accesses {
            self.access(access);
        }
        self.simulation_time += start.elapsed();
        &self.results[first..]
    }

    /// Every result recorded so far, in access order
    pub fn results(&self) -> &[AccessResult] {
        &self.results
    }

    /// The names of every level, top to bottom, ending with main memory
    pub fn level_names(&self) -> &[String] {
        self.hierarchy.level_names()
    }

    /// The raw counters of every cache level, top to bottom
    pub fn level_stats(&self) -> Vec<LevelStats> {
        self.hierarchy.level_stats()
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of never-filled lines for each cache
    pub fn get_uninitialised_line_counts(&self) -> Vec<u64> {
        self.hierarchy
            .top()
            .iter()
            .filter_map(MemoryLevel::as_cache)
            .map(|cache| cache.get_uninitialised_line_count() as u64)
            .collect()
    }

    /// Consumes the simulator, keeping only the recorded results
    pub fn into_results(self) -> Vec<AccessResult> {
        self.results
    }
}

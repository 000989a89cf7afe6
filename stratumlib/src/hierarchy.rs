use std::collections::HashSet;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{AccessResult, CacheLevel, CacheSpec, MainMemory, MemoryLevel};
use crate::config::{HierarchyConfig, ReplacementPolicyConfig};
use crate::replacement_policies::{GenericPolicy, ReplacementPolicy, DEFAULT_RANDOM_SEED};

/// Reasons a hierarchy can't be assembled. These are all caught before any access is simulated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("a hierarchy needs at least one cache level above main memory")]
    NoCacheLevels,
    #[error("cache level `{level}` has zero sets")]
    ZeroSets { level: String },
    #[error("cache level `{level}` has zero ways")]
    ZeroWays { level: String },
    #[error("cache level `{level}` has a block size of zero")]
    ZeroBlockSize { level: String },
    #[error("cache level `{level}`: {sets} sets of {block_size} byte blocks can't be addressed with 64 bits")]
    GeometryOverflow { level: String, sets: usize, block_size: u64 },
    #[error("memory levels need a non-empty name")]
    EmptyName,
    #[error("the level name `{0}` is used more than once")]
    DuplicateName(String),
}

/// Builds a custom replacement policy for a level with the given number of sets and ways
pub type PolicyFactory = Box<dyn FnOnce(usize, usize) -> Box<dyn ReplacementPolicy + Send>>;

/// The replacement policy requested for a level
pub enum PolicyChoice {
    /// One of the policies shipped with the library. The seed only matters for the random policy
    Provided { policy: ReplacementPolicyConfig, seed: u64 },
    /// Any other policy
    Custom(PolicyFactory),
}

impl PolicyChoice {
    pub fn custom<P, F>(factory: F) -> Self
    where
        P: ReplacementPolicy + Send + 'static,
        F: FnOnce(usize, usize) -> P + 'static,
    {
        Self::Custom(Box::new(move |sets, ways| Box::new(factory(sets, ways))))
    }

    fn instantiate(self, sets: usize, ways: usize) -> GenericPolicy {
        match self {
            PolicyChoice::Provided { policy, seed } => GenericPolicy::from_config(policy, sets, ways, seed),
            PolicyChoice::Custom(factory) => GenericPolicy::Custom(factory(sets, ways)),
        }
    }
}

impl From<ReplacementPolicyConfig> for PolicyChoice {
    fn from(value: ReplacementPolicyConfig) -> Self {
        Self::Provided {
            policy: value,
            seed: DEFAULT_RANDOM_SEED,
        }
    }
}

impl fmt::Debug for PolicyChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyChoice::Provided { policy, seed } => f
                .debug_struct("Provided")
                .field("policy", policy)
                .field("seed", seed)
                .finish(),
            PolicyChoice::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Assembles a hierarchy from the top level down
///
/// Levels are added in access order, the first cache added is the one the simulator talks to.
/// Nothing is validated until [`HierarchyBuilder::build`], which either returns a complete chain
/// ending in main memory or the first configuration error found
///
/// # Examples
///
/// ```
/// use stratumlib::cache::CacheSpec;
/// use stratumlib::config::ReplacementPolicyConfig;
/// use stratumlib::hierarchy::HierarchyBuilder;
///
/// let mut hierarchy = HierarchyBuilder::new()
///     .cache(CacheSpec::new("L1", 1, 1, 4, 1), ReplacementPolicyConfig::LeastRecentlyUsed)
///     .main_memory("MainMemory", 100)
///     .build()
///     .unwrap();
/// assert_eq!(hierarchy.load(0).total_cycles, 101);
/// assert_eq!(&*hierarchy.load(0).hit_level, "L1");
/// ```
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    caches: Vec<(CacheSpec, PolicyChoice)>,
    main_memory: MainMemory,
}

impl HierarchyBuilder {
    /// Creates a builder with no caches, and main memory at its defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder holding every level of a parsed configuration
    pub fn from_config(config: &HierarchyConfig) -> Self {
        let builder = config.caches.iter().fold(Self::new(), |builder, cache| {
            builder.cache(
                CacheSpec::new(cache.name.clone(), cache.sets, cache.ways, cache.block_size, cache.hit_latency),
                PolicyChoice::Provided {
                    policy: cache.replacement_policy,
                    seed: cache.seed,
                },
            )
        });
        builder.main_memory(config.main_memory.name.clone(), config.main_memory.latency)
    }

    /// Adds a cache level below the ones already added
    pub fn cache(mut self, spec: CacheSpec, policy: impl Into<PolicyChoice>) -> Self {
        self.caches.push((spec, policy.into()));
        self
    }

    /// Sets the terminal level
    pub fn main_memory(mut self, name: impl Into<String>, latency: u64) -> Self {
        self.main_memory = MainMemory::new(name.into(), latency);
        self
    }

    /// Validates the configuration and builds the chain, from main memory upwards
    pub fn build(self) -> Result<Hierarchy, ConfigError> {
        if self.caches.is_empty() {
            return Err(ConfigError::NoCacheLevels);
        }
        let mut next = MemoryLevel::from(self.main_memory);
        for (spec, policy) in self.caches.into_iter().rev() {
            next = CacheLevel::new(spec, |sets, ways| policy.instantiate(sets, ways), next)?.into();
        }
        Hierarchy::from_top(next)
    }
}

/// The counters of one cache level, as exposed to reporting
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct LevelStats {
    pub name: String,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// An assembled chain of levels, entered through its top cache
///
/// The hierarchy owns the top level, which owns the rest, so dropping it tears down every level
pub struct Hierarchy {
    top: MemoryLevel,
    level_names: Vec<String>,
}

impl Hierarchy {
    /// Wraps a hand-assembled chain, checking it has at least one cache and that every level
    /// has a unique, non-empty name
    pub fn from_top(top: MemoryLevel) -> Result<Self, ConfigError> {
        if top.as_cache().is_none() {
            return Err(ConfigError::NoCacheLevels);
        }
        let mut seen = HashSet::new();
        for level in top.iter() {
            if level.name().is_empty() {
                return Err(ConfigError::EmptyName);
            }
            if !seen.insert(level.name()) {
                return Err(ConfigError::DuplicateName(level.name().to_string()));
            }
        }
        let level_names: Vec<String> = top.iter().map(|level| level.name().to_string()).collect();
        debug!("Assembled hierarchy: {}", level_names.join(" -> "));
        Ok(Self { top, level_names })
    }

    /// Builds a hierarchy straight from a parsed configuration
    pub fn from_config(config: &HierarchyConfig) -> Result<Self, ConfigError> {
        HierarchyBuilder::from_config(config).build()
    }

    pub fn load(&mut self, address: u64) -> AccessResult {
        self.top.load(address)
    }

    pub fn store(&mut self, address: u64) -> AccessResult {
        self.top.store(address)
    }

    /// The names of every level, from the top cache down to main memory
    pub fn level_names(&self) -> &[String] {
        &self.level_names
    }

    /// The counters of every cache level, from the top down
    pub fn level_stats(&self) -> Vec<LevelStats> {
        self.top
            .iter()
            .filter_map(MemoryLevel::as_cache)
            .map(|cache| {
                let stats = cache.stats();
                LevelStats {
                    name: cache.name().to_string(),
                    hits: stats.hits,
                    misses: stats.misses,
                    evictions: stats.evictions,
                }
            })
            .collect()
    }

    /// Finds a level by name
    pub fn level(&self, name: &str) -> Option<&MemoryLevel> {
        self.top.iter().find(|level| level.name() == name)
    }

    pub fn top(&self) -> &MemoryLevel {
        &self.top
    }
}

use serde::Deserialize;

use crate::replacement_policies::DEFAULT_RANDOM_SEED;

/// A hierarchy configuration: the caches from the top of the hierarchy down, then main memory
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyConfig {
    pub caches: Vec<CacheConfig>,
    #[serde(default)]
    pub main_memory: MainMemoryConfig,
}

/// A configuration for a single cache level
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub name: String,
    pub sets: usize,
    pub ways: usize,
    #[serde(alias = "line_size")]
    pub block_size: u64,
    #[serde(default = "default_hit_latency")]
    pub hit_latency: u64,
    #[serde(default = "ReplacementPolicyConfig::default")]
    pub replacement_policy: ReplacementPolicyConfig,
    /// Only used by the random policy
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// The terminal level. Defaults to a level named `MainMemory` with a latency of 100 cycles
#[derive(Debug, Clone, Deserialize)]
pub struct MainMemoryConfig {
    #[serde(default = "default_main_memory_name")]
    pub name: String,
    #[serde(default = "default_main_memory_latency")]
    pub latency: u64,
}

impl Default for MainMemoryConfig {
    fn default() -> Self {
        Self {
            name: default_main_memory_name(),
            latency: default_main_memory_latency(),
        }
    }
}

/// The replacement policy - lru, round robin, lfu, or random. Defaults to lru.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
pub enum ReplacementPolicyConfig {
    #[serde(alias = "rr", alias = "fifo")]
    RoundRobin,
    #[default]
    #[serde(alias = "lru")]
    LeastRecentlyUsed,
    #[serde(alias = "lfu")]
    LeastFrequentlyUsed,
    #[serde(alias = "random")]
    Random,
}

pub const DEFAULT_MAIN_MEMORY_NAME: &str = "MainMemory";
pub const DEFAULT_MAIN_MEMORY_LATENCY: u64 = 100;
pub const DEFAULT_HIT_LATENCY: u64 = 1;

fn default_hit_latency() -> u64 {
    DEFAULT_HIT_LATENCY
}

fn default_seed() -> u64 {
    DEFAULT_RANDOM_SEED
}

fn default_main_memory_name() -> String {
    DEFAULT_MAIN_MEMORY_NAME.to_string()
}

fn default_main_memory_latency() -> u64 {
    DEFAULT_MAIN_MEMORY_LATENCY
}

use std::fmt;

use crate::config::ReplacementPolicyConfig;

/// A generic trait for implementing new replacement policies. Can be used to parameterise a
/// CacheLevel.
///
/// Policies only ever see set and way indices; they never look at tags or line contents. The
/// cache guarantees `set < sets` and `way < ways` for the dimensions the policy was built with.
pub trait ReplacementPolicy {
    /// Updates the policy when a lookup hits a line
    ///
    /// Not applicable for some policies, a default which does nothing is provided
    ///
    /// # Arguments
    ///
    /// * `set`: The set containing the line
    /// * `way`: The way of the line within the set
    ///
    /// returns: ()
    fn on_hit(&mut self, _set: usize, _way: usize) {}

    /// Updates the policy when a new block has been installed in a line
    ///
    /// # Arguments
    ///
    /// * `set`: The set containing the line
    /// * `way`: The way the block was installed in
    ///
    /// returns: ()
    fn on_fill(&mut self, set: usize, way: usize);

    /// Used by the cache to choose which way of a full set to replace.
    ///
    /// Only called when every way of the set holds a valid line, so any way returned is a valid
    /// victim. Implementations must return a way index below the associativity they were built
    /// with
    ///
    /// # Arguments
    ///
    /// * `set`: The set which needs a line
    ///
    /// returns: usize
    fn get_victim(&mut self, set: usize) -> usize;
}

/// Standard round robin replacement policy, which keeps separate indices for each set
///
/// Lines are only ever filled into invalid ways in ascending order before a set is full, so
/// advancing the index whenever the way it points at is filled gives first in, first out order
#[derive(Debug)]
pub struct RoundRobin {
    set_indices: Vec<usize>,
    ways: usize,
}

impl RoundRobin {
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            set_indices: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for RoundRobin {
    fn on_fill(&mut self, set: usize, way: usize) {
        let set_index = &mut self.set_indices[set];
        if *set_index == way {
            *set_index = (*set_index + 1) % self.ways;
        }
    }

    fn get_victim(&mut self, set: usize) -> usize {
        self.set_indices[set]
    }
}

/// Least Recently Used replacement policy
///
/// This implementation keeps track of when each line was last used, against a logical clock kept
/// per set. The recency order of a set therefore depends only on accesses to that set. Ways that
/// were never touched keep the timestamp 0 and are the oldest; ties go to the lowest way
#[derive(Debug)]
pub struct LeastRecentlyUsed {
    last_used_times: Vec<u64>,
    // Starts at 1 so a touched way is always newer than an untouched one
    set_clocks: Vec<u64>,
    ways: usize,
}

impl LeastRecentlyUsed {
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            last_used_times: vec![0; sets * ways],
            set_clocks: vec![1; sets],
            ways,
        }
    }

    fn touch(&mut self, set: usize, way: usize) {
        let clock = &mut self.set_clocks[set];
        self.last_used_times[set * self.ways + way] = *clock;
        *clock += 1;
    }
}

impl ReplacementPolicy for LeastRecentlyUsed {
    fn on_hit(&mut self, set: usize, way: usize) {
        self.touch(set, way);
    }

    fn on_fill(&mut self, set: usize, way: usize) {
        self.touch(set, way);
    }

    fn get_victim(&mut self, set: usize) -> usize {
        let lower = set * self.ways;
        let mut min_value = u64::MAX;
        let mut min_way = 0;
        let mut way = 0;
        while way < self.ways {
            if self.last_used_times[lower + way] < min_value {
                min_value = self.last_used_times[lower + way];
                min_way = way;
            }
            way += 1;
        }
        min_way
    }
}

/// Least frequently used replacement policy
///
/// A freshly filled line counts as one use. Ties go to the lowest way
#[derive(Debug)]
pub struct LeastFrequentlyUsed {
    usages: Vec<u64>,
    ways: usize,
}

impl LeastFrequentlyUsed {
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usages: vec![0; sets * ways],
            ways,
        }
    }
}

impl ReplacementPolicy for LeastFrequentlyUsed {
    fn on_hit(&mut self, set: usize, way: usize) {
        self.usages[set * self.ways + way] += 1;
    }

    fn on_fill(&mut self, set: usize, way: usize) {
        self.usages[set * self.ways + way] = 1;
    }

    fn get_victim(&mut self, set: usize) -> usize {
        let lower = set * self.ways;
        let mut min_value = u64::MAX;
        let mut min_way = 0;
        let mut way = 0;
        while way < self.ways {
            if self.usages[lower + way] < min_value {
                min_value = self.usages[lower + way];
                min_way = way;
            }
            way += 1;
        }
        min_way
    }
}

/// Seed used by [`Random`] when none is configured
pub const DEFAULT_RANDOM_SEED: u64 = 0x2545_F491_4F6C_DD1D;

/// Random replacement policy
///
/// Victims come from a xorshift generator, so runs with the same seed evict the same ways
#[derive(Debug)]
pub struct Random {
    state: u64,
    ways: usize,
}

impl Random {
    pub fn new(_sets: usize, ways: usize) -> Self {
        Self::with_seed(ways, DEFAULT_RANDOM_SEED)
    }

    pub fn with_seed(ways: usize, seed: u64) -> Self {
        // Xorshift never leaves the all-zero state
        let state = if seed == 0 { DEFAULT_RANDOM_SEED } else { seed };
        Self { state, ways }
    }
}

impl ReplacementPolicy for Random {
    fn on_fill(&mut self, _set: usize, _way: usize) {}

    fn get_victim(&mut self, _set: usize) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x % self.ways as u64) as usize
    }
}

/// Enum for the replacement policies a hierarchy can be built with
///
/// As with the levels themselves, we branch explicitly on the provided policies rather than going
/// through a trait object, so the compiler can inline them on the hot path. Policies defined
/// outside the crate are still supported through the boxed `Custom` variant, which only pays for
/// dynamic dispatch when it is actually used
pub enum GenericPolicy {
    RoundRobin(RoundRobin),
    LeastRecentlyUsed(LeastRecentlyUsed),
    LeastFrequentlyUsed(LeastFrequentlyUsed),
    Random(Random),
    Custom(Box<dyn ReplacementPolicy + Send>),
}

impl GenericPolicy {
    /// Creates one of the provided policies for a cache of the given dimensions
    pub fn from_config(config: ReplacementPolicyConfig, sets: usize, ways: usize, seed: u64) -> Self {
        match config {
            ReplacementPolicyConfig::RoundRobin => RoundRobin::new(sets, ways).into(),
            ReplacementPolicyConfig::LeastRecentlyUsed => LeastRecentlyUsed::new(sets, ways).into(),
            ReplacementPolicyConfig::LeastFrequentlyUsed => LeastFrequentlyUsed::new(sets, ways).into(),
            ReplacementPolicyConfig::Random => Random::with_seed(ways, seed).into(),
        }
    }
}

impl fmt::Debug for GenericPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericPolicy::RoundRobin(p) => fmt::Debug::fmt(p, f),
            GenericPolicy::LeastRecentlyUsed(p) => fmt::Debug::fmt(p, f),
            GenericPolicy::LeastFrequentlyUsed(p) => fmt::Debug::fmt(p, f),
            GenericPolicy::Random(p) => fmt::Debug::fmt(p, f),
            GenericPolicy::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl From<RoundRobin> for GenericPolicy {
    fn from(value: RoundRobin) -> Self {
        Self::RoundRobin(value)
    }
}

impl From<LeastRecentlyUsed> for GenericPolicy {
    fn from(value: LeastRecentlyUsed) -> Self {
        Self::LeastRecentlyUsed(value)
    }
}

impl From<LeastFrequentlyUsed> for GenericPolicy {
    fn from(value: LeastFrequentlyUsed) -> Self {
        Self::LeastFrequentlyUsed(value)
    }
}

impl From<Random> for GenericPolicy {
    fn from(value: Random) -> Self {
        Self::Random(value)
    }
}

impl From<Box<dyn ReplacementPolicy + Send>> for GenericPolicy {
    fn from(value: Box<dyn ReplacementPolicy + Send>) -> Self {
        Self::Custom(value)
    }
}

impl ReplacementPolicy for GenericPolicy {
    fn on_hit(&mut self, set: usize, way: usize) {
        match self {
            GenericPolicy::RoundRobin(p) => p.on_hit(set, way),
            GenericPolicy::LeastRecentlyUsed(p) => p.on_hit(set, way),
            GenericPolicy::LeastFrequentlyUsed(p) => p.on_hit(set, way),
            GenericPolicy::Random(p) => p.on_hit(set, way),
            GenericPolicy::Custom(p) => p.on_hit(set, way),
        }
    }

    fn on_fill(&mut self, set: usize, way: usize) {
        match self {
            GenericPolicy::RoundRobin(p) => p.on_fill(set, way),
            GenericPolicy::LeastRecentlyUsed(p) => p.on_fill(set, way),
            GenericPolicy::LeastFrequentlyUsed(p) => p.on_fill(set, way),
            GenericPolicy::Random(p) => p.on_fill(set, way),
            GenericPolicy::Custom(p) => p.on_fill(set, way),
        }
    }

    fn get_victim(&mut self, set: usize) -> usize {
        match self {
            GenericPolicy::RoundRobin(p) => p.get_victim(set),
            GenericPolicy::LeastRecentlyUsed(p) => p.get_victim(set),
            GenericPolicy::LeastFrequentlyUsed(p) => p.get_victim(set),
            GenericPolicy::Random(p) => p.get_victim(set),
            GenericPolicy::Custom(p) => p.get_victim(set),
        }
    }
}

use std::iter;
use std::sync::Arc;

use log::trace;

use crate::config::{DEFAULT_MAIN_MEMORY_LATENCY, DEFAULT_MAIN_MEMORY_NAME};
use crate::hierarchy::ConfigError;
use crate::replacement_policies::{GenericPolicy, ReplacementPolicy};

/// The outcome of a single access: the level which held the block, and the cycles spent in every
/// level the access passed through on the way there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessResult {
    pub hit_level: Arc<str>,
    pub total_cycles: u64,
}

impl AccessResult {
    pub fn new(hit_level: impl Into<Arc<str>>, total_cycles: u64) -> Self {
        Self {
            hit_level: hit_level.into(),
            total_cycles,
        }
    }
}

/// A single cache line. A dirty line is always valid
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub valid: bool,
    pub dirty: bool,
    pub tag: u64,
}

/// Raw counters kept by a cache level
///
/// `evictions` only counts replaced lines which were dirty, i.e. the write-backs issued to the
/// next level. Clean lines are overwritten silently
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// The parameters of a single cache level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSpec {
    pub name: String,
    pub sets: usize,
    pub ways: usize,
    pub block_size: u64,
    pub hit_latency: u64,
}

impl CacheSpec {
    pub fn new(name: impl Into<String>, sets: usize, ways: usize, block_size: u64, hit_latency: u64) -> Self {
        Self {
            name: name.into(),
            sets,
            ways,
            block_size,
            hit_latency,
        }
    }
}

/// The address decomposition of a cache level
///
/// Splitting an address into a set and tag, and rebuilding the block address of an evicted line,
/// are kept together here so the two always agree
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheGeometry {
    sets: u64,
    ways: usize,
    block_size: u64,
    // block_size * sets, checked for overflow on construction
    tag_divisor: u64,
}

impl CacheGeometry {
    /// Validates the dimensions of a level
    ///
    /// # Arguments
    ///
    /// * `level`: The level name, used for error reporting
    /// * `sets`: The number of sets
    /// * `ways`: The associativity
    /// * `block_size`: The size of a block in bytes
    ///
    /// returns: Result<CacheGeometry, ConfigError>
    pub fn new(level: &str, sets: usize, ways: usize, block_size: u64) -> Result<Self, ConfigError> {
        if sets == 0 {
            return Err(ConfigError::ZeroSets { level: level.to_string() });
        }
        if ways == 0 {
            return Err(ConfigError::ZeroWays { level: level.to_string() });
        }
        if block_size == 0 {
            return Err(ConfigError::ZeroBlockSize { level: level.to_string() });
        }
        let overflow = || ConfigError::GeometryOverflow {
            level: level.to_string(),
            sets,
            block_size,
        };
        // The line storage is sets * ways entries
        sets.checked_mul(ways).ok_or_else(overflow)?;
        let sets = u64::try_from(sets).map_err(|_| overflow())?;
        let tag_divisor = block_size.checked_mul(sets).ok_or_else(overflow)?;
        Ok(Self {
            sets,
            ways,
            block_size,
            tag_divisor,
        })
    }

    /// Converts an address into a set index and a tag
    pub fn address_to_set_and_tag(&self, address: u64) -> (usize, u64) {
        // The set is below `sets`, which came from a usize
        (((address / self.block_size) % self.sets) as usize, address / self.tag_divisor)
    }

    /// Rebuilds the address of the first byte of the block held with `tag` in `set`
    pub fn set_and_tag_to_address(&self, set: usize, tag: u64) -> u64 {
        (tag * self.sets + set as u64) * self.block_size
    }

    pub fn sets(&self) -> usize {
        self.sets as usize
    }

    pub fn ways(&self) -> usize {
        self.ways
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }
}

/// A set-associative, write-back, write-allocate cache level, parameterised by a replacement
/// policy
///
/// Each level exclusively owns the level below it, so a hierarchy is a single chain which is
/// dropped as a unit. Misses recurse into the next level, and the latency of this level is added
/// to whatever the lower level reports on the way back up.
///
/// Lines live in one flat vector, `sets * ways` long, with the ways of a set next to each other
pub struct CacheLevel<R: ReplacementPolicy = GenericPolicy> {
    name: Arc<str>,
    geometry: CacheGeometry,
    hit_latency: u64,
    lines: Vec<Line>,
    replacement_policy: R,
    stats: CacheStats,
    next: Box<MemoryLevel>,
}

impl<R: ReplacementPolicy> CacheLevel<R> {
    /// Creates a new cache level on top of `next`
    ///
    /// # Arguments
    ///
    /// * `spec`: The name, dimensions and hit latency of the level
    /// * `policy`: Builds the replacement policy for the given number of sets and ways
    /// * `next`: The level this one misses into
    ///
    /// returns: Result<CacheLevel<R>, ConfigError>
    pub fn new(spec: CacheSpec, policy: impl FnOnce(usize, usize) -> R, next: MemoryLevel) -> Result<Self, ConfigError> {
        if spec.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        let geometry = CacheGeometry::new(&spec.name, spec.sets, spec.ways, spec.block_size)?;
        Ok(Self {
            name: spec.name.into(),
            geometry,
            hit_latency: spec.hit_latency,
            lines: vec![Line::default(); spec.sets * spec.ways],
            replacement_policy: policy(spec.sets, spec.ways),
            stats: CacheStats::default(),
            next: Box::new(next),
        })
    }

    /// Reads the block containing `address`
    ///
    /// On a miss the block is loaded from the next level and installed here, possibly writing
    /// back a dirty victim first
    pub fn load(&mut self, address: u64) -> AccessResult {
        let (set, tag) = self.geometry.address_to_set_and_tag(address);
        if let Some(way) = self.find_way(set, tag) {
            self.stats.hits += 1;
            self.replacement_policy.on_hit(set, way);
            return AccessResult::new(self.name.clone(), self.hit_latency);
        }
        self.stats.misses += 1;
        trace!("{}: load miss at {address:#x} (set {set}, tag {tag:#x})", self.name);
        let mut result = self.next.load(address);
        result.total_cycles += self.hit_latency;
        self.fill(set, tag);
        result
    }

    /// Writes to the block containing `address`
    ///
    /// A write miss loads the whole block from the next level (not a store), installs it, and
    /// then marks it dirty. Nothing reaches the next level until the line is evicted
    pub fn store(&mut self, address: u64) -> AccessResult {
        let (set, tag) = self.geometry.address_to_set_and_tag(address);
        if let Some(way) = self.find_way(set, tag) {
            self.stats.hits += 1;
            let index = self.line_index(set, way);
            self.lines[index].dirty = true;
            self.replacement_policy.on_hit(set, way);
            return AccessResult::new(self.name.clone(), self.hit_latency);
        }
        self.stats.misses += 1;
        trace!("{}: store miss at {address:#x} (set {set}, tag {tag:#x})", self.name);
        let mut result = self.next.load(address);
        result.total_cycles += self.hit_latency;
        let way = self.fill(set, tag);
        let index = self.line_index(set, way);
        self.lines[index].dirty = true;
        result
    }

    /// Looks up the line holding `address` without touching counters or the replacement policy
    pub fn probe(&self, address: u64) -> Option<Line> {
        let (set, tag) = self.geometry.address_to_set_and_tag(address);
        self.find_way(set, tag).map(|way| self.lines[self.line_index(set, way)])
    }

    // Ways are scanned in ascending order, tags are unique per set so the first match is the only
    // match
    fn find_way(&self, set: usize, tag: u64) -> Option<usize> {
        let lower = set * self.geometry.ways;
        self.lines[lower..lower + self.geometry.ways]
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Installs `tag` in `set`, returning the way it was placed in
    fn fill(&mut self, set: usize, tag: u64) -> usize {
        let lower = set * self.geometry.ways;
        let free_way = self.lines[lower..lower + self.geometry.ways]
            .iter()
            .position(|line| !line.valid);
        let way = match free_way {
            Some(way) => way,
            None => {
                let way = self.replacement_policy.get_victim(set);
                let victim = self.lines[lower + way];
                if victim.valid && victim.dirty {
                    let victim_address = self.geometry.set_and_tag_to_address(set, victim.tag);
                    trace!("{}: writing back {victim_address:#x} from set {set}, way {way}", self.name);
                    self.next.store(victim_address);
                    self.stats.evictions += 1;
                }
                way
            }
        };
        self.lines[lower + way] = Line {
            valid: true,
            dirty: false,
            tag,
        };
        self.replacement_policy.on_fill(set, way);
        way
    }

    fn line_index(&self, set: usize, way: usize) -> usize {
        set * self.geometry.ways + way
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hit_latency(&self) -> u64 {
        self.hit_latency
    }

    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// The level this cache misses into
    pub fn next(&self) -> &MemoryLevel {
        &self.next
    }

    /// The lines of a set, indexed by way
    pub fn set_lines(&self, set: usize) -> &[Line] {
        let lower = set * self.geometry.ways;
        &self.lines[lower..lower + self.geometry.ways]
    }

    /// Gets the number of lines which have never been filled. Useful for analysing cache
    /// performance or debugging
    pub fn get_uninitialised_line_count(&self) -> usize {
        self.lines.iter().filter(|line| !line.valid).count()
    }
}

/// The terminal level of a hierarchy. Every access hits, and nothing is ever recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainMemory {
    name: Arc<str>,
    latency: u64,
}

impl MainMemory {
    pub fn new(name: impl Into<Arc<str>>, latency: u64) -> Self {
        Self {
            name: name.into(),
            latency,
        }
    }

    pub fn load(&self, _address: u64) -> AccessResult {
        AccessResult::new(self.name.clone(), self.latency)
    }

    pub fn store(&self, _address: u64) -> AccessResult {
        AccessResult::new(self.name.clone(), self.latency)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latency(&self) -> u64 {
        self.latency
    }
}

impl Default for MainMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MAIN_MEMORY_NAME, DEFAULT_MAIN_MEMORY_LATENCY)
    }
}

/// A node in a hierarchy: either a cache which owns the rest of the chain, or main memory
///
/// As with the replacement policies, branching explicitly on the two variants lets the compiler
/// see the concrete types at every level, rather than dereferencing a trait object per access
pub enum MemoryLevel {
    Cache(Box<CacheLevel>),
    Main(MainMemory),
}

impl From<CacheLevel> for MemoryLevel {
    fn from(value: CacheLevel) -> Self {
        Self::Cache(Box::new(value))
    }
}

impl From<MainMemory> for MemoryLevel {
    fn from(value: MainMemory) -> Self {
        Self::Main(value)
    }
}

impl MemoryLevel {
    pub fn load(&mut self, address: u64) -> AccessResult {
        match self {
            MemoryLevel::Cache(c) => c.load(address),
            MemoryLevel::Main(m) => m.load(address),
        }
    }

    pub fn store(&mut self, address: u64) -> AccessResult {
        match self {
            MemoryLevel::Cache(c) => c.store(address),
            MemoryLevel::Main(m) => m.store(address),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MemoryLevel::Cache(c) => c.name(),
            MemoryLevel::Main(m) => m.name(),
        }
    }

    /// The level below this one, `None` for main memory
    pub fn next(&self) -> Option<&MemoryLevel> {
        match self {
            MemoryLevel::Cache(c) => Some(c.next()),
            MemoryLevel::Main(_) => None,
        }
    }

    pub fn as_cache(&self) -> Option<&CacheLevel> {
        match self {
            MemoryLevel::Cache(c) => Some(&**c),
            MemoryLevel::Main(_) => None,
        }
    }

    /// Walks the chain from this level down to main memory
    pub fn iter(&self) -> impl Iterator<Item = &MemoryLevel> {
        iter::successors(Some(self), |level| level.next())
    }
}

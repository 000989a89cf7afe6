use crate::cache::{CacheLevel, CacheSpec, MainMemory, MemoryLevel};
use crate::config::ReplacementPolicyConfig;
use crate::hierarchy::{ConfigError, Hierarchy, HierarchyBuilder};
use crate::replacement_policies::{GenericPolicy, LeastRecentlyUsed};

fn single(spec: CacheSpec) -> Result<Hierarchy, ConfigError> {
    HierarchyBuilder::new()
        .cache(spec, ReplacementPolicyConfig::LeastRecentlyUsed)
        .build()
}

#[test]
fn rejects_degenerate_geometry() {
    assert_eq!(
        single(CacheSpec::new("L1", 0, 2, 64, 1)).err(),
        Some(ConfigError::ZeroSets { level: "L1".to_string() })
    );
    assert_eq!(
        single(CacheSpec::new("L1", 4, 0, 64, 1)).err(),
        Some(ConfigError::ZeroWays { level: "L1".to_string() })
    );
    assert_eq!(
        single(CacheSpec::new("L1", 4, 2, 0, 1)).err(),
        Some(ConfigError::ZeroBlockSize { level: "L1".to_string() })
    );
    assert_eq!(
        single(CacheSpec::new("L1", 4, 2, u64::MAX / 2, 1)).err(),
        Some(ConfigError::GeometryOverflow {
            level: "L1".to_string(),
            sets: 4,
            block_size: u64::MAX / 2
        })
    );
}

#[test]
fn rejects_errors_in_lower_levels() {
    let result = HierarchyBuilder::new()
        .cache(CacheSpec::new("L1", 4, 2, 64, 1), ReplacementPolicyConfig::LeastRecentlyUsed)
        .cache(CacheSpec::new("L2", 16, 0, 64, 1), ReplacementPolicyConfig::LeastRecentlyUsed)
        .build();
    assert_eq!(result.err(), Some(ConfigError::ZeroWays { level: "L2".to_string() }));
}

#[test]
fn needs_a_cache() {
    assert_eq!(HierarchyBuilder::new().build().err(), Some(ConfigError::NoCacheLevels));
    let memory_only = Hierarchy::from_top(MainMemory::default().into());
    assert_eq!(memory_only.err(), Some(ConfigError::NoCacheLevels));
}

#[test]
fn names_must_be_unique_and_present() {
    let duplicate = HierarchyBuilder::new()
        .cache(CacheSpec::new("L1", 4, 2, 64, 1), ReplacementPolicyConfig::LeastRecentlyUsed)
        .cache(CacheSpec::new("L1", 16, 4, 64, 1), ReplacementPolicyConfig::LeastRecentlyUsed)
        .build();
    assert_eq!(duplicate.err(), Some(ConfigError::DuplicateName("L1".to_string())));
    let shadows_memory = HierarchyBuilder::new()
        .cache(CacheSpec::new("Mem", 4, 2, 64, 1), ReplacementPolicyConfig::LeastRecentlyUsed)
        .main_memory("Mem", 50)
        .build();
    assert_eq!(shadows_memory.err(), Some(ConfigError::DuplicateName("Mem".to_string())));
    assert_eq!(single(CacheSpec::new("", 4, 2, 64, 1)).err(), Some(ConfigError::EmptyName));
    let unnamed_memory = HierarchyBuilder::new()
        .cache(CacheSpec::new("L1", 4, 2, 64, 1), ReplacementPolicyConfig::LeastRecentlyUsed)
        .main_memory("", 50)
        .build();
    assert_eq!(unnamed_memory.err(), Some(ConfigError::EmptyName));
}

#[test]
fn hand_assembled_chains_are_accepted() -> Result<(), ConfigError> {
    let l2 = CacheLevel::new(
        CacheSpec::new("L2", 8, 2, 32, 6),
        |sets, ways| GenericPolicy::from(LeastRecentlyUsed::new(sets, ways)),
        MainMemory::new("Memory", 80).into(),
    )?;
    let l1 = CacheLevel::new(
        CacheSpec::new("L1", 2, 2, 32, 2),
        |sets, ways| GenericPolicy::from(LeastRecentlyUsed::new(sets, ways)),
        MemoryLevel::from(l2),
    )?;
    let mut hierarchy = Hierarchy::from_top(l1.into())?;
    assert_eq!(hierarchy.level_names(), ["L1", "L2", "Memory"]);
    assert_eq!(hierarchy.load(0x20).total_cycles, 88);
    assert_eq!(hierarchy.level("Memory").map(MemoryLevel::name), Some("Memory"));
    assert!(hierarchy.level("L3").is_none());
    Ok(())
}

#[test]
fn level_stats_cover_caches_only() -> Result<(), ConfigError> {
    let mut hierarchy = HierarchyBuilder::new()
        .cache(CacheSpec::new("L1", 4, 2, 64, 1), ReplacementPolicyConfig::LeastRecentlyUsed)
        .cache(CacheSpec::new("L2", 16, 4, 64, 5), ReplacementPolicyConfig::RoundRobin)
        .build()?;
    hierarchy.load(0);
    hierarchy.store(0);
    let names: Vec<String> = hierarchy.level_stats().into_iter().map(|stats| stats.name).collect();
    assert_eq!(names, vec!["L1", "L2"]);
    assert_eq!(hierarchy.level_names().len(), 3);
    Ok(())
}

use crate::replacement_policies::{LeastFrequentlyUsed, LeastRecentlyUsed, Random, ReplacementPolicy, RoundRobin};

#[test]
fn lru_untouched_ways_go_first() {
    let mut policy = LeastRecentlyUsed::new(1, 4);
    assert_eq!(policy.get_victim(0), 0);
    policy.on_fill(0, 0);
    policy.on_fill(0, 1);
    assert_eq!(policy.get_victim(0), 2);
}

#[test]
fn lru_follows_hits() {
    let mut policy = LeastRecentlyUsed::new(1, 4);
    for way in 0..4 {
        policy.on_fill(0, way);
    }
    assert_eq!(policy.get_victim(0), 0);
    policy.on_hit(0, 0);
    assert_eq!(policy.get_victim(0), 1);
    policy.on_hit(0, 1);
    policy.on_hit(0, 2);
    assert_eq!(policy.get_victim(0), 3);
    // Choosing a victim is not a use
    assert_eq!(policy.get_victim(0), 3);
}

#[test]
fn lru_sets_are_independent() {
    let mut policy = LeastRecentlyUsed::new(2, 2);
    policy.on_fill(0, 0);
    policy.on_fill(0, 1);
    policy.on_fill(1, 1);
    policy.on_fill(1, 0);
    for _ in 0..10 {
        policy.on_hit(1, 0);
    }
    assert_eq!(policy.get_victim(0), 0);
    assert_eq!(policy.get_victim(1), 1);
}

#[test]
fn round_robin_replaces_in_fill_order() {
    let mut policy = RoundRobin::new(2, 3);
    for way in 0..3 {
        policy.on_fill(1, way);
    }
    // Hits don't matter
    policy.on_hit(1, 0);
    let mut victims = Vec::new();
    for _ in 0..4 {
        let way = policy.get_victim(1);
        victims.push(way);
        policy.on_fill(1, way);
    }
    assert_eq!(victims, vec![0, 1, 2, 0]);
    assert_eq!(policy.get_victim(0), 0);
}

#[test]
fn lfu_keeps_the_most_used_lines() {
    let mut policy = LeastFrequentlyUsed::new(1, 3);
    for way in 0..3 {
        policy.on_fill(0, way);
    }
    policy.on_hit(0, 0);
    policy.on_hit(0, 0);
    policy.on_hit(0, 2);
    assert_eq!(policy.get_victim(0), 1);
    // A refilled line starts over
    policy.on_fill(0, 0);
    policy.on_hit(0, 1);
    assert_eq!(policy.get_victim(0), 0);
}

#[test]
fn random_is_reproducible_and_in_range() {
    let mut first = Random::with_seed(8, 99);
    let mut second = Random::with_seed(8, 99);
    let victims: Vec<usize> = (0..64).map(|_| first.get_victim(0)).collect();
    assert!(victims.iter().all(|way| *way < 8));
    assert_eq!(victims, (0..64).map(|_| second.get_victim(3)).collect::<Vec<_>>());
    // Not stuck on a single way
    assert!(victims.iter().any(|way| *way != victims[0]));
}

#[test]
fn random_zero_seed_still_moves() {
    let mut policy = Random::with_seed(4, 0);
    let victims: Vec<usize> = (0..32).map(|_| policy.get_victim(0)).collect();
    assert!(victims.iter().any(|way| *way != victims[0]));
}

use crate::simulator::{Access, AccessKind};

/// Addresses of `count` distinct blocks which all map to `set` of a cache with the given number
/// of sets and block size
///
/// The i-th address is the first byte of the block with tag i
pub fn same_set_addresses(sets: usize, block_size: u64, set: usize, count: usize) -> Vec<u64> {
    (0..count as u64)
        .map(|tag| (tag * sets as u64 + set as u64) * block_size)
        .collect()
}

/// A linear sweep of loads, `stride` bytes apart
pub fn sequential_loads(start: u64, stride: u64, count: usize) -> Vec<Access> {
    (0..count as u64).map(|i| Access::load(start + i * stride)).collect()
}

/// A reproducible mix of loads and stores over a footprint of `footprint` bytes
///
/// Addresses come from a xorshift generator; every `store_every`-th access is a store (never,
/// for 0)
pub fn mixed_workload(count: usize, footprint: u64, store_every: usize, seed: u64) -> Vec<Access> {
    let mut state = seed.max(1);
    (0..count)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let kind = if store_every != 0 && i % store_every == store_every - 1 {
                AccessKind::Store
            } else {
                AccessKind::Load
            };
            Access {
                address: state % footprint.max(1),
                kind,
            }
        })
        .collect()
}

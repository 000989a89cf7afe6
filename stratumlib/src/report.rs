use std::collections::HashMap;
use std::fmt;

use log::warn;
use serde::Serialize;

use crate::cache::AccessResult;
use crate::simulator::Access;

/// Per-level figures derived from a sequence of results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelReport {
    pub name: String,
    pub hits: u64,
    pub misses: u64,
    /// Sum of the total cycles of the accesses which hit at this level
    pub total_latency: u64,
    pub avg_latency: f64,
}

/// The aggregated results of a simulation, one entry per level in hierarchy order. Can be
/// serialised, or displayed as a table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedReport {
    pub levels: Vec<LevelReport>,
}

/// Attributes every result to the levels it passed through
///
/// A result is a hit for its `hit_level` and a miss for every level listed before it. Results
/// naming a level missing from `level_names` can only come from a mismatched level list; they are
/// logged and skipped
///
/// # Arguments
///
/// * `results`: The results of a simulation
/// * `level_names`: The levels of the hierarchy, top to bottom
///
/// returns: AggregatedReport
pub fn aggregate<S: AsRef<str>>(results: &[AccessResult], level_names: &[S]) -> AggregatedReport {
    let positions: HashMap<&str, usize> = level_names
        .iter()
        .enumerate()
        .map(|(index, name)| (name.as_ref(), index))
        .collect();
    let mut levels: Vec<LevelReport> = level_names
        .iter()
        .map(|name| LevelReport {
            name: name.as_ref().to_string(),
            ..LevelReport::default()
        })
        .collect();
    for result in results {
        let Some(&position) = positions.get(&*result.hit_level) else {
            warn!("Hit level {} is not in the hierarchy, ignoring it", result.hit_level);
            continue;
        };
        for level in &mut levels[..position] {
            level.misses += 1;
        }
        let level = &mut levels[position];
        level.hits += 1;
        level.total_latency += result.total_cycles;
    }
    for level in &mut levels {
        if level.hits > 0 {
            level.avg_latency = level.total_latency as f64 / level.hits as f64;
        }
    }
    AggregatedReport { levels }
}

impl fmt::Display for AggregatedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation Results (Aggregated) ===")?;
        writeln!(f, "{:<15} {:>10} {:>10} {:>20}", "Level", "Hits", "Misses", "Avg Latency (cyc)")?;
        for level in &self.levels {
            writeln!(
                f,
                "{:<15} {:>10} {:>10} {:>20.0}",
                level.name, level.hits, level.misses, level.avg_latency
            )?;
        }
        Ok(())
    }
}

/// The detailed history of a simulation, one line per access
pub struct AccessLog<'a> {
    accesses: &'a [Access],
    results: &'a [AccessResult],
}

impl<'a> AccessLog<'a> {
    /// Pairs accesses with their results. Extra entries on either side are not shown
    pub fn new(accesses: &'a [Access], results: &'a [AccessResult]) -> Self {
        Self { accesses, results }
    }
}

impl fmt::Display for AccessLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Detailed History ===")?;
        for (index, (access, result)) in self.accesses.iter().zip(self.results).enumerate() {
            writeln!(
                f,
                "Access[{:>4}] Addr=0x{:08x} Hit={:<15} Cyc={:>6}",
                index, access.address, result.hit_level, result.total_cycles
            )?;
        }
        Ok(())
    }
}

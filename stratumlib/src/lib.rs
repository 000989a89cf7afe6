//! # StratumLib
//!
//! Stratumlib is a library for simulating multi-level memory hierarchies
//!
//! It provides a set-associative, write-back, write-allocate cache level which owns the next level
//! down, a main memory sentinel terminating the chain, pluggable replacement policies, and a
//! simulator which drives load/store streams through the hierarchy and records which level
//! serviced each access and how many cycles it took
//!
//! The simulation core never prints anything; reporting, trace loading and configuration are kept
//! in their own modules and only consume the results and counters the core exposes

/// Contains the cache level, the main memory sentinel, and the enum tying them into a chain
pub mod cache;

/// Contains definitions for the JSON configuration format
pub mod config;

/// Contains the builder which assembles and validates a hierarchy
pub mod hierarchy;

/// Contains trace file access
pub mod io;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the aggregation of simulation results into per-level reports
pub mod report;

/// Contains the simulator used to drive an access stream through a hierarchy
pub mod simulator;

/// Contains the trace format parser
pub mod trace;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;

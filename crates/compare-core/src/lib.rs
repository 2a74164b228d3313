//! The comparison engine for nc-compare.
//!
//! This crate owns everything between the container backends and the
//! reporter: the lock-step hierarchy walk ([`walker`]), per-variable
//! metadata extraction and stringification ([`variable`]), the running
//! difference tallies ([`tally`]), the random sampled-value check
//! ([`sample`]), and the [`comparison::Comparison`] driver that glues
//! them together and produces the total difference count.

pub mod comparison;
pub mod sample;
pub mod tally;
pub mod testing;
pub mod variable;
pub mod walker;

pub use comparison::{Comparison, ComparisonOptions};
pub use sample::{
    check_sample_values, probe, IndexSource, ProbeOutcome, RandomIndexSource,
    DEFAULT_PROBE_COUNT, VALUE_MATCH_EPSILON,
};
pub use tally::{CategoryCounts, DiffAccumulator, DiffSummary, DiffTally};
pub use variable::VariableProperties;
pub use walker::{walk_group_pairs, GroupPair};

//! Random sampled-value checking for one selected variable.

use anyhow::bail;
use ndarray::ArrayD;
use rand::Rng;

use nc_compare_report::{Reporter, TextStyle};

/// Two sampled values within this absolute difference count as a match.
pub const VALUE_MATCH_EPSILON: f64 = 1e-6;

/// Number of random probes per check.
pub const DEFAULT_PROBE_COUNT: usize = 100;

/// Supplies multi-dimensional indices for probing.
///
/// Production uses [`RandomIndexSource`]; tests inject a scripted source
/// for deterministic coverage.
pub trait IndexSource {
    /// One index, uniformly within `shape` bounds. Every dimension of
    /// `shape` is non-zero; the checker rejects empty variables up front.
    fn pick(&mut self, shape: &[usize]) -> Vec<usize>;
}

/// Draws indices from the thread-local random generator.
#[derive(Debug, Default)]
pub struct RandomIndexSource;

impl IndexSource for RandomIndexSource {
    fn pick(&mut self, shape: &[usize]) -> Vec<usize> {
        let mut rng = rand::rng();
        shape.iter().map(|&dim| rng.random_range(0..dim)).collect()
    }
}

/// Classification of one probe.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// Both values equal within tolerance, or both missing.
    Match,
    /// Exactly one value is missing (NaN).
    NullMismatch,
    /// Both values present but further apart than the tolerance.
    ValueMismatch {
        index: Vec<usize>,
        value_a: f64,
        value_b: f64,
    },
}

/// Probe one random index in both arrays and classify the value pair.
///
/// The index is drawn within `values_a`'s bounds; callers guarantee both
/// arrays share a shape.
pub fn probe(
    values_a: &ArrayD<f64>,
    values_b: &ArrayD<f64>,
    indices: &mut dyn IndexSource,
) -> ProbeOutcome {
    let index = indices.pick(values_a.shape());
    let value_a = values_a[index.as_slice()];
    let value_b = values_b[index.as_slice()];

    match (value_a.is_nan(), value_b.is_nan()) {
        (true, true) => ProbeOutcome::Match,
        (true, false) | (false, true) => ProbeOutcome::NullMismatch,
        (false, false) => {
            if (value_b - value_a).abs() <= VALUE_MATCH_EPSILON {
                ProbeOutcome::Match
            } else {
                ProbeOutcome::ValueMismatch {
                    index,
                    value_a,
                    value_b,
                }
            }
        }
    }
}

/// Run `probe_count` probes, printing one mark per probe (`.` match, `n`
/// null mismatch, `x` value mismatch) plus a diagnostic block for every
/// value mismatch, and report the aggregate mismatch count.
///
/// # Errors
///
/// Fails before any probe when the two arrays differ in shape or when any
/// dimension is empty.
pub fn check_sample_values(
    out: &mut Reporter,
    values_a: &ArrayD<f64>,
    values_b: &ArrayD<f64>,
    indices: &mut dyn IndexSource,
    probe_count: usize,
) -> anyhow::Result<u64> {
    if values_a.shape() != values_b.shape() {
        bail!(
            "variables have different shapes: {:?} vs {:?}",
            values_a.shape(),
            values_b.shape()
        );
    }
    if values_a.shape().iter().any(|&dim| dim == 0) {
        bail!(
            "variable has an empty dimension and cannot be sampled: {:?}",
            values_a.shape()
        );
    }

    let mut mismatches = 0u64;
    let mut marks = String::new();
    for _ in 0..probe_count {
        match probe(values_a, values_b, indices) {
            ProbeOutcome::Match => marks.push('.'),
            ProbeOutcome::NullMismatch => {
                marks.push('n');
                mismatches += 1;
            }
            ProbeOutcome::ValueMismatch {
                index,
                value_a,
                value_b,
            } => {
                marks.push('x');
                mismatches += 1;
                out.print(&marks, TextStyle::Plain, false);
                marks.clear();
                out.print(
                    &format!(
                        "Difference exceeded threshold (diff == {})",
                        value_b - value_a
                    ),
                    TextStyle::Error,
                    false,
                );
                out.print(
                    &format!("var shape: {:?}", values_a.shape()),
                    TextStyle::Plain,
                    false,
                );
                out.print(&format!("indices:   {index:?}"), TextStyle::Plain, false);
                out.print(&format!("value a: {value_a}"), TextStyle::Plain, false);
                out.print(&format!("value b: {value_b}"), TextStyle::Plain, false);
            }
        }
    }
    if !marks.is_empty() {
        out.print(&marks, TextStyle::Plain, false);
    }

    if mismatches > 0 {
        out.print(
            &format!(" {mismatches} mismatches, out of {probe_count} samples."),
            TextStyle::Error,
            false,
        );
    } else {
        out.print(" No mismatches.", TextStyle::Notice, false);
    }
    out.print("Done.", TextStyle::Plain, false);

    Ok(mismatches)
}

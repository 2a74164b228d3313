//! Running difference tallies and the end-of-run summary.

use std::collections::BTreeSet;

use nc_compare_report::RowOutcome;

/// Counters for one comparison category (groups, variables, or attributes).
///
/// Counts only ever increase; the tally is created at comparison start,
/// fed throughout the traversal, and read once to build the summary.
#[derive(Debug, Clone, Default)]
pub struct DiffTally {
    pub shared: u64,
    pub left: u64,
    pub right: u64,
    /// Present on both sides but with different values. Folded into the
    /// left and right totals when summarizing.
    pub both: u64,
    /// Names of the items that differed, for the summary listing.
    pub difference_names: BTreeSet<String>,
}

impl DiffTally {
    /// Bump the counter matching a displayed row's classification.
    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Shared => self.shared += 1,
            RowOutcome::Left => self.left += 1,
            RowOutcome::Right => self.right += 1,
            RowOutcome::Both => self.both += 1,
        }
    }
}

/// Summary counts for one category, with the "both different" counter
/// already folded into each side.
///
/// The folded left and right totals read as "number of items whose value
/// differs or is absent on that side"; this aggregation rule is deliberate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCounts {
    pub shared: u64,
    pub left: u64,
    pub right: u64,
}

impl CategoryCounts {
    fn from_tally(tally: &DiffTally) -> Self {
        CategoryCounts {
            shared: tally.shared,
            left: tally.left + tally.both,
            right: tally.right + tally.both,
        }
    }
}

/// The end-of-run summary across all three categories.
#[derive(Debug, Clone)]
pub struct DiffSummary {
    pub variables: CategoryCounts,
    pub groups: CategoryCounts,
    pub attributes: CategoryCounts,
    /// Sorted names of the attributes that were found different.
    pub attribute_difference_names: Vec<String>,
}

impl DiffSummary {
    /// Total difference count; zero means the files compared clean.
    pub fn total_differences(&self) -> u64 {
        [self.variables, self.groups, self.attributes]
            .iter()
            .map(|counts| counts.left + counts.right)
            .sum()
    }
}

/// One tally per comparison category, owned by a single comparison run.
#[derive(Debug, Clone, Default)]
pub struct DiffAccumulator {
    pub groups: DiffTally,
    pub variables: DiffTally,
    pub attributes: DiffTally,
}

impl DiffAccumulator {
    pub fn record_group(&mut self, outcome: RowOutcome) {
        self.groups.record(outcome);
    }

    /// Add bulk variable-presence counts for one group, as returned by
    /// set-difference counting over the two variable name lists.
    pub fn record_variable_counts(&mut self, left: usize, right: usize, shared: usize) {
        self.variables.left += left as u64;
        self.variables.right += right as u64;
        self.variables.shared += shared as u64;
    }

    /// Record one compared variable property or attribute row, remembering
    /// the attribute's name when the row showed a difference.
    pub fn record_attribute(&mut self, name: &str, outcome: RowOutcome) {
        self.attributes.record(outcome);
        if outcome.is_difference() {
            self.attributes.difference_names.insert(name.to_string());
        }
    }

    pub fn summarize(&self) -> DiffSummary {
        DiffSummary {
            variables: CategoryCounts::from_tally(&self.variables),
            groups: CategoryCounts::from_tally(&self.groups),
            attributes: CategoryCounts::from_tally(&self.attributes),
            attribute_difference_names: self
                .attributes
                .difference_names
                .iter()
                .cloned()
                .collect(),
        }
    }
}

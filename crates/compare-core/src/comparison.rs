//! The comparison driver: wires the walker, variable extraction, tallies,
//! and reporter into one pass over both files.

use anyhow::Context;

use nc_compare_align::{align, count_diffs};
use nc_compare_container::ContainerAccess;
use nc_compare_report::{Reporter, RowOptions, RowOutcome, TextStyle};

use crate::sample::{check_sample_values, RandomIndexSource, DEFAULT_PROBE_COUNT};
use crate::tally::{CategoryCounts, DiffAccumulator, DiffSummary};
use crate::variable::{attribute_pairs, scale_factor_pair, VariableProperties};
use crate::walker::walk_group_pairs;

/// Longer variable names are cut off in the VARIABLE header row.
const VARIABLE_NAME_DISPLAY_LEN: usize = 47;

/// Run options for one comparison.
#[derive(Debug, Clone, Default)]
pub struct ComparisonOptions {
    pub show_chunks: bool,
    pub show_attributes: bool,
    /// Group whose variable list is compared separately and which hosts the
    /// sampled-value check.
    pub comparison_var_group: Option<String>,
    /// Variable whose values are randomly sampled; requires the group.
    pub comparison_var_name: Option<String>,
}

/// One full structural comparison of two open containers.
///
/// Owns the difference tallies for its lifetime; a single `run` call
/// performs the root-dimension and root-group list diffs, the optional
/// selected-group section, the full hierarchy traversal, and the summary.
pub struct Comparison<'a> {
    file_a: &'a dyn ContainerAccess,
    file_b: &'a dyn ContainerAccess,
    options: ComparisonOptions,
    tallies: DiffAccumulator,
}

impl<'a> Comparison<'a> {
    pub fn new(
        file_a: &'a dyn ContainerAccess,
        file_b: &'a dyn ContainerAccess,
        options: ComparisonOptions,
    ) -> Self {
        Comparison {
            file_a,
            file_b,
            options,
            tallies: DiffAccumulator::default(),
        }
    }

    /// Execute the comparison, emitting every row through `out`.
    ///
    /// # Errors
    ///
    /// Fails on structural errors (a backend that cannot list its own
    /// hierarchy). Errors in the selected-group section are recovered and
    /// inlined into the transcript instead.
    pub fn run(&mut self, out: &mut Reporter) -> anyhow::Result<DiffSummary> {
        self.print_root_dimensions(out)?;
        self.print_root_groups(out)?;
        self.print_selected_group_section(out);

        out.print("\nAll variables:", TextStyle::Heading, true);
        out.side_by_side(" ", "File A", "File B", RowOptions::forced());
        self.traverse(out)?;

        Ok(self.print_summary(out))
    }

    fn print_root_dimensions(&mut self, out: &mut Reporter) -> anyhow::Result<()> {
        out.print("\nRoot-level Dimensions:", TextStyle::Heading, true);
        let list_a = dimension_strings(
            self.file_a
                .root_dimensions()
                .context("failed to read root dimensions from file A")?,
        );
        let list_b = dimension_strings(
            self.file_b
                .root_dimensions()
                .context("failed to read root dimensions from file B")?,
        );
        out.lists_diff(&list_a, &list_b);
        Ok(())
    }

    fn print_root_groups(&mut self, out: &mut Reporter) -> anyhow::Result<()> {
        out.print("\nRoot-level Groups:", TextStyle::Heading, true);
        let list_a = self
            .file_a
            .subgroup_names("")
            .context("failed to list root groups of file A")?;
        let list_b = self
            .file_b
            .subgroup_names("")
            .context("failed to list root groups of file B")?;
        out.lists_diff(&list_a, &list_b);
        Ok(())
    }

    /// The selected-group listing and sampled-value check. Failures here
    /// (missing group or variable, unreadable values) are printed into the
    /// transcript and do not abort the structural comparison.
    fn print_selected_group_section(&mut self, out: &mut Reporter) {
        let Some(group) = self.options.comparison_var_group.clone() else {
            out.print(
                "\nNo variable group selected for comparison. Skipping..",
                TextStyle::Dim,
                false,
            );
            return;
        };

        if let Err(error) = self.compare_selected_group(out, &group) {
            let name = self.options.comparison_var_name.as_deref().unwrap_or("");
            out.print(
                &format!("\nError when comparing values for variable <{name}> in group <{group}>."),
                TextStyle::Error,
                false,
            );
            out.print(&format!("{error:#}"), TextStyle::Plain, false);
            out.print("", TextStyle::Plain, false);
        }
    }

    fn compare_selected_group(&mut self, out: &mut Reporter, group: &str) -> anyhow::Result<()> {
        out.print(
            &format!("\nVariables within specified group <{group}>:"),
            TextStyle::Heading,
            true,
        );
        let vars_a = self
            .file_a
            .variable_names(group)
            .with_context(|| format!("failed to open group <{group}> in file A"))?;
        let vars_b = self
            .file_b
            .variable_names(group)
            .with_context(|| format!("failed to open group <{group}> in file B"))?;
        out.lists_diff(&vars_a, &vars_b);

        let Some(name) = self.options.comparison_var_name.clone() else {
            out.print(
                "\nNo variable selected for comparison. Skipping..",
                TextStyle::Dim,
                false,
            );
            return Ok(());
        };

        out.print(
            &format!("\nChecking multiple random values within specified variable <{name}>:"),
            TextStyle::Heading,
            false,
        );
        let values_a = self
            .file_a
            .variable_values(group, &name)
            .with_context(|| format!("failed to read values of <{name}> from file A"))?;
        let values_b = self
            .file_b
            .variable_values(group, &name)
            .with_context(|| format!("failed to read values of <{name}> from file B"))?;
        check_sample_values(
            out,
            &values_a,
            &values_b,
            &mut RandomIndexSource,
            DEFAULT_PROBE_COUNT,
        )?;
        Ok(())
    }

    fn traverse(&mut self, out: &mut Reporter) -> anyhow::Result<()> {
        out.side_by_side("All Variables", " ", " ", RowOptions::forced());
        dash_row(out);

        let pairs = walk_group_pairs(self.file_a, self.file_b)
            .context("failed to walk the group hierarchies")?;
        tracing::debug!(groups = pairs.len(), "aligned group hierarchies");
        for (counter, pair) in pairs.iter().enumerate() {
            if !pair.is_root() {
                let outcome = match (pair.path_a.is_some(), pair.path_b.is_some()) {
                    (true, true) => RowOutcome::Shared,
                    (true, false) => RowOutcome::Left,
                    _ => RowOutcome::Right,
                };
                self.tallies.record_group(outcome);
            }

            out.side_by_side(" ", " ", " ", RowOptions::forced());
            out.side_by_side(
                &format!("GROUP #{counter:02}"),
                &pair.display_a(),
                &pair.display_b(),
                RowOptions {
                    dash_line: true,
                    force_display: true,
                    ..Default::default()
                },
            );

            let vars_a = match &pair.path_a {
                Some(path) => self.file_a.variable_names(path)?,
                None => Vec::new(),
            };
            let vars_b = match &pair.path_b {
                Some(path) => self.file_b.variable_names(path)?,
                None => Vec::new(),
            };
            out.side_by_side(
                "num variables in group:",
                &vars_a.len().to_string(),
                &vars_b.len().to_string(),
                RowOptions {
                    highlight_diff: true,
                    force_display: true,
                    ..Default::default()
                },
            );
            dash_row(out);

            let (left, right, shared) = count_diffs(vars_a.clone(), vars_b.clone());
            self.tallies.record_variable_counts(left, right, shared);

            for var_pair in align(vars_a, vars_b) {
                let props_a =
                    side_properties(self.file_a, pair.path_a.as_deref(), var_pair.left.as_deref())?;
                let props_b = side_properties(
                    self.file_b,
                    pair.path_b.as_deref(),
                    var_pair.right.as_deref(),
                )?;
                self.print_variable(out, &props_a, &props_b);
            }
        }
        Ok(())
    }

    /// Print one variable's property rows side by side and tally each row.
    fn print_variable(
        &mut self,
        out: &mut Reporter,
        a: &VariableProperties,
        b: &VariableProperties,
    ) {
        let mut rows: Vec<(String, String, String)> = vec![
            ("dtype".to_string(), a.dtype.clone(), b.dtype.clone()),
            (
                "dimensions".to_string(),
                a.dimensions.clone(),
                b.dimensions.clone(),
            ),
            ("shape".to_string(), a.shape.clone(), b.shape.clone()),
        ];
        if self.options.show_chunks {
            rows.push((
                "chunksize".to_string(),
                a.chunking.clone(),
                b.chunking.clone(),
            ));
        }
        if let Some((factor_a, factor_b)) = scale_factor_pair(a, b) {
            rows.push(("scale_factor".to_string(), factor_a, factor_b));
        }
        if self.options.show_attributes {
            rows.extend(attribute_pairs(a, b));
        }

        // Decide up front whether the header is shown: always when any
        // property differs, otherwise only outside only-diffs mode.
        let differs = rows.iter().any(|(_, value_a, value_b)| value_a != value_b);
        if differs || !out.only_diffs() {
            out.side_by_side(
                "-----VARIABLE-----:",
                &truncate_name(&a.name),
                &truncate_name(&b.name),
                RowOptions::forced(),
            );
        }

        for (name, value_a, value_b) in rows {
            let outcome =
                out.side_by_side(&format!("{name}:"), &value_a, &value_b, RowOptions::highlight());
            self.tallies.record_attribute(&name, outcome);
        }
    }

    fn print_summary(&self, out: &mut Reporter) -> DiffSummary {
        dash_row(out);
        out.side_by_side("SUMMARY", "-", "-", RowOptions::dash());

        let summary = self.tallies.summarize();
        summary_rows(out, "variable", summary.variables);
        summary_rows(out, "group", summary.groups);
        summary_rows(out, "attribute", summary.attributes);

        if !summary.attribute_difference_names.is_empty() {
            out.print(
                "\nDifferences were found in these attributes:",
                TextStyle::Heading,
                true,
            );
            out.print(
                &format!("\n{:?}", summary.attribute_difference_names),
                TextStyle::Heading,
                true,
            );
        }
        summary
    }
}

fn side_properties(
    access: &dyn ContainerAccess,
    group_path: Option<&str>,
    name: Option<&str>,
) -> anyhow::Result<VariableProperties> {
    match (group_path, name) {
        (Some(path), Some(name)) => VariableProperties::from_container(access, path, name)
            .with_context(|| format!("failed to read variable <{name}> in group </{path}>")),
        _ => Ok(VariableProperties::missing()),
    }
}

fn summary_rows(out: &mut Reporter, kind: &str, counts: CategoryCounts) {
    out.side_by_side(
        &format!("Total # of shared {kind}s:"),
        &counts.shared.to_string(),
        &counts.shared.to_string(),
        RowOptions::forced(),
    );
    out.side_by_side(
        &format!("Total # of non-shared {kind}s:"),
        &counts.left.to_string(),
        &counts.right.to_string(),
        RowOptions::forced(),
    );
}

fn dash_row(out: &mut Reporter) {
    out.side_by_side("-", "-", "-", RowOptions::dash());
}

fn dimension_strings(dimensions: Vec<(String, usize)>) -> Vec<String> {
    dimensions
        .into_iter()
        .map(|(name, len)| format!("('{name}', {len})"))
        .collect()
}

fn truncate_name(name: &str) -> String {
    name.chars().take(VARIABLE_NAME_DISPLAY_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{simple_variable, MemoryContainer};
    use nc_compare_report::{ColorMode, Reporter, ReporterOptions};

    fn quiet_reporter() -> Reporter {
        let options = ReporterOptions {
            color: ColorMode::Plain,
            keep_history: true,
            ..Default::default()
        };
        Reporter::with_sink(options, Box::new(std::io::sink())).unwrap()
    }

    fn base_file() -> MemoryContainer {
        MemoryContainer::new()
            .with_dimension("x", 8)
            .with_dimension("y", 2)
            .with_dimension("time", 10)
            .with_variable("", simple_variable("z1", "f64", &[2, 8]))
            .with_variable("", simple_variable("z2", "f64", &[2, 8]))
    }

    fn file_with_extra_group() -> MemoryContainer {
        base_file()
            .with_variable("Group1", simple_variable("var1", "f64", &[10]))
            .with_variable("Group1", simple_variable("var2", "f64", &[10]))
            .with_variable("Group1", simple_variable("step", "i64", &[10]))
            .with_variable("Group1", simple_variable("w", "f64", &[10]))
    }

    fn run_comparison(
        file_a: &MemoryContainer,
        file_b: &MemoryContainer,
        options: ComparisonOptions,
    ) -> DiffSummary {
        let mut out = quiet_reporter();
        Comparison::new(file_a, file_b, options)
            .run(&mut out)
            .unwrap()
    }

    #[test]
    fn test_self_comparison_finds_no_differences() {
        let file = file_with_extra_group();
        let summary = run_comparison(&file, &file, ComparisonOptions::default());
        assert_eq!(summary.total_differences(), 0);
        assert_eq!(summary.variables.shared, 6);
        assert_eq!(summary.groups.shared, 1);
    }

    #[test]
    fn test_added_group_with_variables() {
        let file_a = base_file();
        let file_b = file_with_extra_group();
        let summary = run_comparison(&file_a, &file_b, ComparisonOptions::default());

        // Root dimensions are identical; the extra group and its four
        // variables are right-only; z1 and z2 stay shared.
        assert_eq!(summary.groups.left, 0);
        assert_eq!(summary.groups.right, 1);
        assert_eq!(summary.variables.shared, 2);
        assert_eq!(summary.variables.left, 0);
        assert_eq!(summary.variables.right, 4);

        // Each missing variable contributes its dtype, dimensions, and
        // shape rows as right-only attribute differences.
        assert_eq!(summary.attributes.right, 12);
        assert!(summary.total_differences() > 0);
    }

    #[test]
    fn test_presence_counts_swap_under_symmetry() {
        let file_a = base_file();
        let file_b = file_with_extra_group();
        let forward = run_comparison(&file_a, &file_b, ComparisonOptions::default());
        let backward = run_comparison(&file_b, &file_a, ComparisonOptions::default());

        assert_eq!(forward.groups.left, backward.groups.right);
        assert_eq!(forward.groups.right, backward.groups.left);
        assert_eq!(forward.variables.left, backward.variables.right);
        assert_eq!(forward.variables.right, backward.variables.left);
        assert_eq!(forward.variables.shared, backward.variables.shared);
    }

    #[test]
    fn test_attribute_value_difference_is_named_in_summary() {
        let mut with_units = simple_variable("z1", "f64", &[2, 8]);
        with_units.attributes.push((
            "units".to_string(),
            nc_compare_container::AttrValue::Str("m".to_string()),
        ));
        let file_a = MemoryContainer::new().with_variable("", with_units);
        let file_b = MemoryContainer::new().with_variable("", simple_variable("z1", "f64", &[2, 8]));

        let options = ComparisonOptions {
            show_attributes: true,
            ..Default::default()
        };
        let summary = run_comparison(&file_a, &file_b, options);
        assert_eq!(
            summary.attribute_difference_names,
            vec!["units".to_string()]
        );
    }

    #[test]
    fn test_missing_comparison_group_is_recovered() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("transcript.txt");
        let options = ReporterOptions {
            color: ColorMode::Plain,
            text_file: Some(transcript.clone()),
            ..Default::default()
        };
        let mut out = Reporter::with_sink(options, Box::new(std::io::sink())).unwrap();

        let file = base_file();
        let comparison_options = ComparisonOptions {
            comparison_var_group: Some("GroupX".to_string()),
            comparison_var_name: Some("var1".to_string()),
            ..Default::default()
        };
        let summary = Comparison::new(&file, &file, comparison_options)
            .run(&mut out)
            .unwrap();
        out.flush().unwrap();

        // The structural comparison still completed cleanly.
        assert_eq!(summary.total_differences(), 0);
        let text = std::fs::read_to_string(&transcript).unwrap();
        assert!(text.contains("Error when comparing values for variable <var1> in group <GroupX>."));
        assert!(text.contains("group not found"));
        assert!(text.contains("Total # of shared variables:"));
    }

    #[test]
    fn test_sampled_value_check_runs_for_selected_variable() {
        let values = ndarray::ArrayD::from_shape_vec(vec![10], (0..10).map(f64::from).collect())
            .unwrap();
        let file = MemoryContainer::new()
            .with_variable("Group1", simple_variable("var1", "f64", &[10]))
            .with_values("Group1", "var1", values);

        let options = ComparisonOptions {
            comparison_var_group: Some("Group1".to_string()),
            comparison_var_name: Some("var1".to_string()),
            ..Default::default()
        };
        let summary = run_comparison(&file, &file, options);
        assert_eq!(summary.total_differences(), 0);
    }
}

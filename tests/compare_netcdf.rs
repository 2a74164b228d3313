//! End-to-end comparison runs against real netCDF fixtures.

use std::path::{Path, PathBuf};

use nc_compare::CompareOpts;

// ============================================================================
// Fixture construction
// ============================================================================

/// dims {x:8, y:2, time:10} and root variables z1, z2.
fn create_base_file(path: &Path) {
    let mut file = netcdf::create(path).expect("failed to create netcdf fixture");
    file.add_dimension("x", 8).unwrap();
    file.add_dimension("y", 2).unwrap();
    file.add_dimension("time", 10).unwrap();
    file.add_variable::<f64>("z1", &["y", "x"]).unwrap();
    file.add_variable::<f64>("z2", &["y", "x"]).unwrap();
}

/// The base file plus one group "Group1" holding var1, var2, step, and w,
/// with deterministic values written into var1.
fn create_extended_file(path: &Path) {
    create_base_file(path);
    let mut file = netcdf::append(path).expect("failed to reopen netcdf fixture");
    let mut group = file.add_group("Group1").unwrap();
    group.add_dimension("t", 10).unwrap();

    let mut var1 = group.add_variable::<f64>("var1", &["t"]).unwrap();
    let values: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
    var1.put_values(&values, ..).unwrap();

    group.add_variable::<f64>("var2", &["t"]).unwrap();
    group.add_variable::<i64>("step", &["t"]).unwrap();
    group.add_variable::<f64>("w", &["t"]).unwrap();
}

fn default_opts(file_a: PathBuf, file_b: PathBuf) -> CompareOpts {
    CompareOpts {
        file_a,
        file_b,
        comparison_var_group: None,
        comparison_var_name: None,
        only_diffs: false,
        show_chunks: false,
        show_attributes: false,
        no_color: true,
        file_text: None,
        file_csv: None,
        file_xlsx: None,
        column_widths: None,
    }
}

// ============================================================================
// Structural comparison
// ============================================================================

#[test]
fn test_identical_files_compare_clean() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.nc");
    create_extended_file(&path);

    let opts = default_opts(path.clone(), path.clone());
    let diff_count = nc_compare::compare(&opts).unwrap();
    assert_eq!(diff_count, 0);
}

#[test]
fn test_added_group_with_variables_is_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.nc");
    let path_b = dir.path().join("b.nc");
    create_base_file(&path_a);
    create_extended_file(&path_b);

    let opts = default_opts(path_a, path_b);
    let diff_count = nc_compare::compare(&opts).unwrap();

    // One right-only group, four right-only variables, and each missing
    // variable's dtype, dimensions, and shape rows count as right-only.
    assert_eq!(diff_count, 1 + 4 + 4 * 3);
}

#[test]
fn test_csv_report_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.nc");
    create_base_file(&path);
    let report = dir.path().join("report.csv");

    let mut opts = default_opts(path.clone(), path);
    opts.file_csv = Some(report.clone());
    nc_compare::compare(&opts).unwrap();

    let content = std::fs::read_to_string(&report).unwrap();
    assert!(content.starts_with("Info,File A,File B,Other marks"));
    assert!(content.contains("Root-level Dimensions:"));
}

// ============================================================================
// Sampled-value check
// ============================================================================

#[test]
fn test_sample_value_check_on_identical_variable() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.nc");
    let path_b = dir.path().join("b.nc");
    create_extended_file(&path_a);
    create_extended_file(&path_b);
    let transcript = dir.path().join("transcript.txt");

    let mut opts = default_opts(path_a, path_b);
    opts.comparison_var_group = Some("Group1".to_string());
    opts.comparison_var_name = Some("var1".to_string());
    opts.file_text = Some(transcript.clone());
    let diff_count = nc_compare::compare(&opts).unwrap();

    assert_eq!(diff_count, 0);
    let text = std::fs::read_to_string(&transcript).unwrap();
    assert!(text.contains("Checking multiple random values within specified variable <var1>:"));
    assert!(text.contains(" No mismatches."));
}

#[test]
fn test_missing_comparison_group_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.nc");
    create_base_file(&path);
    let transcript = dir.path().join("transcript.txt");

    let mut opts = default_opts(path.clone(), path);
    opts.comparison_var_group = Some("GroupX".to_string());
    opts.comparison_var_name = Some("var1".to_string());
    opts.file_text = Some(transcript.clone());

    // The structural comparison still completes and reports no differences.
    let diff_count = nc_compare::compare(&opts).unwrap();
    assert_eq!(diff_count, 0);

    let text = std::fs::read_to_string(&transcript).unwrap();
    assert!(text.contains("Error when comparing values for variable <var1> in group <GroupX>."));
    assert!(text.contains("Total # of shared variables:"));
}

// ============================================================================
// Input validation
// ============================================================================

#[test]
fn test_mismatched_format_families_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.nc");
    create_base_file(&path_a);
    let path_b = dir.path().join("b.h5");
    std::fs::write(&path_b, b"").unwrap();

    let opts = default_opts(path_a, path_b);
    let error = nc_compare::compare(&opts).unwrap_err();
    assert!(error.to_string().contains("cannot compare"));
}

#[test]
fn test_unwritable_report_destination_fails_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.nc");
    create_base_file(&path);
    let transcript = dir.path().join("transcript.txt");

    let mut opts = default_opts(path.clone(), path);
    opts.file_text = Some(transcript.clone());
    opts.file_csv = Some(dir.path().join("missing_dir").join("report.csv"));

    let error = nc_compare::compare(&opts).unwrap_err();
    assert!(format!("{error:#}").contains("invalid CSV report destination"));
    assert!(
        !transcript.exists(),
        "destinations must be checked before any comparison output"
    );
}

#[test]
fn test_wrong_column_width_count_parses_and_runs_with_defaults() {
    use clap::Parser;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.nc");
    create_base_file(&path);

    let opts = CompareOpts::parse_from([
        "nc-compare",
        path.to_str().unwrap(),
        path.to_str().unwrap(),
        "--no-color",
        "--column-widths",
        "20",
        "30",
    ]);
    assert_eq!(opts.column_widths, Some(vec![20, 30]));

    // The wrong arity warns inside the reporter and reverts to the default
    // widths; the run itself still completes.
    let diff_count = nc_compare::compare(&opts).unwrap();
    assert_eq!(diff_count, 0);
}

#[test]
fn test_missing_input_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.nc");
    create_base_file(&path_a);

    let opts = default_opts(path_a, dir.path().join("nope.nc"));
    let error = nc_compare::compare(&opts).unwrap_err();
    assert!(format!("{error:#}").contains("does not exist"));
}

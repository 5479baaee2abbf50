use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use stencil::cli::Args;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("stencil")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let args = make_args(&["./generator", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.generator.as_deref(), Some("./generator"));
    assert_eq!(parsed.output_dir, Some(PathBuf::from("./output")));
    assert!(!parsed.clone);
    assert!(!parsed.verbose);
    assert!(parsed.argv.is_empty());
}

#[test]
fn test_all_flags() {
    let args = make_args(&["--clone", "--verbose", "user/repo", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.clone);
    assert!(parsed.verbose);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-c", "-v", "user/repo", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.clone);
    assert!(parsed.verbose);
}

#[test]
fn test_package_reference() {
    let args = make_args(&["generator-react-app", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.generator.as_deref(), Some("generator-react-app"));
}

#[test]
fn test_missing_args_parse() {
    // Presence validation belongs to the loader, not the parser.
    let parsed = Args::try_parse_from(make_args(&[])).unwrap();

    assert!(parsed.generator.is_none());
    assert!(parsed.output_dir.is_none());
}

#[test]
fn test_trailing_args_pass_through() {
    let args = make_args(&["./generator", "./output", "extra", "values"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.argv, vec!["extra".to_string(), "values".to_string()]);
}

use std::fs;
use std::path::PathBuf;

use stencil::error::Error;
use stencil::pipeline::{
    pipeline, Dest, IgnoreFilter, Metadata, Modify, Packages, Stage, Template,
};
use stencil::record::FileRecord;
use stencil::renderer::MiniJinjaRenderer;
use stencil::stream::FileStream;
use tempfile::TempDir;

fn record(base: &str, relative: &str, contents: &[u8]) -> FileRecord {
    let base = PathBuf::from(base);
    FileRecord::new(contents.to_vec(), base.join(relative), base.clone(), base)
}

#[test]
fn test_ignore_filter_drops_matches() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".gitignore"), "*.pyc\n\n# comment\n").unwrap();

    let mut filter = IgnoreFilter::from_source_root(temp_dir.path()).unwrap();

    let dropped = filter.process(record("/src", "cache.pyc", b"x")).unwrap();
    assert!(dropped.is_none());

    let kept = filter.process(record("/src", "main.py", b"x")).unwrap();
    assert!(kept.is_some());
}

#[test]
fn test_ignore_filter_builtin_git_rule() {
    let temp_dir = TempDir::new().unwrap();
    // No ignore file at all; the built-in rules still apply.
    let mut filter = IgnoreFilter::from_source_root(temp_dir.path()).unwrap();

    let dropped = filter.process(record("/src", ".git/HEAD", b"ref")).unwrap();
    assert!(dropped.is_none());
}

#[test]
fn test_metadata_injects_values() {
    let mut values = serde_json::Map::new();
    values.insert("name".to_string(), serde_json::Value::String("my-app".to_string()));
    let mut stage = Metadata::new(values);

    let record = stage.process(record("/src", "a.txt", b"x")).unwrap().unwrap();
    assert_eq!(record.meta["name"], "my-app");
}

#[test]
fn test_template_renders_with_record_meta() {
    let renderer = MiniJinjaRenderer::new();
    let context = serde_json::json!({ "greeting": "Hello" });
    let mut stage = Template::new(&renderer, context);

    let mut input = record("/src", "readme.md", b"{{ greeting }}, {{ name }}!");
    input
        .meta
        .insert("name".to_string(), serde_json::Value::String("my-app".to_string()));

    let output = stage.process(input).unwrap().unwrap();
    assert_eq!(output.contents, b"Hello, my-app!");
}

#[test]
fn test_template_passes_binary_through() {
    let renderer = MiniJinjaRenderer::new();
    let mut stage = Template::new(&renderer, serde_json::json!({}));

    let contents = vec![0xff, 0xfe, 0x00, 0x7b, 0x7b];
    let output = stage.process(record("/src", "blob.bin", &contents)).unwrap().unwrap();

    assert_eq!(output.contents, contents);
}

#[test]
fn test_packages_merges_dependencies() {
    let mut patch = serde_json::Map::new();
    patch.insert(
        "dependencies".to_string(),
        serde_json::json!({ "left-pad": "^1.3.0" }),
    );
    let mut stage = Packages::new(patch);

    let manifest = br#"{"name": "app", "dependencies": {"express": "^4.0.0"}}"#;
    let output = stage.process(record("/src", "package.json", manifest)).unwrap().unwrap();

    let parsed: serde_json::Value = serde_json::from_slice(&output.contents).unwrap();
    assert_eq!(parsed["dependencies"]["express"], "^4.0.0");
    assert_eq!(parsed["dependencies"]["left-pad"], "^1.3.0");
    assert_eq!(parsed["name"], "app");

    // Non-manifest records pass through untouched.
    let untouched = stage.process(record("/src", "index.js", b"code")).unwrap().unwrap();
    assert_eq!(untouched.contents, b"code");
}

#[test]
fn test_modify_rewrites_contents() {
    let mut stage = Modify::new(|mut record: FileRecord| {
        record.contents = record.contents.to_ascii_uppercase();
        Ok(Some(record))
    });

    let output = stage.process(record("/src", "a.txt", b"abc")).unwrap().unwrap();
    assert_eq!(output.contents, b"ABC");
}

#[test]
fn test_dest_writes_and_rebases() {
    let temp_dir = TempDir::new().unwrap();
    let out_root = temp_dir.path().join("out");

    let mut stage = Dest::new(&out_root, None);
    let output = stage
        .process(record("/src", "nested/dir/file.txt", b"content"))
        .unwrap()
        .unwrap();

    assert_eq!(output.base, out_root);
    assert_eq!(output.path, out_root.join("nested/dir/file.txt"));
    assert_eq!(fs::read(&output.path).unwrap(), b"content");
}

#[test]
fn test_dest_folder_resolves_under_destination() {
    let temp_dir = TempDir::new().unwrap();

    let mut stage = Dest::new(temp_dir.path(), Some("packages/core"));
    let output = stage.process(record("/src", "lib.rs", b"x")).unwrap().unwrap();

    assert_eq!(output.path, temp_dir.path().join("packages/core/lib.rs"));
    assert!(output.path.exists());
}

#[test]
fn test_dest_overwrites_existing() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("file.txt");
    fs::write(&target, "old").unwrap();

    let mut stage = Dest::new(temp_dir.path(), None);
    stage.process(record("/src", "file.txt", b"new")).unwrap();

    assert_eq!(fs::read(&target).unwrap(), b"new");
}

#[test]
fn test_pipeline_drives_records_through_stages() {
    let source_dir = TempDir::new().unwrap();
    let dest_dir = TempDir::new().unwrap();
    fs::write(source_dir.path().join("keep.txt"), "keep").unwrap();
    fs::write(source_dir.path().join("drop.tmp"), "drop").unwrap();

    let stream = FileStream::expand(["**/*"], source_dir.path(), &[]).unwrap();
    let stages: Vec<Box<dyn Stage>> = vec![
        Box::new(Modify::new(|record: FileRecord| {
            // Drop temporary files, keep everything else.
            if record.path.extension().is_some_and(|ext| ext == "tmp") {
                Ok(None)
            } else {
                Ok(Some(record))
            }
        })),
        Box::new(Dest::new(dest_dir.path(), None)),
    ];

    pipeline(stream, stages).unwrap();

    assert!(dest_dir.path().join("keep.txt").exists());
    assert!(!dest_dir.path().join("drop.tmp").exists());
}

#[test]
fn test_pipeline_aborts_on_first_error_keeping_written_files() {
    let source_dir = TempDir::new().unwrap();
    let dest_dir = TempDir::new().unwrap();
    fs::write(source_dir.path().join("first.txt"), "one").unwrap();
    fs::write(source_dir.path().join("second.txt"), "two").unwrap();

    // Literal patterns pin the processing order.
    let stream =
        FileStream::expand(["first.txt", "second.txt"], source_dir.path(), &[]).unwrap();
    let stages: Vec<Box<dyn Stage>> = vec![
        Box::new(Modify::new(|record: FileRecord| {
            if record.path.ends_with("second.txt") {
                Err(Error::PipelineError("stage failure".to_string()))
            } else {
                Ok(Some(record))
            }
        })),
        Box::new(Dest::new(dest_dir.path(), None)),
    ];

    assert!(pipeline(stream, stages).is_err());

    // The file written before the failure stays in place.
    assert!(dest_dir.path().join("first.txt").exists());
    assert!(!dest_dir.path().join("second.txt").exists());
}

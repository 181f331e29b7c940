//! Test: the bundle step on a real project directory

use crate::helpers::*;
use pallet::bundle::{BundleConfig, BundleError, Bundler};
use std::path::PathBuf;

const ASSET: &str = "pallet_bg.319936f5.wasm";

const LOADER_CONFIG: &str = r#"
name: "www"
entry: "bootstrap.js"
output:
  path: "dist"
  filename: "bootstrap.js"
copy:
  - from: "index.html"
"#;

const NATIVE_CONFIG: &str = r#"
name: "www"
mode: production
entry: "bootstrap.js"
output:
  path: "dist"
  filename: "bootstrap.js"
wasm:
  strategy: native-async
copy:
  - from: "index.html"
"#;

#[test]
fn test_bundle_emits_script_assets_and_html() {
    let project = Project::new();
    let report = project.bundle(LOADER_CONFIG).unwrap();

    assert_eq!(report.output_dir, project.path("dist"));
    assert_eq!(report.assets, vec![ASSET.to_string()]);
    assert_eq!(report.copied, vec![PathBuf::from("index.html")]);

    let files = read_tree(&report.output_dir);
    let names: Vec<_> = files.keys().map(|p| p.to_string_lossy().to_string()).collect();
    assert_eq!(names, vec!["bootstrap.js", "index.html", ASSET]);

    assert_eq!(files[&PathBuf::from("index.html")], INDEX_HTML.as_bytes());
    assert_eq!(files[&PathBuf::from(ASSET)], WASM_BYTES);

    let script = String::from_utf8(files[&PathBuf::from("bootstrap.js")].clone()).unwrap();
    assert!(script.starts_with("/* www: entry bootstrap.js, mode development */\n"));
    assert!(script.contains(&format!("const engine = __pallet_load_wasm(\"{}\");", ASSET)));
    assert!(script.contains("// load the engine"));
}

#[test]
fn test_bundle_is_deterministic() {
    let project = Project::new();

    let first = project.bundle(LOADER_CONFIG).unwrap();
    let first_tree = read_tree(&first.output_dir);
    let second = project.bundle(LOADER_CONFIG).unwrap();
    let second_tree = read_tree(&second.output_dir);

    assert_eq!(first, second);
    assert_eq!(first_tree, second_tree);
}

#[test]
fn test_native_production_bundle() {
    let project = Project::new();
    let report = project.bundle(NATIVE_CONFIG).unwrap();

    let script = std::fs::read_to_string(&report.script).unwrap();
    assert_eq!(
        script,
        format!(
            "import * as engine from \"./{}\";\nengine.then((e) => console.log(e));\n",
            ASSET
        )
    );
    assert!(project.path("dist").join(ASSET).is_file());
}

#[test]
fn test_missing_entry_writes_nothing() {
    let project = Project::new();
    std::fs::remove_file(project.path("bootstrap.js")).unwrap();

    let err = project.bundle(LOADER_CONFIG).unwrap_err();
    assert!(matches!(err, BundleError::EntryNotFound(_)), "{}", err);
    assert!(!project.path("dist").exists());
    assert!(!project.path(".dist.staging").exists());
}

#[test]
fn test_missing_copy_source_keeps_previous_output() {
    let project = Project::new();
    project.bundle(LOADER_CONFIG).unwrap();
    let before = read_tree(&project.path("dist"));

    std::fs::remove_file(project.path("index.html")).unwrap();
    let err = project.bundle(LOADER_CONFIG).unwrap_err();

    assert!(matches!(err, BundleError::CopySourceNotFound(ref from) if from == "index.html"));
    assert_eq!(read_tree(&project.path("dist")), before);
    assert!(!project.path(".dist.staging").exists());
}

#[test]
fn test_missing_wasm_module() {
    let project = Project::new();
    project.write(
        "bootstrap.js",
        "import init from \"./pkg/missing.wasm\";\ninit();\n",
    );

    let err = project.bundle(LOADER_CONFIG).unwrap_err();
    match err {
        BundleError::WasmNotFound { spec, .. } => assert_eq!(spec, "./pkg/missing.wasm"),
        other => panic!("unexpected error: {}", other),
    }
    assert!(!project.path("dist").exists());
}

#[test]
fn test_output_at_project_root_is_rejected() {
    let project = Project::new();
    let yaml = LOADER_CONFIG.replace("path: \"dist\"", "path: \".\"");
    assert!(BundleConfig::from_yaml(&yaml).is_err());

    // A config built in code skips validation, so the bundle step checks too
    let mut config = BundleConfig::from_yaml(LOADER_CONFIG).unwrap();
    config.output.path = PathBuf::from(".");
    let err = Bundler::new(project.root()).bundle(&config).unwrap_err();

    assert!(matches!(err, BundleError::OutputOverlapsSources(_)), "{}", err);
    assert!(project.path("bootstrap.js").is_file());
    assert!(project.path("index.html").is_file());
    assert!(project.path("pkg/pallet_bg.wasm").is_file());
}

#[test]
fn test_output_over_wasm_sources_is_rejected() {
    let project = Project::new();
    let yaml = LOADER_CONFIG.replace("path: \"dist\"", "path: \"pkg\"");

    let err = project.bundle(&yaml).unwrap_err();
    assert!(matches!(err, BundleError::OutputOverlapsSources(_)), "{}", err);
    assert_eq!(
        std::fs::read(project.path("pkg/pallet_bg.wasm")).unwrap(),
        WASM_BYTES
    );
    assert!(!project.path(".pkg.staging").exists());
}

#[test]
fn test_default_plus_named_import_in_loader_mode() {
    let project = Project::new();
    project.write(
        "bootstrap.js",
        "import init, { greet } from \"./pkg/pallet_bg.wasm\";\ninit().then(() => greet());\n",
    );

    let err = project.bundle(LOADER_CONFIG).unwrap_err();
    assert!(
        matches!(err, BundleError::UnsupportedImport(ref spec) if spec == "./pkg/pallet_bg.wasm"),
        "{}",
        err
    );
    assert!(!project.path("dist").exists());

    let report = project.bundle(NATIVE_CONFIG).unwrap();
    let script = std::fs::read_to_string(&report.script).unwrap();
    assert!(script.starts_with(&format!("import init, {{ greet }} from \"./{}\";\n", ASSET)));
}

#[test]
fn test_unrecognized_wasm_import_is_not_skipped() {
    let project = Project::new();
    project.write(
        "bootstrap.js",
        "import \"./pkg/pallet_bg.wasm\";\nconsole.log(\"loaded\");\n",
    );

    let err = project.bundle(NATIVE_CONFIG).unwrap_err();
    assert!(matches!(err, BundleError::UnrecognizedImport(_)), "{}", err);
    assert!(!project.path("dist").exists());
}

#[test]
fn test_glob_copy_into_subdirectory() {
    let project = Project::new();
    project.write("static/b.css", "body { margin: 0; }\n");
    project.write("static/a.css", "pre { font-family: monospace; }\n");

    let yaml = r#"
entry: "bootstrap.js"
copy:
  - from: "index.html"
  - from: "static/*.css"
    to: "css"
"#;
    let report = project.bundle(yaml).unwrap();

    assert_eq!(
        report.copied,
        vec![
            PathBuf::from("index.html"),
            PathBuf::from("css/a.css"),
            PathBuf::from("css/b.css"),
        ]
    );
    assert_eq!(
        std::fs::read_to_string(project.path("dist/css/a.css")).unwrap(),
        "pre { font-family: monospace; }\n"
    );
}

#[test]
fn test_composed_descriptor_matches_config() {
    let config = pallet::bundle::BundleConfig::from_yaml(LOADER_CONFIG).unwrap();
    let descriptor = config.to_descriptor();

    assert_eq!(descriptor["entry"], "bootstrap.js");
    assert_eq!(descriptor["module"]["rules"][0]["test"], r"\.wasm$");
    assert_eq!(descriptor["plugins"][0]["patterns"][0]["to"], ".");
    assert!(descriptor.get("experiments").is_none());
}

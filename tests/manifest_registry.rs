//! Tests for running bridged tests registered in a manifest

use scriptbridge_rs::{
    bridge, run_registered, Config, DirStore, Error, OutputStream, Registry, RunParams,
};
use std::fs;
use tempfile::TempDir;

fn write_assets(dir: &std::path::Path) {
    fs::create_dir_all(dir.join("scripts")).unwrap();
    fs::create_dir_all(dir.join("fixtures")).unwrap();
    fs::write(
        dir.join("scripts/count.sh"),
        "n=$(wc -l < data/lines.txt | tr -d ' ')\n\
         if [ \"$n\" = \"3\" ]; then f=0; else f=1; fi\n\
         echo \"1 tests, 1 assertions, $f failures, 0 errors\"\n",
    )
    .unwrap();
    fs::write(dir.join("fixtures/lines.txt"), "one\ntwo\nthree\n").unwrap();
}

#[cfg(unix)]
#[test]
fn test_manifest_registered_test_runs() {
    let assets = TempDir::new().unwrap();
    write_assets(assets.path());
    let root = TempDir::new().unwrap();

    let manifest_path = assets.path().join("bridge.manifest");
    fs::write(
        &manifest_path,
        r#"# Bridged shell tests
[count_lines]
origin assets
test scripts/count.sh testCount
support fixtures/lines.txt data/lines.txt

[broken]
test scripts/count.sh one
test scripts/count.sh two
"#,
    )
    .unwrap();

    let registry = Registry::load(&manifest_path).unwrap();
    let config = Config::new()
        .interpreter("sh")
        .sandbox_root(root.path())
        .success_stream(OutputStream::None);

    let result = bridge::test("count_lines")
        .registered(&registry)
        .store(DirStore::new().origin("assets", assets.path()))
        .config(config.clone())
        .execute()
        .unwrap();
    assert!(result.success(), "{}", result.raw_message());

    let params = RunParams::new()
        .config(config)
        .store(DirStore::new().origin("assets", assets.path()))
        .default_origin("assets");
    assert!(matches!(
        run_registered(&registry, "broken", &params),
        Err(Error::Configuration { .. })
    ));
    assert!(matches!(
        run_registered(&registry, "not_registered", &params),
        Err(Error::MissingDescriptor { .. })
    ));
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn test_config_from_settings_table() {
    let settings =
        "ShowBrowserWindow=true\nFailureStream=Error\nDeleteTempFilesWhenFinished=nope\n";
    let config = Config::from_pairs(settings.lines().filter_map(|line| line.split_once('=')));

    assert!(config.show_browser_window);
    assert_eq!(config.failure_stream, OutputStream::Error);
    assert!(config.delete_temp_files_when_finished);
}

#[test]
fn test_manifest_error_names_file_and_line() {
    let dir = TempDir::new().unwrap();
    let manifest_path = dir.path().join("broken.manifest");
    fs::write(&manifest_path, "[ok]\ntest a.sh t\nsupport only-one-arg\n").unwrap();

    let err = Registry::load(&manifest_path).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("broken.manifest"));
    assert!(msg.contains("line 3"));
    assert!(msg.contains("support only-one-arg"));
}

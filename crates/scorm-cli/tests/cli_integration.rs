//! End-to-end runs of the `scorm` binary

use std::io::{Cursor, Write};
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="fire-safety"
          xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2"
          xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2">
  <organizations default="org">
    <organization identifier="org">
      <title>Fire Safety</title>
      <item identifier="item-1" identifierref="sco-1"><title>Extinguishers</title></item>
    </organization>
  </organizations>
  <resources>
    <resource identifier="sco-1" type="webcontent" href="player/start.html" adlcp:scormType="sco"/>
    <resource identifier="shell" type="webcontent" href="vendor/launch.html"/>
  </resources>
</manifest>"#;

fn write_course(dir: &Path) -> std::path::PathBuf {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in [
        ("imsmanifest.xml", MANIFEST),
        ("player/start.html", "<html>start</html>"),
        ("vendor/launch.html", "<html>vendor</html>"),
    ] {
        writer.start_file(name, options).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    let bytes = writer.finish().unwrap().into_inner();

    let path = dir.join("course.zip");
    std::fs::write(&path, bytes).unwrap();
    path
}

fn scorm(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scorm"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn inspect_archive_as_json() {
    let temp = TempDir::new().unwrap();
    let course = write_course(temp.path());

    let output = scorm(temp.path(), &["inspect", course.to_str().unwrap(), "--json"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["manifest"]["identifier"], "fire-safety");
    assert_eq!(value["starting_resource"], "sco-1");
    assert_eq!(value["files"].as_array().unwrap().len(), 3);
}

#[test]
fn configured_launcher_fragment_changes_the_start() {
    let temp = TempDir::new().unwrap();
    let course = write_course(temp.path());
    std::fs::write(
        temp.path().join("scorm.toml"),
        "[launch]\nlauncher-fragments = [\"vendor/launch.html\"]\n",
    )
    .unwrap();

    let output = scorm(temp.path(), &["launch", course.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Resource: shell"));
    assert!(stdout.contains("File: vendor/launch.html (19 bytes)"));
    assert!(stdout.contains("URL: blob:scorm/"));
}

#[test]
fn invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    let course = write_course(temp.path());
    std::fs::write(temp.path().join("scorm.toml"), "[unknown]\n").unwrap();

    let output = scorm(temp.path(), &["inspect", course.to_str().unwrap()]);
    assert!(!output.status.success());
}

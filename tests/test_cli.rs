
use fixtures::*;

use assert_cmd::Command;
use modsettings::{PropertyTree, SettingsFile};
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

fn modsettings_dump() -> Command {
    Command::new(assert_cmd::cargo_bin!("modsettings_dump"))
}

#[test]
fn it_decodes_to_stdout() {
    let sample = regular_sample();

    let mut cmd = modsettings_dump();
    cmd.args(["decode", "--no-indent", sample.to_str().unwrap()]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json = String::from_utf8(output.stdout).unwrap();
    let tree = PropertyTree::from_json_str(json.trim()).unwrap();
    assert_eq!(&tree, SettingsFile::from_path(&sample).unwrap().tree());
}

#[test]
fn it_shows_the_binary_version() {
    let mut cmd = modsettings_dump();
    cmd.args([
        "decode",
        "--show-version",
        legacy_sample().to_str().unwrap(),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("Binary version 0.16.51.0\n"));
}

#[test]
fn it_respects_directory_output() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("test.out");

    let mut cmd = modsettings_dump();
    cmd.args([
        "decode",
        "-f",
        &f.to_string_lossy(),
        regular_sample().to_str().unwrap(),
    ]);

    assert!(
        cmd.output().unwrap().stdout.is_empty(),
        "Expected output to be printed to file, but was printed to stdout"
    );
    assert!(
        !fs::read(&f).unwrap().is_empty(),
        "Expected output to be printed to file"
    )
}

#[test]
fn test_it_refuses_to_overwrite_directory() {
    let d = tempdir().unwrap();

    let mut cmd = modsettings_dump();
    cmd.args([
        "decode",
        "-f",
        &d.path().to_string_lossy(),
        regular_sample().to_str().unwrap(),
    ]);

    cmd.assert().failure().code(1);
}

#[test]
fn test_it_overwrites_file_anyways_if_passed_flag() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("test.out");

    let mut file = File::create(&f).unwrap();
    file.write_all(b"I'm a file!").unwrap();

    let mut cmd = modsettings_dump();
    cmd.args([
        "decode",
        "-f",
        &f.to_string_lossy(),
        "--no-confirm-overwrite",
        regular_sample().to_str().unwrap(),
    ]);

    cmd.assert().success();

    let written = fs::read_to_string(&f).unwrap();
    assert!(written.contains("bobs-ores-enabled"));
}

#[test]
fn it_supports_stdin_input_with_dash() {
    let mut cmd = modsettings_dump();
    cmd.args(["decode", "--no-indent", "-"])
        .write_stdin(read_sample(legacy_sample()));

    cmd.assert().success().stdout(predicate::str::contains(
        r#""show-hints":{"value":true}"#,
    ));
}

#[test]
fn it_encodes_decoded_output_back_to_the_same_bytes() {
    let d = tempdir().unwrap();
    let json = d.as_ref().join("settings.json");
    let dat = d.as_ref().join("out").join("mod-settings.dat");

    modsettings_dump()
        .args([
            "decode",
            "-f",
            &json.to_string_lossy(),
            regular_sample().to_str().unwrap(),
        ])
        .assert()
        .success();

    modsettings_dump()
        .args([
            "encode",
            "--binary-version",
            "0.17.42.4",
            "-f",
            &dat.to_string_lossy(),
            json.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_eq!(fs::read(&dat).unwrap(), read_sample(regular_sample()));
}

#[test]
fn it_encodes_with_the_version_resolved_for_a_game_release() {
    let d = tempdir().unwrap();
    let dat = d.as_ref().join("mod-settings.dat");

    let mut cmd = modsettings_dump();
    cmd.args([
        "encode",
        "--game-version",
        "0.16",
        "-f",
        &dat.to_string_lossy(),
        "-",
    ])
    .write_stdin(r#"{"startup":{}}"#);

    cmd.assert().success();

    let file = SettingsFile::from_path(&dat).unwrap();
    assert_eq!(file.version().to_string(), "0.16.51.0");
}

#[test]
fn it_refuses_to_encode_unsupported_versions() {
    let d = tempdir().unwrap();
    let dat = d.as_ref().join("mod-settings.dat");

    let mut cmd = modsettings_dump();
    cmd.args([
        "encode",
        "--binary-version",
        "0.15.40.0",
        "-f",
        &dat.to_string_lossy(),
        "-",
    ])
    .write_stdin("null");

    cmd.assert().failure().code(1);
    assert!(!dat.exists());
}

#[test]
fn it_fails_on_invalid_json_without_creating_output() {
    let d = tempdir().unwrap();
    let dat = d.as_ref().join("mod-settings.dat");

    let mut cmd = modsettings_dump();
    cmd.args(["encode", "-f", &dat.to_string_lossy(), "-"])
        .write_stdin(r#"{"too-big": 4294967296}"#);

    cmd.assert().failure().code(1);
    assert!(!dat.exists());
}

#[test]
fn it_fails_on_corrupt_input() {
    let mut cmd = modsettings_dump();
    cmd.args(["decode", truncated_sample().to_str().unwrap()]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to read settings file"));
}

#[test]
fn it_exports_and_applies_templates() {
    let d = tempdir().unwrap();
    let template = d.as_ref().join("template.json");
    let dat = d.as_ref().join("mod-settings.dat");

    modsettings_dump()
        .args([
            "export-template",
            "-f",
            &template.to_string_lossy(),
            regular_sample().to_str().unwrap(),
        ])
        .assert()
        .success();

    let exported = fs::read_to_string(&template).unwrap();
    assert!(exported.contains(r#""runtime-per-user""#));

    modsettings_dump()
        .args([
            "apply-template",
            template.to_str().unwrap(),
            legacy_sample().to_str().unwrap(),
            "-f",
            &dat.to_string_lossy(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Applied 2 of 7 template settings"));

    let file = SettingsFile::from_path(&dat).unwrap();
    assert_eq!(file.version().to_string(), "0.16.51.0");
    assert_eq!(
        file.tree()
            .get("startup")
            .and_then(|g| g.get("ore-richness"))
            .and_then(|e| e.get("value")),
        Some(&PropertyTree::Double(1.5))
    );
}

#[test]
fn it_refuses_to_read_template_and_settings_from_stdin() {
    let d = tempdir().unwrap();
    let dat = d.as_ref().join("mod-settings.dat");

    let mut cmd = modsettings_dump();
    cmd.args(["apply-template", "-", "-", "-f", &dat.to_string_lossy()])
        .write_stdin(r#"{"startup":{}}"#);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot both be read from stdin"));
    assert!(!dat.exists());
}

#[test]
fn it_resolves_write_versions() {
    for (game_version, expected) in [
        ("0.16", "0.16.51.0\n"),
        ("0.17.79", "0.17.42.4\n"),
        ("1.1", "0.17.9.1\n"),
    ] {
        modsettings_dump()
            .args(["resolve-version", game_version])
            .assert()
            .success()
            .stdout(expected);
    }
}

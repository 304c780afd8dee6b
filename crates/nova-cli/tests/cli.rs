use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn nova() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("nova"))
}

fn write_unit(dir: &Path, name: &str, json: &str) {
    fs::write(dir.join(format!("{name}.json")), json).unwrap();
}

#[test]
fn help_mentions_driver_flags() {
    nova()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--sources"))
        .stdout(predicate::str::contains("--classpath"))
        .stdout(predicate::str::contains("--out"));
}

#[test]
fn compiles_a_single_class_with_no_supertype() {
    let sources = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_unit(
        sources.path(),
        "Plain",
        r#"{
            "package": "pkg",
            "imports": [],
            "types": [
                {
                    "name": "Plain",
                    "kind": "Class",
                    "modifiers": ["Public"],
                    "type_parameters": [],
                    "superclass": null,
                    "interfaces": [],
                    "fields": [],
                    "methods": [],
                    "nested": [],
                    "annotations": [],
                    "line": 1,
                    "column": 1
                }
            ],
            "module": null
        }"#,
    );

    nova()
        .arg("--sources")
        .arg(sources.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success();

    assert!(out.path().join("pkg/Plain.class").is_file());
}

#[test]
fn unresolvable_supertype_fails_with_diagnostic_and_writes_nothing() {
    let sources = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_unit(
        sources.path(),
        "Broken",
        r#"{
            "package": "pkg",
            "imports": [],
            "types": [
                {
                    "name": "Broken",
                    "kind": "Class",
                    "modifiers": ["Public"],
                    "type_parameters": [],
                    "superclass": {
                        "Named": { "segments": ["NoSuchClass"], "type_arguments": [] }
                    },
                    "interfaces": [],
                    "fields": [],
                    "methods": [],
                    "nested": [],
                    "annotations": [],
                    "line": 3,
                    "column": 5
                }
            ],
            "module": null
        }"#,
    );

    nova()
        .arg("--sources")
        .arg(sources.path())
        .arg("--out")
        .arg(out.path())
        .arg("--format")
        .arg("json")
        .assert()
        .failure()
        .code(1);

    assert!(!out.path().join("pkg/Broken.class").exists());
}

#[test]
fn two_units_with_a_real_supertype_link_against_each_other() {
    let sources = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_unit(
        sources.path(),
        "Base",
        r#"{
            "package": "pkg",
            "imports": [],
            "types": [
                {
                    "name": "Base",
                    "kind": "Class",
                    "modifiers": ["Public"],
                    "type_parameters": [],
                    "superclass": null,
                    "interfaces": [],
                    "fields": [],
                    "methods": [],
                    "nested": [],
                    "annotations": [],
                    "line": 1,
                    "column": 1
                }
            ],
            "module": null
        }"#,
    );
    write_unit(
        sources.path(),
        "Derived",
        r#"{
            "package": "pkg",
            "imports": [],
            "types": [
                {
                    "name": "Derived",
                    "kind": "Class",
                    "modifiers": ["Public"],
                    "type_parameters": [],
                    "superclass": {
                        "Named": { "segments": ["Base"], "type_arguments": [] }
                    },
                    "interfaces": [],
                    "fields": [],
                    "methods": [],
                    "nested": [],
                    "annotations": [],
                    "line": 1,
                    "column": 1
                }
            ],
            "module": null
        }"#,
    );

    nova()
        .arg("--sources")
        .arg(sources.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success();

    assert!(out.path().join("pkg/Base.class").is_file());
    assert!(out.path().join("pkg/Derived.class").is_file());
}

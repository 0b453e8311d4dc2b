//! CLI smoke tests over the built binary.

mod common;

use assert_cmd::Command;
use common::{DEFLATED, STORED, build_zip, write_zip};
use predicates::prelude::*;

fn zipsearch() -> Command {
    Command::cargo_bin("zipsearch").unwrap()
}

#[test]
fn searching_prints_matches_and_report() {
    let zip = build_zip(&[
        ("readme.txt", b"plain intro\nthe marker line\n" as &[u8], DEFLATED),
        ("other.txt", b"nothing here\n", STORED),
    ]);
    let file = write_zip(&zip);

    zipsearch()
        .arg(file.path())
        .arg("marker")
        .assert()
        .success()
        .stdout(predicate::str::contains("- readme.txt:"))
        .stdout(predicate::str::contains("Line 2: the marker line"))
        .stdout(predicate::str::contains("Search Report"))
        .stdout(predicate::str::contains("Entries scanned: 2"))
        .stdout(predicate::str::contains("Entries matched: 1"));
}

#[test]
fn quiet_mode_suppresses_the_report() {
    let zip = build_zip(&[("a.txt", b"hit me\n" as &[u8], STORED)]);
    let file = write_zip(&zip);

    zipsearch()
        .arg("-q")
        .arg(file.path())
        .arg("hit")
        .assert()
        .success()
        .stdout(predicate::str::contains("Line 1: hit me"))
        .stdout(predicate::str::contains("Search Report").not());
}

#[test]
fn very_quiet_mode_is_machine_readable() {
    let zip = build_zip(&[("a.txt", b"first\nsecond hit\n" as &[u8], DEFLATED)]);
    let file = write_zip(&zip);

    zipsearch()
        .arg("-qq")
        .arg(file.path())
        .arg("hit")
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt:2:second hit"));
}

#[test]
fn list_mode_prints_entry_names_only() {
    let zip = build_zip(&[
        ("one.txt", b"alpha\n" as &[u8], STORED),
        ("two.txt", b"beta\n", DEFLATED),
    ]);
    let file = write_zip(&zip);

    zipsearch()
        .arg("-l")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("one.txt"))
        .stdout(predicate::str::contains("two.txt"))
        .stdout(predicate::str::contains("alpha").not());
}

#[test]
fn blank_search_text_fails() {
    let zip = build_zip(&[("a.txt", b"data\n" as &[u8], STORED)]);
    let file = write_zip(&zip);

    zipsearch()
        .arg(file.path())
        .arg("   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn missing_archive_fails_cleanly() {
    zipsearch()
        .arg("/no/such/file.zip")
        .arg("needle")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn no_matches_reports_success() {
    let zip = build_zip(&[("a.txt", b"quiet file\n" as &[u8], DEFLATED)]);
    let file = write_zip(&zip);

    zipsearch()
        .arg(file.path())
        .arg("absent")
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches found."))
        .stdout(predicate::str::contains("Entries matched: 0"));
}

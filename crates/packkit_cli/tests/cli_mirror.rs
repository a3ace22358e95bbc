//! End-to-end checks of the `packkit` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_text(path: &Path, txt: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, txt).expect("write text");
}

fn packkit() -> Command {
    let mut cmd: Command = cargo_bin_cmd!("packkit");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn mirror_applies_masks_in_order() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_text(&src.join("x.tmp"), "x");
    write_text(&src.join("y.log"), "y");
    write_text(&src.join("cache/z.dat"), "z");

    packkit()
        .arg("-s")
        .arg(&src)
        .arg("-d")
        .arg(&dst)
        .args(["--exclude", "*.tmp", "--exclude-dir", "cache", "--include", "*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("copied=1"))
        .stderr(predicate::str::contains("COPY"));

    assert!(dst.join("y.log").exists());
    assert!(!dst.join("x.tmp").exists());
    assert!(!dst.join("cache").exists());
}

#[test]
fn mirror_rerun_reports_skip() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_text(&src.join("a.txt"), "0123456789");

    packkit().arg("-s").arg(&src).arg("-d").arg(&dst).assert().success();
    packkit()
        .arg("-s")
        .arg(&src)
        .arg("-d")
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::contains("copied=0"))
        .stdout(predicate::str::contains("skipped=1"))
        .stderr(predicate::str::contains("SKIP"));
}

#[test]
fn mirror_missing_source_fails() {
    let tmp = TempDir::new().expect("tempdir");

    packkit()
        .arg("-s")
        .arg(tmp.path().join("absent"))
        .arg("-d")
        .arg(tmp.path().join("dst"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    assert!(!tmp.path().join("dst").exists());
}

#[test]
fn mirror_ask_refused_copies_nothing() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_text(&src.join("a.txt"), "a");

    packkit()
        .arg("-s")
        .arg(&src)
        .arg("-d")
        .arg(&dst)
        .arg("--ask")
        .write_stdin("maybe\nn\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Please answer"))
        .stderr(predicate::str::contains("aborted"));

    assert!(!dst.exists());
}

#[test]
fn mirror_ask_accepted_copies() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_text(&src.join("a.txt"), "a");

    packkit()
        .arg("-s")
        .arg(&src)
        .arg("-d")
        .arg(&dst)
        .arg("--ask")
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(INCLUDE, *)"));

    assert!(dst.join("a.txt").exists());
}

#[test]
fn mirror_no_recurse_stays_at_top_level() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_text(&src.join("top.txt"), "t");
    write_text(&src.join("sub/deep.txt"), "d");

    packkit()
        .arg("-s")
        .arg(&src)
        .arg("-d")
        .arg(&dst)
        .arg("--no-recurse")
        .assert()
        .success();

    assert!(dst.join("top.txt").exists());
    assert!(!dst.join("sub").exists());
}

#[test]
fn mirror_without_create_dirs_fails_on_missing_destination() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    write_text(&src.join("a.txt"), "a");

    packkit()
        .arg("-s")
        .arg(&src)
        .arg("-d")
        .arg(&dst)
        .arg("--no-create-dirs")
        .assert()
        .failure()
        .stdout(predicate::str::contains("errors=1"));

    assert!(!dst.exists());
}

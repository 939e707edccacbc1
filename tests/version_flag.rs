use assert_cmd::Command;
use predicates::prelude::*;

fn rtv() -> Command {
    let mut cmd = Command::cargo_bin("rtv").expect("rtv binary");
    cmd.env_remove("RTV_LOG");
    cmd
}

#[test]
fn prints_version() {
    rtv()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn prints_help() {
    rtv()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rtv").and(predicate::str::contains("--version")))
        .stdout(predicate::str::contains("--subreddit"));
}

#[test]
fn rejects_unknown_arguments() {
    rtv()
        .arg("--bogus")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn flag_without_value_is_an_error() {
    rtv()
        .arg("-n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("-n requires a value"));
}

#[test]
fn non_numeric_count_is_an_error() {
    rtv()
        .args(["--count", "many"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expects a number"));
}

#[test]
fn invalid_order_fails_before_fetching() {
    rtv()
        .args(["--config", "/nonexistent/rtv.yaml", "-s", "python/best"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unrecognized order \"best\""));
}

use assert_cmd::Command;
use std::path::Path;

fn glosa(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("glosa").unwrap();
    // Keep config and state inside the test sandbox.
    cmd.env("HOME", home);
    cmd.arg("--db").arg(home.join("glosa.db"));
    cmd
}

fn stdout_of(output: std::process::Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn drill_round_trip_via_cli() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path();

    let out = stdout_of(glosa(home).args(["add-list", "animals"]).output().unwrap());
    assert!(out.contains("Created list 1"), "unexpected output: {out}");

    stdout_of(
        glosa(home)
            .args(["add-word", "1", "dog", "hund"])
            .output()
            .unwrap(),
    );

    // One word in the pool, so every question asks for "hund".
    let out = stdout_of(
        glosa(home)
            .args(["quiz", "-n", "3", "-d", "source-to-target", "--lists", "1"])
            .write_stdin("hund\nHund!\nfel\n")
            .output()
            .unwrap(),
    );
    assert!(out.contains("Score: 2/3"), "unexpected output: {out}");

    let out = stdout_of(glosa(home).arg("hardest").output().unwrap());
    assert!(out.contains("dog"), "unexpected output: {out}");
    assert!(out.contains("1 wrong"), "unexpected output: {out}");

    let out = stdout_of(glosa(home).arg("stats").output().unwrap());
    assert!(out.contains("Quizzes: 1"), "unexpected output: {out}");

    let out = stdout_of(glosa(home).arg("streaks").output().unwrap());
    assert!(out.contains("Current streak: 1"), "unexpected output: {out}");
}

#[test]
fn starter_pack_seeds_a_usable_list() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path();

    let out = stdout_of(glosa(home).args(["init-starter", "swedish"]).output().unwrap());
    assert!(out.contains("swedish"), "unexpected output: {out}");

    let out = stdout_of(glosa(home).arg("lists").output().unwrap());
    assert!(out.contains("swedish"), "unexpected output: {out}");
    assert!(out.contains("16 words"), "unexpected output: {out}");
}

#[test]
fn unknown_starter_pack_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let output = glosa(tmp.path())
        .args(["init-starter", "klingon"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn quiz_with_no_words_is_not_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let out = stdout_of(glosa(tmp.path()).args(["quiz", "-n", "5"]).output().unwrap());
    assert!(out.contains("No words available"), "unexpected output: {out}");
}

#[test]
fn deleting_a_list_removes_its_words() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path();

    stdout_of(glosa(home).args(["add-list", "animals"]).output().unwrap());
    stdout_of(
        glosa(home)
            .args(["add-word", "1", "dog", "hund"])
            .output()
            .unwrap(),
    );
    stdout_of(glosa(home).args(["delete-list", "1"]).output().unwrap());

    let out = stdout_of(glosa(home).arg("stats").output().unwrap());
    assert!(out.contains("Words: 0"), "unexpected output: {out}");
}

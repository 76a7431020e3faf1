use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use nostr::Keys;
use nostr::nips::{nip04, nip44};
use predicates::prelude::*;
use serde_json::json;

/// Run dmresolve inside `dir` with the identity at `dir/identity.txt`.
fn dmresolve(dir: &assert_fs::TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("dmresolve");
    cmd.current_dir(dir.path())
        .env_remove("DMRESOLVE_KEY")
        .env("NO_COLOR", "1")
        .arg("--key")
        .arg(dir.path().join("identity.txt"));
    cmd
}

/// Write a known identity and return its keys.
fn install_identity(dir: &assert_fs::TempDir) -> Keys {
    let keys = Keys::generate();
    dir.child("identity.txt")
        .write_str(&format!("{}\n", keys.secret_key().to_secret_hex()))
        .unwrap();
    keys
}

/// Kind 4 event from `from` to `to`, encrypted with NIP-04.
fn legacy_dm_json(from: &Keys, to: &Keys, message: &str) -> String {
    let content = nip04::encrypt(from.secret_key(), &to.public_key(), message).unwrap();
    json!({
        "id": "cafe01",
        "pubkey": from.public_key().to_hex(),
        "created_at": 1_700_000_000u64,
        "kind": 4,
        "tags": [["p", to.public_key().to_hex()]],
        "content": content,
    })
    .to_string()
}

#[test]
fn init_creates_config() {
    let dir = assert_fs::TempDir::new().unwrap();

    dmresolve(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated config.toml"));

    let config = std::fs::read_to_string(dir.path().join(".dmresolve/config.toml")).unwrap();
    assert!(config.contains("race_policy = \"first_completed\""));
    assert!(config.contains("nip44_v2"));
}

#[test]
fn init_twice_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    dmresolve(&dir).arg("init").assert().success();

    dmresolve(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn keys_generate_then_show() {
    let dir = assert_fs::TempDir::new().unwrap();

    let output = dmresolve(&dir)
        .args(["keys", "generate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Public key:"))
        .get_output()
        .stdout
        .clone();
    let generated = String::from_utf8(output).unwrap();

    let shown = dmresolve(&dir)
        .args(["keys", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let shown = String::from_utf8(shown).unwrap();
    let shown = shown.trim();

    assert_eq!(shown.len(), 64);
    assert!(generated.contains(shown));
}

#[test]
fn keys_generate_refuses_overwrite_without_force() {
    let dir = assert_fs::TempDir::new().unwrap();
    dmresolve(&dir).args(["keys", "generate"]).assert().success();

    dmresolve(&dir)
        .args(["keys", "generate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    dmresolve(&dir)
        .args(["keys", "generate", "--force"])
        .assert()
        .success();
}

#[test]
fn schemes_lists_nip44_before_nip04() {
    let dir = assert_fs::TempDir::new().unwrap();
    install_identity(&dir);

    let output = dmresolve(&dir)
        .arg("schemes")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 registered"))
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();

    let nip44 = stdout.find("nip44_v2").unwrap();
    let nip04 = stdout.find("nip04").unwrap();
    assert!(nip44 < nip04);
}

#[test]
fn schemes_reports_configured_race_policy() {
    let dir = assert_fs::TempDir::new().unwrap();
    install_identity(&dir);
    dir.child(".dmresolve").create_dir_all().unwrap();
    dir.child(".dmresolve/config.toml")
        .write_str(
            "[resolver]\nrace_policy = \"priority_stable\"\n\n\
             [[decryptors]]\nscheme = \"nip04\"\n",
        )
        .unwrap();

    dmresolve(&dir)
        .arg("schemes")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 registered"))
        .stdout(predicate::str::contains("race policy: priority_stable"))
        .stdout(predicate::str::contains("legacy only"));
}

#[test]
fn decrypt_legacy_dm_prints_plaintext() {
    let dir = assert_fs::TempDir::new().unwrap();
    let bob = install_identity(&dir);
    let alice = Keys::generate();
    dir.child("dm.json")
        .write_str(&legacy_dm_json(&alice, &bob, "meet at noon"))
        .unwrap();

    dmresolve(&dir)
        .args(["decrypt", "dm.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("meet at noon"))
        .stdout(predicate::str::contains("Scheme: nip04"))
        .stdout(predicate::str::contains("Direction: incoming"));
}

#[test]
fn decrypt_json_output_from_stdin() {
    let dir = assert_fs::TempDir::new().unwrap();
    let bob = install_identity(&dir);
    let alice = Keys::generate();
    let content = nip44::encrypt(
        alice.secret_key(),
        &bob.public_key(),
        "modern hello",
        nip44::Version::V2,
    )
    .unwrap();
    let event = json!({
        "id": "cafe02",
        "pubkey": alice.public_key().to_hex(),
        "kind": 4,
        "tags": [["p", bob.public_key().to_hex()]],
        "content": content,
    });

    let output = dmresolve(&dir)
        .args(["decrypt", "-", "--json"])
        .write_stdin(event.to_string())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["plaintext"], "modern hello");
    assert_eq!(value["decryptor"]["scheme"], "nip44_v2");
}

#[test]
fn decrypt_failure_exits_non_zero() {
    let dir = assert_fs::TempDir::new().unwrap();
    install_identity(&dir);
    let alice = Keys::generate();
    let carol = Keys::generate();
    dir.child("dm.json")
        .write_str(&legacy_dm_json(&alice, &carol, "not for you"))
        .unwrap();

    dmresolve(&dir)
        .args(["decrypt", "dm.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("not for you").not())
        .stderr(predicate::str::contains("Could not decrypt message cafe01"));
}

#[test]
fn decrypt_without_identity_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("dm.json").write_str("{\"kind\": 4}").unwrap();

    dmresolve(&dir)
        .args(["decrypt", "dm.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No identity found"));
}

#[test]
fn decrypt_missing_file_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    install_identity(&dir);

    dmresolve(&dir)
        .args(["decrypt", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn log_records_successes_and_failures() {
    let dir = assert_fs::TempDir::new().unwrap();
    let bob = install_identity(&dir);
    let alice = Keys::generate();
    let carol = Keys::generate();
    dmresolve(&dir).arg("init").assert().success();
    dir.child("ok.json")
        .write_str(&legacy_dm_json(&alice, &bob, "secret plaintext"))
        .unwrap();
    dir.child("bad.json")
        .write_str(&legacy_dm_json(&alice, &carol, "other"))
        .unwrap();

    dmresolve(&dir).args(["decrypt", "ok.json"]).assert().success();
    dmresolve(&dir).args(["decrypt", "bad.json"]).assert().failure();

    dmresolve(&dir)
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 entries"));

    dmresolve(&dir)
        .args(["log", "--failures"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 entries"))
        .stdout(predicate::str::contains("nip04/local"));

    let log = std::fs::read_to_string(dir.path().join(".dmresolve/resolutions.log")).unwrap();
    assert!(!log.contains("secret plaintext"));
}

#[test]
fn log_without_init_fails() {
    let dir = assert_fs::TempDir::new().unwrap();

    dmresolve(&dir)
        .arg("log")
        .assert()
        .failure()
        .stderr(predicate::str::contains("dmresolve init"));
}

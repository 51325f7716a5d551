use super::*;
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn test_home_override_is_created() {
    let temp_dir = TempDir::new().unwrap();
    let home = temp_dir.path().join("nested").join("home");
    std::env::set_var(HOME_ENV, &home);

    let dir = study_home_dir().unwrap();
    let logs = logs_dir().unwrap();

    std::env::remove_var(HOME_ENV);

    assert_eq!(dir, home);
    assert!(dir.is_dir());
    assert_eq!(logs, home.join("logs"));
    assert!(logs.is_dir());
}

#[test]
#[serial]
fn test_file_paths_live_under_home() {
    let temp_dir = TempDir::new().unwrap();
    std::env::set_var(HOME_ENV, temp_dir.path());

    let accounts = accounts_path().unwrap();
    let session = session_path().unwrap();
    let remote = default_remote_root().unwrap();

    std::env::remove_var(HOME_ENV);

    assert_eq!(accounts, temp_dir.path().join("accounts.json"));
    assert_eq!(session, temp_dir.path().join("session.json"));
    assert!(remote.is_dir());
}

#[test]
fn test_principal_key_is_stable_and_safe() {
    let a = principal_key("user/with:odd chars");
    let b = principal_key("user/with:odd chars");
    assert_eq!(a, b);
    assert_eq!(a.len(), 16);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, principal_key("another-user"));
}

#[test]
fn test_hex_encode() {
    assert_eq!(hex_encode(&[0x00, 0xab, 0xff]), "00abff");
}

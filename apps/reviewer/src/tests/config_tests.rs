use super::*;

use std::{collections::HashMap, fs};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_config_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings_from(&dir.path().join(DEFAULT_CONFIG_FILE), no_env);
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.request_timeout(), Duration::from_secs(30));
}

#[test]
fn config_file_values_override_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(
        &path,
        "server_url = \"http://review.local:9000\"\ndefault_folder = \"/data/mols\"\nrequest_timeout_secs = \"5\"\n",
    )
    .expect("write config");

    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.server_url, "http://review.local:9000");
    assert_eq!(settings.default_folder.as_deref(), Some("/data/mols"));
    assert_eq!(settings.request_timeout_secs, 5);
}

#[test]
fn integer_timeout_keeps_the_rest_of_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(
        &path,
        "server_url = \"http://review.local:9000\"\ndefault_folder = \"/data/mols\"\nrequest_timeout_secs = 5\n",
    )
    .expect("write config");

    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.server_url, "http://review.local:9000");
    assert_eq!(settings.default_folder.as_deref(), Some("/data/mols"));
    assert_eq!(settings.request_timeout(), Duration::from_secs(5));
}

#[test]
fn mistyped_values_are_skipped_individually() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(
        &path,
        "server_url = 8000\ndefault_folder = \"/data/mols\"\nrequest_timeout_secs = -3\n",
    )
    .expect("write config");

    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.server_url, Settings::default().server_url);
    assert_eq!(settings.default_folder.as_deref(), Some("/data/mols"));
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn environment_wins_over_config_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(&path, "server_url = \"http://from-file\"\n").expect("write config");

    let env: HashMap<&str, &str> = HashMap::from([
        ("MOLSELECTOR_SERVER_URL", "http://from-env"),
        ("MOLSELECTOR_DEFAULT_FOLDER", "  "),
        ("MOLSELECTOR_REQUEST_TIMEOUT_SECS", "not-a-number"),
    ]);
    let settings = load_settings_from(&path, |key| env.get(key).map(|v| v.to_string()));
    assert_eq!(settings.server_url, "http://from-env");
    assert_eq!(settings.default_folder, None);
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn malformed_config_file_is_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(&path, "server_url = [").expect("write config");
    assert_eq!(load_settings_from(&path, no_env), Settings::default());
}

#[test]
fn zero_timeout_is_clamped_to_one_second() {
    let settings = Settings {
        request_timeout_secs: 0,
        ..Settings::default()
    };
    assert_eq!(settings.request_timeout(), Duration::from_secs(1));
}

#[test]
fn configured_folder_is_loaded_at_startup() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(&path, "default_folder = \"/data/mols\"\n").expect("write config");

    let settings = load_settings_from(&path, no_env);
    match settings.startup_event() {
        Some(ReviewEvent::Intent(Intent::SubmitFolder(folder))) => assert_eq!(folder, "/data/mols"),
        other => panic!("expected a folder submission, got {other:?}"),
    }
    assert!(Settings::default().startup_event().is_none());
}

#[test]
fn command_line_overrides_configured_values() {
    let mut settings = Settings {
        default_folder: Some("/data/mols".into()),
        ..Settings::default()
    };
    settings.apply_cli(Some("http://cli:1234".into()), Some("/data/other".into()));
    assert_eq!(settings.server_url, "http://cli:1234");
    assert_eq!(settings.default_folder.as_deref(), Some("/data/other"));

    settings.apply_cli(None, Some("   ".into()));
    assert_eq!(settings.default_folder.as_deref(), Some("/data/other"));
}

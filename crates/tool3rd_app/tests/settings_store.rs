use std::fs;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use tool3rd_app::{SettingsStore, SETTINGS_FILENAME};
use tool3rd_protocol::{ProxyProtocol, Settings};

#[test]
fn first_run_writes_defaults() {
    let temp = TempDir::new().unwrap();
    let store = SettingsStore::new(&temp.path().join("user-data"));

    assert_eq!(store.load().unwrap(), Settings::default());
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({
            "proxy": {"use": false, "protocol": "http", "host": "", "port": 0},
            "certificate": {"use": false, "path": ""},
            "verifyCertificate": true
        })
    );
}

#[test]
fn saved_settings_are_read_back() {
    let temp = TempDir::new().unwrap();
    let store = SettingsStore::new(temp.path());

    let mut settings = Settings::default();
    settings.proxy.enabled = true;
    settings.proxy.protocol = ProxyProtocol::Https;
    settings.proxy.host = "proxy.corp".to_string();
    settings.proxy.port = 3128;
    store.save(&settings).unwrap();

    assert_eq!(SettingsStore::new(temp.path()).load().unwrap(), settings);
}

#[test]
fn unreadable_file_is_reset_to_defaults() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(SETTINGS_FILENAME), "{ not json").unwrap();

    let store = SettingsStore::new(temp.path());
    assert_eq!(store.load().unwrap(), Settings::default());
    assert!(serde_json::from_str::<Settings>(&fs::read_to_string(store.path()).unwrap()).is_ok());
}

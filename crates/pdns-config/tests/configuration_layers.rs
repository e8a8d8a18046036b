//! Layering tests for configuration files and `DNSDB_*` environment values.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig as _;
use pdns_config::{Config, LogFormat};
use tempfile::TempDir;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn lock_env() -> MutexGuard<'static, ()> {
    ENV_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let previous = std::env::var_os(key);
        // Environment mutation is unsafe in edition 2024; callers hold the
        // env mutex for the lifetime of the override.
        unsafe { std::env::set_var(key, value) };
        Self { key, previous }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
    }
}

fn write_config(dir: &TempDir, body: &str) -> OsString {
    let path = dir.path().join("pdnsflex.toml");
    fs::write(&path, body).expect("write config file");
    path.into_os_string()
}

#[test]
fn file_values_are_loaded() {
    let _guard = lock_env();
    let dir = TempDir::new().expect("create temp dir");
    let path = write_config(
        &dir,
        "api_key = \"file-key\"\nserver = \"https://mirror.example\"\nlog_format = \"json\"\n",
    );

    let args = vec![
        OsString::from("pdnsflex"),
        OsString::from("--config-path"),
        path,
    ];
    let config = Config::load_from_iter(args).expect("configuration loads");

    assert_eq!(config.api_key.as_deref(), Some("file-key"));
    assert_eq!(config.server, "https://mirror.example");
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(
        config.server_url().expect("server url").as_str(),
        "https://mirror.example/dnsdb/v2"
    );
}

#[test]
fn environment_overrides_file() {
    let _guard = lock_env();
    let dir = TempDir::new().expect("create temp dir");
    let path = write_config(&dir, "api_key = \"file-key\"\n");
    let _key = EnvOverride::set_var("DNSDB_API_KEY", OsStr::new("env-key"));

    let args = vec![
        OsString::from("pdnsflex"),
        OsString::from("--config-path"),
        path,
    ];
    let config = Config::load_from_iter(args).expect("configuration loads");

    assert_eq!(config.credentials().expect("key"), "env-key");
}

#[test]
fn malformed_file_is_reported() {
    let _guard = lock_env();
    let dir = TempDir::new().expect("create temp dir");
    let path = write_config(&dir, "timeout_secs = \"soon\"\n");

    let args = vec![
        OsString::from("pdnsflex"),
        OsString::from("--config-path"),
        path,
    ];
    assert!(Config::load_from_iter(args).is_err());
}

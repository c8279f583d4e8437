use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use citechat::config::{Config, TokenStoreKind};

/// Writes `contents` to a `citechat.yaml` inside a fresh temp dir
#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("citechat.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config YAML pointing at `base_url` with a file token store in `session_dir`
#[allow(dead_code)]
pub fn file_store_config_yaml(base_url: &str, session_dir: &Path) -> String {
    format!(
        "server:\n  base_url: \"{}\"\n  timeout_seconds: 5\nsession:\n  store: file\n  dir: \"{}\"\n",
        base_url,
        session_dir.display()
    )
}

/// In-process config pointing at `base_url` with a file token store in `session_dir`
#[allow(dead_code)]
pub fn file_store_config(base_url: &str, session_dir: &Path) -> Config {
    let mut config = Config::default();
    config.server.base_url = base_url.to_string();
    config.server.timeout_seconds = 5;
    config.session.store = TokenStoreKind::File;
    config.session.dir = Some(session_dir.to_path_buf());
    config
}

use dirs::home_dir;
use std::{
    env, fs,
    io,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".agent_ledger";
const SHEETS_DIR: &str = "sheets";
const CONFIG_FILE: &str = "config.json";
pub const HOME_ENV: &str = "AGENT_LEDGER_HOME";

/// Returns the application data directory, defaulting to `~/.agent_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding one CSV file per ledger sheet.
pub fn sheets_dir_in(base: &Path) -> PathBuf {
    base.join(SHEETS_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Sibling path used for write-then-rename updates.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => "tmp".to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

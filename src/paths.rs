use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const LOG_FILE_NAME: &str = "farm_log.txt";

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the default settings file: `<exe_dir>/settings.json`
pub fn default_settings_path() -> PathBuf {
    get_exe_dir().join(SETTINGS_FILE_NAME)
}

/// Returns the default journal file: `<exe_dir>/logs/farm_log.txt`
pub fn default_log_path() -> PathBuf {
    get_logs_dir().join(LOG_FILE_NAME)
}

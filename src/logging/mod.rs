//! ## Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info"
//! - LOG_FILE_PATH: when using file mode, the path of the log file (default "logs/sync-relayer.log")

use chrono::Utc;
use log::info;
use simplelog::{Config, LevelFilter, SimpleLogger, WriteLogger};
use std::{
    env,
    fs::{create_dir_all, File},
    path::Path,
};

pub fn setup_logging() {
    let log_mode = env::var("LOG_MODE").unwrap_or_else(|_| "stdout".to_string());
    let level_filter = env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| level.to_lowercase().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    if log_mode.to_lowercase() == "file" {
        let base_file_path =
            env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/sync-relayer.log".to_string());

        // Roll the file daily by appending the UTC date before the extension
        let date_str = Utc::now().format("%Y-%m-%d").to_string();
        let rolled_file_path = match base_file_path.strip_suffix(".log") {
            Some(trimmed) => format!("{}-{}.log", trimmed, date_str),
            None => format!("{}-{}.log", base_file_path, date_str),
        };

        if let Some(parent) = Path::new(&rolled_file_path).parent() {
            create_dir_all(parent).expect("Failed to create log directory");
        }

        let log_file = File::create(&rolled_file_path)
            .unwrap_or_else(|e| panic!("Unable to create log file {}: {}", rolled_file_path, e));

        WriteLogger::init(level_filter, Config::default(), log_file)
            .expect("Failed to initialize file logger");
    } else {
        SimpleLogger::init(level_filter, Config::default())
            .expect("Failed to initialize simple logger");
    }

    info!("Logging is successfully configured (mode: {})", log_mode);
}

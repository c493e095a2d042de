//! Command-line options. Every flag can also come from the environment.
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "library-catalog", version, about = "Terminal library catalog with signup and login")]
pub struct Cli {
    /// Directory holding `books.json` and `users.json`.
    #[arg(long, env = "LIBRARY_CATALOG_DATA_DIR", default_value = "library-data")]
    pub data_dir: PathBuf,

    /// Directory holding `theme.conf` and `keybinds.conf`.
    #[arg(long, env = "LIBRARY_CATALOG_CONFIG_DIR", default_value = ".")]
    pub config_dir: PathBuf,

    /// Log destination. The terminal belongs to the TUI.
    #[arg(long, env = "LIBRARY_CATALOG_LOG", default_value = "library-catalog.log")]
    pub log_file: PathBuf,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn theme_path(&self) -> PathBuf {
        self.config_dir.join("theme.conf")
    }

    pub fn keybinds_path(&self) -> PathBuf {
        self.config_dir.join("keybinds.conf")
    }
}

//! Media engine configuration.

use std::path::PathBuf;

/// Font directories searched when no override is configured.
const DEFAULT_FONT_DIRS: &[&str] = &["/usr/share/fonts", "/usr/local/share/fonts"];

/// Font used when a requested font cannot be rendered.
pub const DEFAULT_FALLBACK_FONT: &str = "DejaVuSans-Bold";

/// Process-wide media configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directories scanned for font files
    pub font_dirs: Vec<PathBuf>,
    /// Font family used for fallback captions
    pub fallback_font: String,
    /// Root for per-job scratch directories (system temp when unset)
    pub work_dir: Option<PathBuf>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            font_dirs: default_font_dirs(),
            fallback_font: DEFAULT_FALLBACK_FONT.to_string(),
            work_dir: None,
        }
    }
}

impl MediaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            font_dirs: std::env::var("STACKCUT_FONT_DIRS")
                .ok()
                .map(|s| parse_dir_list(&s))
                .filter(|dirs| !dirs.is_empty())
                .unwrap_or_else(default_font_dirs),
            fallback_font: std::env::var("STACKCUT_FALLBACK_FONT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FALLBACK_FONT.to_string()),
            work_dir: std::env::var("STACKCUT_WORK_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

fn default_font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = DEFAULT_FONT_DIRS.iter().map(PathBuf::from).collect();
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
    }
    dirs
}

/// Split a colon-separated directory list, skipping empty entries.
fn parse_dir_list(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

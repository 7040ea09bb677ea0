use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where the attempt log lives.
    pub fn attempt_log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("paneldrill");
            Some(state_dir.join("attempts.csv"))
        } else {
            ProjectDirs::from("", "", "paneldrill")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("attempts.csv"))
        }
    }
}

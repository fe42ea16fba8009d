use log::{debug, warn};
use std::path::PathBuf;

use super::manifest::BuildWarning;
use crate::config::{BoardSettings, Settings, TargetConfig};

/// State threaded through one run.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub repo_root: PathBuf,
    /// Project target, replaced field by field by board settings.
    pub target: TargetConfig,
    pub top_level_names: Vec<String>,
    pub warnings: Vec<BuildWarning>,
}

impl BuildContext {
    pub fn new(settings: &Settings, repo_root: PathBuf) -> Self {
        Self {
            repo_root,
            target: settings.target.clone(),
            top_level_names: settings.top_level.as_ref().map(|t| t.names()).unwrap_or_default(),
            warnings: Vec::new(),
        }
    }

    /// Logs and records a recoverable condition.
    pub fn warn(&mut self, warning: BuildWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Board target and top level take precedence over the project's.
    pub fn apply_board_settings(&mut self, board: &BoardSettings) {
        let fields = [
            ("vendor", &self.target.vendor, &board.target.vendor),
            ("tool_version", &self.target.tool_version, &board.target.tool_version),
            ("family", &self.target.family, &board.target.family),
            ("device", &self.target.device, &board.target.device),
        ];
        for (key, project, board) in fields {
            match (project, board) {
                (Some(p), Some(b)) if p != b => warn!(
                    "[{key}] Project setting {p} does not match board setting {b}, using board setting"
                ),
                (_, Some(b)) => debug!("[{key}] Using board setting {b}"),
                _ => {}
            }
        }
        self.target = self.target.overridden_by(&board.target);

        if let Some(names) = board.top_level.as_ref().map(|t| t.names()).filter(|n| !n.is_empty()) {
            debug!("Top level from board settings: {names:?}");
            self.top_level_names = names;
        }
    }
}

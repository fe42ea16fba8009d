use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML. Original error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON. Original error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse exclusion glob. Original error: {0}")]
    GlobSetParseError(#[from] globset::Error),

    #[error("Git operation failed. Original error: {0}")]
    Git2Error(#[from] git2::Error),

    #[error("Failed to parse URL. Original error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Failed to walk directory. Original error: {0}")]
    WalkDirError(#[from] walkdir::Error),

    #[error("Failed to read credentials. Original error: {0}")]
    PromptError(#[from] dialoguer::Error),

    /// Malformed or missing required settings.
    #[error("Configuration error: {0}.")]
    ConfigValidation(String),

    #[error("No settings file found in '{settings_dir}'. Tried: {settings_files}.")]
    ConfigNotFound { settings_dir: String, settings_files: String },

    #[error("Cannot resolve category '{category}' from path '{path}'. Supported categories: {supported}.")]
    UnknownCategory { path: String, category: String, supported: String },

    #[error("No layout template defined for category '{category}'.")]
    MissingLayout { category: String },

    /// The local checkout records a different remote than the one configured.
    #[error("Working copy '{path}' points at '{found}', expected '{expected}'. Fix the checkout manually.")]
    WorkingCopyMismatch { path: String, expected: String, found: String },

    #[error("Cannot read working copy '{path}': {reason}")]
    WorkingCopy { path: String, reason: String },

    #[error("Checkout is disabled and local path '{path}' for '{name}' does not exist.")]
    LocalPathMissing { name: String, path: String },

    #[error("Failed to check out '{url}' into '{path}': {reason}")]
    Checkout { url: String, path: String, reason: String },

    #[error("No top-level files found in library '{library}'.")]
    NoTopLevelFound { library: String },

    #[error("Could not determine project name (top-level: '{top_level}', board: '{board}').")]
    ProjectName { top_level: String, board: String },

    #[error("Cannot process vendor IP for '{dependency}': {reason}.")]
    VendorIpRequirements { dependency: String, reason: String },
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(crate::constants::exit_codes::FAILURE);
}

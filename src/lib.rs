/// Handles argument parsing.
pub mod cli;

/// Settings, layouts and board settings.
pub mod config;

pub mod constants;

/// Dependencies and their resolved layouts.
pub mod dependency;

/// Filtered discovery of source files.
pub mod discovery;

/// Defines custom error types.
pub mod error;

/// Extension traits for standard library types.
pub mod ext;

/// Keyword, glob and marker file exclusions.
pub mod ignore;

/// Layout templates and their resolution against the filesystem.
pub mod layout;

/// Top-level file selection and project naming.
pub mod naming;

/// Runs the build phases and produces the manifest.
pub mod orchestrator;

/// Working copies and checkouts.
pub mod repository;

/// Vendor IP catalog instantiation and collection.
pub mod vendor_ip;

/// Wrapper file deduplication.
pub mod wrapper;

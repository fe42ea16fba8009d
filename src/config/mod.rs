//! Configuration management for hdlmanifest projects
//!
//! This module contains the configuration system components:
//! - `types`: Typed sections of the settings file (target, exclusion, dependencies, IP catalog)
//! - `loader`: Settings file discovery, parsing and validation

pub mod loader;
pub mod types;

#[cfg(test)]
mod tests;

pub use loader::{read_structured, Settings};
pub use types::{
    BoardSettings, CredentialsConfig, DependencyConfig, ExclusionConfig, IpCatalog,
    IpCatalogNode, IpCoreConfig, NameList, TargetConfig, VendorProfile,
};

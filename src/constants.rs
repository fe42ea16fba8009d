//! Constants used throughout hdlmanifest

/// Settings file names in order of preference
pub const SETTINGS_FILENAMES: &[&str] =
    &["hdlmanifest.json", "hdlmanifest.yaml", "hdlmanifest.yml"];

/// Environment variable consulted when `repo_root` is not configured
pub const REPO_ROOT_ENV: &str = "REPO_ROOT";

/// Per-directory exclusion marker file name
pub const DEFAULT_MARKER_FILENAME: &str = "EXCLUDE";

/// Path segment shared by vendor wrapper files reused across IP cores
pub const COMMON_WRAPPER_DIR: &str = "common_wrapper_files";

/// Suffix removed from a wrapper file name to find its shared wrapper directory
pub const WRAPPER_SUFFIX: &str = "_wrapper";

/// Library suffix appended to dependency names in `lib_append_categories`
pub const DEFAULT_LIBRARY_SUFFIX: &str = "_lib";

/// Board settings file used when none is configured
pub const DEFAULT_BOARD_SETTINGS: &str = "default_settings.yml";

/// Positional markers identifying top-level entity file names
pub const TOP_PREFIX: &str = "top_";
pub const TOP_SUFFIX: &str = "_top";

/// Name of the build directory created under the top-level dependency
pub const BUILD_DIR: &str = "build";

/// STDOUT indicator for CLI arguments
pub const STDOUT_INDICATOR: &str = "-";

/// Dependency categories with dedicated handling
pub mod categories {
    pub const LIBRARY: &str = "library";
    pub const BOARDS: &str = "boards";
    pub const VENDOR_IP: &str = "vendor_ip";
}

/// Layout template tags
pub mod tags {
    pub const NAME: &str = "<NAME>";
    pub const VENDOR: &str = "<VENDOR>";
    pub const TOOL_VERSION: &str = "<TOOL_VERSION>";
    pub const FAMILY: &str = "<FAMILY>";
    pub const DEVICE: &str = "<DEVICE>";
    pub const IPCAT: &str = "<IPCAT>";
    pub const IPSUBCAT: &str = "<IPSUBCAT>";
}

/// File extensions, leading dot included
pub mod extensions {
    pub const HDL: &[&str] = &[".vhd", ".vhdl", ".v"];
    pub const XILINX_IP: &[&str] = &[".xci"];
    pub const XILINX_CONSTRAINTS: &[&str] = &[".xdc"];
    pub const ALTERA_IP: &[&str] = &[".ip", ".qsys", ".qip"];
    pub const ALTERA_CONSTRAINTS: &[&str] = &[".sdc", ".qsf", ".tcl"];
}

/// Fixed exclusion keywords used while collecting vendor IP
pub mod ip_exclusions {
    /// Applied when searching IP design files
    pub const DESIGN: &[&str] = &["/vhd", "/verilog"];
    /// Applied when searching IP wrapper HDL files
    pub const WRAPPER: &[&str] = &["/ip"];
}

/// Vendors known out of the box
pub mod vendors {
    pub const XILINX: &str = "xilinx";
    pub const ALTERA: &str = "altera";
}

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}

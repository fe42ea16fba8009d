use hdlmanifest::config::Settings;
use hdlmanifest::error::{Error, Result};
use hdlmanifest::orchestrator::{BuildManifest, BuildTool};
use hdlmanifest::repository::{Credentials, RemoteInfo, VersionControl, WorkingCopyInfo};
use log::debug;
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Root URL shared by every fixture dependency.
pub const BASE_URL: &str = "https://git.example.org/hdl";

/// File recording the remote URL of a fixture working copy.
pub const ORIGIN_FILE: &str = ".origin";

/// Writes `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// Marks `root/rel` as a working copy of `BASE_URL/rel`.
pub fn init_working_copy(root: &Path, rel: &str) {
    write_file(root, &format!("{rel}/{ORIGIN_FILE}"), &format!("{BASE_URL}/{rel}"));
}

/// Copies a directory tree.
pub fn copy_dir(src: &Path, dst: &Path) {
    for entry in WalkDir::new(src).into_iter().filter_map(|e| e.ok()) {
        let rel = entry.path().strip_prefix(src).unwrap();
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

/// Version control backed by plain directories.
///
/// Working copies record their remote in an `.origin` file; checkouts copy
/// `remotes/<path below BASE_URL>` into the destination.
pub struct FixtureVcs {
    pub remotes: PathBuf,
    pub checkouts: RefCell<Vec<String>>,
}

impl FixtureVcs {
    pub fn new(remotes: &Path) -> Self {
        Self { remotes: remotes.to_path_buf(), checkouts: RefCell::new(Vec::new()) }
    }

    fn fixture(&self, url: &str) -> Result<PathBuf> {
        let rel = url.strip_prefix(BASE_URL).unwrap_or(url).trim_start_matches('/');
        let path = self.remotes.join(rel);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(Error::IoError(io::Error::new(io::ErrorKind::NotFound, format!("no remote {url}"))))
        }
    }
}

impl VersionControl for FixtureVcs {
    fn working_copy(&self, path: &Path) -> Result<WorkingCopyInfo> {
        let url = fs::read_to_string(path.join(ORIGIN_FILE))?;
        Ok(WorkingCopyInfo { url: url.trim().to_string(), revision: None })
    }

    fn remote_info(&self, url: &str, _credentials: &Credentials) -> Result<RemoteInfo> {
        self.fixture(url)?;
        Ok(RemoteInfo { url: url.to_string(), head: Some("main".into()) })
    }

    fn checkout(
        &self,
        url: &str,
        _rev: Option<&str>,
        dest: &Path,
        _credentials: &Credentials,
    ) -> Result<()> {
        let fixture = self.fixture(url)?;
        debug!("Fixture checkout of '{url}' into '{}'", dest.display());
        copy_dir(&fixture, dest);
        fs::write(dest.join(ORIGIN_FILE), url)?;
        self.checkouts.borrow_mut().push(url.to_string());
        Ok(())
    }
}

/// Build tool keeping every manifest it receives.
#[derive(Default)]
pub struct RecordingTool {
    pub received: Vec<BuildManifest>,
}

impl BuildTool for RecordingTool {
    fn consume(&mut self, manifest: &BuildManifest) -> Result<()> {
        self.received.push(manifest.clone());
        Ok(())
    }
}

/// Parses settings YAML rooted at `repo_root` and validates them.
pub fn settings_from_yaml(yaml: &str, repo_root: &Path) -> Settings {
    let mut settings: Settings = serde_yaml::from_str(yaml).unwrap();
    settings.repo_root = Some(repo_root.to_path_buf());
    settings.validate().unwrap();
    settings
}

/// Layouts for the library, boards and vendor_ip categories.
pub const LAYOUTS: &str = r#"
layouts:
  library:
    library:
      <NAME>:
        - src: ~
        - constraints: ~
  boards:
    boards:
      <NAME>:
        <TOOL_VERSION>:
          - settings: ~
          - src: ~
          - constraints: ~
  vendor_ip:
    vendor_ip:
      <VENDOR>:
        <TOOL_VERSION>:
          - <NAME>: ~
          - common_wrapper_files:
              - <NAME>
"#;

/// Project with a CPU library, a UART library, a board and the vendor IP master.
pub fn project_settings() -> String {
    format!(
        r#"
name: cpu
target:
  vendor: xilinx
  tool_version: "2019.1"
  family: artix7
  device: xc7a35t
board: devkit
exclusion:
  keywords:
    - deprecated
dependencies:
  cpu:
    url: {BASE_URL}
    path: library/cpu
    default_include: true
    ip:
      memory:
        fifo:
          enabled: true
          library: cpu_lib
          wrapper_file: fifo_gen_wrapper
        ram:
          enabled: false
          library: cpu_lib
  uart:
    url: {BASE_URL}
    path: library/uart
    default_include: true
  devkit:
    url: {BASE_URL}
    path: boards/devkit
    default_include: true
  vendor_ip:
    url: {BASE_URL}
    path: vendor_ip
    default_include: true
{LAYOUTS}"#
    )
}

/// Populates `root` with the working copies `project_settings` expects.
pub fn populate_project(root: &Path) {
    for rel in ["library/cpu", "library/uart", "boards/devkit", "vendor_ip"] {
        init_working_copy(root, rel);
    }

    write_file(root, "library/cpu/src/cpu_top.vhd", "entity cpu_top is end;");
    write_file(root, "library/cpu/src/cpu_core.vhd", "entity cpu_core is end;");
    write_file(root, "library/cpu/src/deprecated/old_alu.vhd", "entity old_alu is end;");
    write_file(root, "library/cpu/src/README.md", "CPU sources");
    write_file(root, "library/cpu/constraints/cpu.xdc", "");

    write_file(root, "library/uart/src/uart.vhd", "entity uart is end;");
    write_file(root, "library/uart/src/uart_tx.v", "module uart_tx; endmodule");

    write_file(
        root,
        "boards/devkit/2019.1/settings/default_settings.yml",
        "device: xc7a100t\ntop_level: cpu_top\n",
    );
    write_file(root, "boards/devkit/2019.1/src/devkit_pkg.vhd", "package devkit_pkg is end;");
    write_file(root, "boards/devkit/2019.1/constraints/devkit.xdc", "");

    write_file(root, "vendor_ip/xilinx/2019.1/fifo/src/fifo.xci", "{}");
    write_file(root, "vendor_ip/xilinx/2019.1/fifo/src/fifo_gen_wrapper.vhd", "");
    write_file(root, "vendor_ip/xilinx/2019.1/ram/src/ram.xci", "{}");
    write_file(
        root,
        "vendor_ip/xilinx/2019.1/common_wrapper_files/fifo_gen/src/fifo_gen_wrapper.vhd",
        "",
    );
}

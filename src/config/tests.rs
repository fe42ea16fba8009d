//! Tests for the config module

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    use crate::config::{NameList, Settings};
    use crate::error::Error;
    use crate::layout::LayoutTemplate;

    const MINIMAL: &str = r#"
name: cpu
repo_root: /repo
target:
  vendor: xilinx
  tool_version: "2019.1"
dependencies:
  cpu:
    url: https://git.example.org/hdl/cpu.git
    path: library/cpu
    default_include: true
"#;

    #[test]
    fn loads_yaml_from_directory_with_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hdlmanifest.yml"), MINIMAL).unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.name.as_deref(), Some("cpu"));
        assert!(settings.checkout);
        assert_eq!(settings.supported_vendors, vec!["xilinx", "altera"]);
        assert_eq!(settings.categories, vec!["library", "boards", "vendor_ip"]);
        assert_eq!(settings.lib_append_categories, vec!["library"]);
        assert_eq!(settings.library_suffix, "_lib");
        assert_eq!(settings.exclusion.marker_filename, "EXCLUDE");
        assert!(settings.dependencies["cpu"].default_include);
    }

    #[test]
    fn json_is_preferred_over_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hdlmanifest.yml"), MINIMAL).unwrap();
        fs::write(
            dir.path().join("hdlmanifest.json"),
            r#"{"repo_root": "/other", "top_level": ["a_top", "b_top"]}"#,
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.repo_root, Some(PathBuf::from("/other")));
        assert_eq!(
            settings.top_level,
            Some(NameList::Many(vec!["a_top".into(), "b_top".into()]))
        );
    }

    #[test]
    fn missing_settings_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn layouts_file_is_merged_without_overriding_inline() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("layouts.yml"),
            "library:\n  <NAME>:\n    - src\nboards:\n  <NAME>:\n    - settings\n",
        )
        .unwrap();
        let settings_file = dir.path().join("project.yml");
        fs::write(
            &settings_file,
            format!("{MINIMAL}layouts_file: layouts.yml\nlayouts:\n  library:\n    lib: ~\n"),
        )
        .unwrap();

        let settings = Settings::load(&settings_file).unwrap();
        assert_eq!(settings.layouts.len(), 2);
        let LayoutTemplate::Dir(library) = &settings.layouts["library"] else {
            panic!("Expected Dir")
        };
        assert!(library.contains_key("lib"));
        assert!(settings.layouts.contains_key("boards"));
    }

    #[test]
    fn rejects_empty_dependency_url() {
        let yaml = "dependencies:\n  cpu:\n    url: ''\n    path: library/cpu\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(settings.validate(), Err(Error::ConfigValidation(_))));
    }

    #[test]
    fn rejects_unsupported_vendor() {
        let yaml = "target:\n  vendor: lattice\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("lattice"));
    }

    #[test]
    fn rejects_extension_without_dot() {
        let yaml = "vendors:\n  xilinx:\n    ip_extensions: [xci]\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(settings.validate(), Err(Error::ConfigValidation(_))));
    }

    #[test]
    fn rejects_undeclared_top_level_dependency() {
        let yaml = "name: ghost\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(settings.validate(), Err(Error::ConfigValidation(_))));
    }

    #[test]
    fn vendor_profile_override_keeps_unset_lists() {
        let yaml = "vendors:\n  xilinx:\n    ip_extensions: [.xci, .bd]\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        let profile = settings.vendor_profile("xilinx");
        assert_eq!(profile.ip_extensions, vec![".xci", ".bd"]);
        assert_eq!(profile.constraint_extensions, vec![".xdc"]);
    }

    #[test]
    fn category_mapping_round_trips() {
        let yaml = "category_mapping:\n  library: libs\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.category_dir("library"), "libs");
        assert_eq!(settings.category_for_dir("libs"), "library");
        assert_eq!(settings.category_for_dir("boards"), "boards");
    }

    #[test]
    fn board_settings_file_name() {
        let mut settings: Settings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings.board_settings_file(), "default_settings.yml");
        settings.board_settings = Some("rev_b".into());
        assert_eq!(settings.board_settings_file(), "rev_b.yml");
    }
}

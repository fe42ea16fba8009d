use crate::{
    cli::Args,
    config::Settings,
    error::Result,
    orchestrator::{BuildManifest, BuildOrchestrator, ManifestWriter},
    repository::{CredentialCache, CredentialProvider, GitVcs, NonInteractive, PasswordPrompt},
};

/// Main CLI runner that drives one build run and writes its manifest
pub struct Runner {
    args: Args,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Loads the settings, runs every phase and hands the manifest to the writer
    pub fn run(self) -> Result<BuildManifest> {
        let settings = self.load_settings()?;

        let provider: Box<dyn CredentialProvider> =
            if self.args.non_interactive { Box::new(NonInteractive) } else { Box::new(PasswordPrompt) };
        let credentials = CredentialCache::new(provider, settings.credentials.username.clone());

        let vcs = GitVcs;
        let mut writer = ManifestWriter::new(&self.args.output);
        let manifest = BuildOrchestrator::new(&settings, &vcs, credentials).run(&mut writer)?;

        eprintln!(
            "Manifest for '{}' written to {} ({})",
            manifest.project_name,
            writer.destination_label(),
            manifest.fingerprint()?
        );
        Ok(manifest)
    }

    /// Loads the settings and applies the command line overrides
    fn load_settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(&self.args.settings)?;
        if let Some(layouts) = &self.args.layouts {
            settings.merge_layouts_file(layouts)?;
        }
        if let Some(repo_root) = &self.args.repo_root {
            settings.repo_root = Some(repo_root.clone());
        }
        if self.args.no_checkout {
            settings.checkout = false;
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Main entry point for CLI execution
pub fn run(args: Args) -> Result<BuildManifest> {
    Runner::new(args).run()
}

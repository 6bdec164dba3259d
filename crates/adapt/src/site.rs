// crates/adapt/src/site.rs

use crate::host::ThemeHost;
use domain::request::{site_base_path, RawRequestSignals};
use domain::setting::Settings;
use domain::template::ThemeSelection;
use serve::{FsTemplateSetSource, MicrositeResolver, RenderHost};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Site-wide, immutable routing configuration shared by every request.
#[derive(Debug, Clone)]
pub struct Site {
    pub front_controller: String,
    pub site_base_path: String,
    pub default_template: String,
    pub default_stylesheet: String,
    pub themes_dir: PathBuf,
    pub microsites_dir: PathBuf,
    pub admin_path: String,
}

/// Everything decided for one request.
pub struct Resolution {
    pub resolver: Arc<MicrositeResolver>,
    pub host: ThemeHost,
    pub selection: ThemeSelection,
}

impl Site {
    /// Relative directories in `settings` are taken relative to `dir`.
    pub fn from_settings(dir: &Path, settings: &Settings) -> Self {
        Self {
            front_controller: settings.site.front_controller.clone(),
            site_base_path: site_base_path(&settings.site.base_url),
            default_template: settings.site.template.clone(),
            default_stylesheet: settings.site.stylesheet().to_owned(),
            themes_dir: dir.join(&settings.themes.dir),
            microsites_dir: dir.join(&settings.microsites.dir),
            admin_path: settings.admin.path.clone(),
        }
    }

    pub fn signals_for(&self, target: &str) -> RawRequestSignals {
        RawRequestSignals::from_request_target(target, &self.front_controller, &self.site_base_path)
    }

    /// Build a fresh resolver and host for `target` and run the resolver's
    /// load step against the host.
    #[tracing::instrument(skip_all, fields(target = %target))]
    pub fn resolve(&self, target: &str) -> Resolution {
        let resolver = Arc::new(
            MicrositeResolver::new(
                self.signals_for(target),
                self.front_controller.clone(),
                FsTemplateSetSource,
            )
            .with_template_sets_root_directory(&self.microsites_dir),
        );

        let mut host = ThemeHost::new(&self.default_template, &self.default_stylesheet);
        host.register_template_root(self.themes_dir.clone());
        resolver.load(&mut host);

        let selection = host.selection(resolver.matched_microsite().map(str::to_owned));
        debug!(
            template = %selection.template,
            stylesheet = %selection.stylesheet,
            "theme selected"
        );

        Resolution {
            resolver,
            host,
            selection,
        }
    }
}

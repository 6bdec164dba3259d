// crates/adapt/src/discovery.rs

use crate::Error;
use domain::template::{TemplateSetListing, TemplateSetMeta};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const MANIFEST_FILE: &str = "theme.toml";

#[derive(Debug, Deserialize)]
struct ThemeManifest {
    pub name: Option<String>,
}

/// Discover every template set under the registered roots.
///
/// A template set is any subdirectory of a root. When two roots hold a set
/// with the same name, the root registered first wins. Roots that do not
/// exist or cannot be read are skipped.
#[tracing::instrument(skip_all)]
pub fn discover_template_sets(roots: &[PathBuf]) -> TemplateSetListing {
    let mut out = TemplateSetListing::new();

    for root in roots {
        if !root.exists() {
            debug!("template root {:?} does not exist", root);
            continue;
        }

        match discover_in_root(root) {
            Ok(found) => {
                for meta in found {
                    out.entry(meta.name.clone()).or_insert(meta);
                }
            }
            Err(e) => warn!("skipping template root {:?}: {}", root, e),
        }
    }

    out
}

fn discover_in_root(root: &Path) -> Result<Vec<TemplateSetMeta>, Error> {
    let mut out = Vec::new();

    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|x| x.to_str()) else {
            continue;
        };

        let mut meta = TemplateSetMeta::new(name, root);
        match read_manifest(&path) {
            Ok(Some(ThemeManifest {
                name: Some(display_name),
            })) => meta = meta.with_display_name(display_name),
            Ok(_) => {}
            Err(e) => warn!("ignoring manifest for {:?}: {}", path, e),
        }

        out.push(meta);
    }

    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

fn read_manifest(dir: &Path) -> Result<Option<ThemeManifest>, Error> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Ok(None);
    }

    let src = fs::read_to_string(&manifest_path)?;
    let manifest = toml::from_str(&src).map_err(|e| {
        Error::manifest(format!("failed parsing {:?}: {e}", manifest_path))
    })?;

    Ok(Some(manifest))
}

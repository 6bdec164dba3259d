use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A template set found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSetMeta {
    /// Folder name; this is the identifier templates and stylesheets use.
    pub name: String,

    /// Human readable name from `theme.toml`, or the folder name.
    pub display_name: String,

    /// The registered root the set was discovered under.
    pub root: PathBuf,

    /// The set's own directory, `<root>/<name>`.
    pub dir: PathBuf,
}

impl TemplateSetMeta {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let root = root.into();
        Self {
            display_name: name.clone(),
            dir: root.join(&name),
            name,
            root,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

/// Every template set the admin listing knows about, keyed by name.
pub type TemplateSetListing = BTreeMap<String, TemplateSetMeta>;

/// Which template set renders a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSelection {
    pub template: String,
    pub stylesheet: String,

    /// Set when the request was matched to a microsite.
    pub microsite: Option<String>,
}

// crates/adapt/src/host.rs

//! Request-scoped rendering host.
//!
//! Filters registered through [`RenderHost`] are applied in registration
//! order; each one receives the value produced by the previous one, starting
//! from the configured default.

use crate::discovery::discover_template_sets;
use domain::template::{TemplateSetListing, ThemeSelection};
use serve::{ListingFilter, RenderHost, SelectionFilter};
use std::fmt;
use std::path::PathBuf;

pub struct ThemeHost {
    default_template: String,
    default_stylesheet: String,
    roots: Vec<PathBuf>,
    template_filters: Vec<SelectionFilter>,
    stylesheet_filters: Vec<SelectionFilter>,
    listing_filters: Vec<ListingFilter>,
}

impl ThemeHost {
    pub fn new(default_template: impl Into<String>, default_stylesheet: impl Into<String>) -> Self {
        Self {
            default_template: default_template.into(),
            default_stylesheet: default_stylesheet.into(),
            roots: Vec::new(),
            template_filters: Vec::new(),
            stylesheet_filters: Vec::new(),
            listing_filters: Vec::new(),
        }
    }

    /// Registered template roots in registration order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn template(&self) -> String {
        apply_selection(&self.template_filters, &self.default_template)
    }

    pub fn stylesheet(&self) -> String {
        apply_selection(&self.stylesheet_filters, &self.default_stylesheet)
    }

    /// Template and stylesheet after all filters, tagged with the microsite
    /// that caused the override, if any.
    pub fn selection(&self, microsite: Option<String>) -> ThemeSelection {
        ThemeSelection {
            template: self.template(),
            stylesheet: self.stylesheet(),
            microsite,
        }
    }

    /// Every template set under the registered roots with listing filters
    /// applied.
    #[tracing::instrument(skip_all)]
    pub fn template_sets_for_listing(&self) -> TemplateSetListing {
        let all = discover_template_sets(&self.roots);
        self.listing_filters
            .iter()
            .fold(all, |listing, filter| filter(listing))
    }
}

fn apply_selection(filters: &[SelectionFilter], default: &str) -> String {
    filters
        .iter()
        .fold(default.to_owned(), |current, filter| filter(&current))
}

impl RenderHost for ThemeHost {
    fn register_template_root(&mut self, root: PathBuf) {
        if !self.roots.contains(&root) {
            self.roots.push(root);
        }
    }

    fn add_template_filter(&mut self, filter: SelectionFilter) {
        self.template_filters.push(filter);
    }

    fn add_stylesheet_filter(&mut self, filter: SelectionFilter) {
        self.stylesheet_filters.push(filter);
    }

    fn add_listing_filter(&mut self, filter: ListingFilter) {
        self.listing_filters.push(filter);
    }
}

impl fmt::Debug for ThemeHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeHost")
            .field("default_template", &self.default_template)
            .field("default_stylesheet", &self.default_stylesheet)
            .field("roots", &self.roots)
            .field("template_filters", &self.template_filters.len())
            .field("stylesheet_filters", &self.stylesheet_filters.len())
            .field("listing_filters", &self.listing_filters.len())
            .finish()
    }
}

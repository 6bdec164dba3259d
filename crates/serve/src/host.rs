// crates/serve/src/host.rs

//! The contract between the resolver and the rendering layer.

use domain::template::TemplateSetListing;
use std::path::PathBuf;

/// Receives the value the rendering layer was about to use and returns the
/// one it should use instead.
pub type SelectionFilter = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Transforms the admin listing of template sets before it is shown.
pub type ListingFilter = Box<dyn Fn(TemplateSetListing) -> TemplateSetListing + Send + Sync>;

/// Hooks a rendering layer exposes for a single request.
#[cfg_attr(test, mockall::automock)]
pub trait RenderHost {
    /// Add a directory under which template sets are discovered.
    fn register_template_root(&mut self, root: PathBuf);

    /// Filter applied when choosing the template for this request.
    fn add_template_filter(&mut self, filter: SelectionFilter);

    /// Filter applied when choosing the stylesheet for this request.
    fn add_stylesheet_filter(&mut self, filter: SelectionFilter);

    /// Filter applied to the admin listing of all template sets.
    fn add_listing_filter(&mut self, filter: ListingFilter);
}

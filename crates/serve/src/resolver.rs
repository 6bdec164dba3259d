// crates/serve/src/resolver.rs

//! Request → microsite resolution.
//!
//! The first segment of the canonical request path is compared against the
//! entry names of the microsite template-sets root. On a match the rendering
//! layer is told to use that template set for both template and stylesheet
//! for the rest of the request.
//!
//! A resolver is built per request. Everything it derives is computed on
//! first access and cached for its lifetime, so repeated questions during a
//! request never re-list the directory or re-normalize the path.

use crate::host::RenderHost;
use crate::listing::TemplateSetSource;
use crate::uri::normalize_request_path;
use domain::request::RawRequestSignals;
use domain::template::TemplateSetListing;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Pseudo entries some directory listings report.
const PSEUDO_ENTRIES: [&str; 2] = [".", ".."];

pub struct MicrositeResolver {
    signals: RawRequestSignals,
    front_controller: String,
    source: Box<dyn TemplateSetSource>,
    root: PathBuf,

    request_path: OnceLock<String>,
    known: OnceLock<BTreeSet<String>>,
    matched: OnceLock<String>,
}

impl MicrositeResolver {
    pub fn new(
        signals: RawRequestSignals,
        front_controller: impl Into<String>,
        source: impl TemplateSetSource + 'static,
    ) -> Self {
        Self {
            signals,
            front_controller: front_controller.into(),
            source: Box::new(source),
            root: PathBuf::new(),
            request_path: OnceLock::new(),
            known: OnceLock::new(),
            matched: OnceLock::new(),
        }
    }

    /// Builder form of [`Self::set_template_sets_root_directory`].
    pub fn with_template_sets_root_directory(mut self, root: impl Into<PathBuf>) -> Self {
        self.set_template_sets_root_directory(root);
        self
    }

    /// Must be called before the resolver is first queried. The directory
    /// is not checked here; an unreadable root shows up as "no microsites".
    pub fn set_template_sets_root_directory(&mut self, root: impl Into<PathBuf>) {
        self.root = root.into();
    }

    pub fn template_sets_root_directory(&self) -> &Path {
        &self.root
    }

    /// Canonical request path, see [`normalize_request_path`].
    pub fn request_path(&self) -> &str {
        self.request_path
            .get_or_init(|| normalize_request_path(&self.signals, &self.front_controller))
    }

    /// Entry names under the template-sets root. An unreadable root yields
    /// an empty set.
    pub fn known_template_set_names(&self) -> &BTreeSet<String> {
        self.known.get_or_init(|| match self.source.list(&self.root) {
            Ok(names) => names
                .into_iter()
                .filter(|n| !n.is_empty() && !PSEUDO_ENTRIES.contains(&n.as_str()))
                .collect(),
            Err(e) => {
                warn!("no microsites recognized: {}", e);
                BTreeSet::new()
            }
        })
    }

    /// First `/`-delimited segment of the request path; empty for the root.
    pub fn microsite_name(&self) -> &str {
        self.request_path().split('/').next().unwrap_or_default()
    }

    /// Exact, case-sensitive membership of the microsite name in the known
    /// template sets. The empty name never matches and never triggers a
    /// directory listing.
    pub fn is_microsite_request(&self) -> bool {
        let name = self.microsite_name();
        if name.is_empty() {
            return false;
        }
        self.known_template_set_names().contains(name)
    }

    /// The microsite this request was switched to by [`Self::load`].
    pub fn matched_microsite(&self) -> Option<&str> {
        self.matched.get().map(String::as_str)
    }

    /// Wire the resolver into the rendering layer for this request.
    ///
    /// The template-sets root and the listing filter are registered for
    /// every request. The template and stylesheet overrides are registered
    /// only when the request addresses a known microsite.
    #[tracing::instrument(skip_all, fields(path = %self.request_path()))]
    pub fn load(self: &Arc<Self>, host: &mut dyn RenderHost) {
        host.register_template_root(self.root.clone());

        let this = Arc::clone(self);
        host.add_listing_filter(Box::new(move |listing: TemplateSetListing| {
            this.filter_hidden_template_sets(&listing)
        }));

        if !self.is_microsite_request() {
            debug!("not a microsite request");
            return;
        }

        let name = self.microsite_name().to_owned();
        debug!("microsite request for {}", name);
        // Only the first load decides; a later call keeps the earlier match.
        let _ = self.matched.set(name);

        let this = Arc::clone(self);
        host.add_template_filter(Box::new(move |_: &str| {
            this.filter_template_override().to_owned()
        }));
        let this = Arc::clone(self);
        host.add_stylesheet_filter(Box::new(move |_: &str| {
            this.filter_template_override().to_owned()
        }));
    }

    /// Override value handed to the rendering layer, whatever it proposed.
    pub fn filter_template_override(&self) -> &str {
        self.matched_microsite().unwrap_or_default()
    }

    /// Copy of `all` without any of the known microsite template sets.
    pub fn filter_hidden_template_sets(&self, all: &TemplateSetListing) -> TemplateSetListing {
        let known = self.known_template_set_names();
        all.iter()
            .filter(|(name, _)| !known.contains(name.as_str()))
            .map(|(name, meta)| (name.clone(), meta.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ListingFilter, MockRenderHost, SelectionFilter};
    use crate::listing::{FsTemplateSetSource, MockTemplateSetSource};
    use crate::Error;
    use domain::template::TemplateSetMeta;
    use std::io;
    use tempfile::tempdir;

    const INDEX: &str = "index.php";

    fn listing_source(names: &'static [&'static str]) -> MockTemplateSetSource {
        let mut source = MockTemplateSetSource::new();
        source
            .expect_list()
            .times(1)
            .returning(move |_| Ok(names.iter().map(|s| s.to_string()).collect()));
        source
    }

    fn resolver_for(target: &str, source: MockTemplateSetSource) -> MicrositeResolver {
        let signals = RawRequestSignals::new(target, "", "", "");
        MicrositeResolver::new(signals, INDEX, source).with_template_sets_root_directory("/sites")
    }

    /// Keeps every registration so tests can invoke the filters.
    #[derive(Default)]
    struct RecordingHost {
        roots: Vec<PathBuf>,
        template: Vec<SelectionFilter>,
        stylesheet: Vec<SelectionFilter>,
        listing: Vec<ListingFilter>,
    }

    impl RenderHost for RecordingHost {
        fn register_template_root(&mut self, root: PathBuf) {
            self.roots.push(root);
        }
        fn add_template_filter(&mut self, filter: SelectionFilter) {
            self.template.push(filter);
        }
        fn add_stylesheet_filter(&mut self, filter: SelectionFilter) {
            self.stylesheet.push(filter);
        }
        fn add_listing_filter(&mut self, filter: ListingFilter) {
            self.listing.push(filter);
        }
    }

    fn listing(names: &[&str]) -> TemplateSetListing {
        names
            .iter()
            .map(|n| (n.to_string(), TemplateSetMeta::new(*n, "/themes")))
            .collect()
    }

    #[test]
    fn root_directory_round_trips() {
        let mut r = MicrositeResolver::new(RawRequestSignals::default(), INDEX, FsTemplateSetSource);
        assert_eq!(r.template_sets_root_directory(), Path::new(""));
        r.set_template_sets_root_directory("/var/www/microsites");
        assert_eq!(r.template_sets_root_directory(), Path::new("/var/www/microsites"));
    }

    #[test]
    fn matching_first_segment_is_a_microsite_request() {
        let r = resolver_for("client-a/about", listing_source(&[".", "..", "client-a", "client-b"]));

        assert_eq!(r.request_path(), "client-a/about");
        assert_eq!(r.microsite_name(), "client-a");
        assert!(r.is_microsite_request());
    }

    #[test]
    fn pseudo_entries_are_excluded() {
        let r = resolver_for("x", listing_source(&[".", "..", "client-a", "client-b"]));
        let names: Vec<&str> = r.known_template_set_names().iter().map(String::as_str).collect();
        assert_eq!(names, vec!["client-a", "client-b"]);
    }

    #[test]
    fn unknown_segment_is_not_a_microsite_request() {
        let r = resolver_for("unknown-slug/page", listing_source(&["client-a", "client-b"]));
        assert_eq!(r.microsite_name(), "unknown-slug");
        assert!(!r.is_microsite_request());
    }

    #[test]
    fn membership_is_case_sensitive() {
        let r = resolver_for("Foo/bar", listing_source(&["foo"]));
        assert!(!r.is_microsite_request());
    }

    #[test]
    fn empty_name_never_lists_the_directory() {
        let mut source = MockTemplateSetSource::new();
        source.expect_list().never();

        let r = resolver_for("index.php", source);
        assert_eq!(r.request_path(), "");
        assert_eq!(r.microsite_name(), "");
        assert!(!r.is_microsite_request());
    }

    #[test]
    fn empty_entry_in_listing_is_ignored() {
        let r = resolver_for("x", listing_source(&["", "client-a"]));
        assert!(!r.known_template_set_names().contains(""));
    }

    #[test]
    fn repeated_queries_list_the_directory_once() {
        // `times(1)` on the mock fails the test on a second listing.
        let r = resolver_for("client-a/about", listing_source(&["client-a"]));

        for _ in 0..3 {
            assert_eq!(r.microsite_name(), "client-a");
            assert!(r.is_microsite_request());
        }
        assert!(std::ptr::eq(r.request_path(), r.request_path()));
    }

    #[test]
    fn unreadable_root_recognizes_no_microsites() {
        let mut source = MockTemplateSetSource::new();
        source.expect_list().times(1).returning(|root| {
            Err(Error::unreadable(
                root,
                io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            ))
        });

        let r = resolver_for("client-a/about", source);
        assert!(r.known_template_set_names().is_empty());
        assert!(!r.is_microsite_request());
    }

    #[test]
    fn missing_root_on_disk_recognizes_no_microsites() {
        let tmp = tempdir().unwrap();
        let signals = RawRequestSignals::new("client-a", "", "", "");
        let r = MicrositeResolver::new(signals, INDEX, FsTemplateSetSource)
            .with_template_sets_root_directory(tmp.path().join("missing"));

        assert!(!r.is_microsite_request());
    }

    #[test]
    fn real_directory_scenario() {
        let tmp = tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("client-a")).unwrap();
        std::fs::create_dir(tmp.path().join("client-b")).unwrap();

        let signals = RawRequestSignals::from_request_target("/blog/client-b/team", INDEX, "/blog");
        let r = MicrositeResolver::new(signals, INDEX, FsTemplateSetSource)
            .with_template_sets_root_directory(tmp.path());

        assert_eq!(r.request_path(), "client-b/team");
        assert!(r.is_microsite_request());
    }

    #[test]
    fn load_registers_overrides_for_microsite() {
        let r = Arc::new(resolver_for("client-a/about", listing_source(&["client-a", "client-b"])));
        let mut host = RecordingHost::default();

        r.load(&mut host);

        assert_eq!(host.roots, vec![PathBuf::from("/sites")]);
        assert_eq!(host.template.len(), 1);
        assert_eq!(host.stylesheet.len(), 1);
        assert_eq!(host.listing.len(), 1);
        assert_eq!(r.matched_microsite(), Some("client-a"));
        assert_eq!(r.filter_template_override(), "client-a");

        // The proposed value is ignored.
        assert_eq!((host.template[0])("default"), "client-a");
        assert_eq!((host.stylesheet[0])("anything"), "client-a");
    }

    #[test]
    fn load_without_match_registers_root_and_listing_only() {
        let r = Arc::new(resolver_for("unknown-slug/page", listing_source(&["client-a"])));

        let mut host = MockRenderHost::new();
        host.expect_register_template_root()
            .withf(|root| root == Path::new("/sites"))
            .times(1)
            .return_const(());
        host.expect_add_listing_filter().times(1).return_const(());
        host.expect_add_template_filter().never();
        host.expect_add_stylesheet_filter().never();

        r.load(&mut host);

        assert_eq!(r.matched_microsite(), None);
        assert_eq!(r.filter_template_override(), "");
    }

    #[test]
    fn registered_listing_filter_hides_microsites() {
        let r = Arc::new(resolver_for("", listing_source(&["client-a", "client-b"])));
        let mut host = RecordingHost::default();
        r.load(&mut host);

        let out = (host.listing[0])(listing(&["default", "client-a", "client-b", "other"]));
        let names: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["default", "other"]);
    }

    #[test]
    fn hidden_filter_keeps_unrelated_entries_untouched() {
        let r = resolver_for("x", listing_source(&["client-a"]));

        let all = listing(&["client-a", "default"])
            .into_iter()
            .map(|(k, v)| (k, v.with_display_name("Pretty")))
            .collect::<TemplateSetListing>();
        let out = r.filter_hidden_template_sets(&all);

        assert_eq!(out.len(), 1);
        assert_eq!(out["default"], all["default"]);
        // input is not mutated
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn hidden_filter_handles_empty_and_disjoint_listings() {
        let r = resolver_for("x", listing_source(&["client-a"]));

        assert!(r.filter_hidden_template_sets(&TemplateSetListing::new()).is_empty());

        let disjoint = listing(&["default", "other"]);
        assert_eq!(r.filter_hidden_template_sets(&disjoint), disjoint);
    }
}

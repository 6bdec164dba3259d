// crates/serve/src/uri.rs

//! Canonical request path derivation.
//!
//! A request can reach the front controller in two shapes:
//!   - path-info style: `/index.php/client-a/about`, where the intended
//!     path is the server-assigned path info
//!   - rewritten permalink style: `/client-a/about`, where the intended path
//!     is the request target itself
//!
//! Both are reduced to the same host-relative path with no leading or
//! trailing slash, no query string and the site base path removed.

use domain::request::RawRequestSignals;

/// The three candidate paths after query stripping, trimming and base path
/// removal. Only `path_info` and `request_target` decide the result;
/// `script_self` is kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPath {
    pub request_target: String,
    pub path_info: String,
    pub script_self: String,
}

/// Reduce each raw signal to a trimmed, base-relative path.
pub fn decompose(signals: &RawRequestSignals) -> RequestPath {
    // A literal `%` in path info is escaped before it is searched for in the
    // request target, matching how the target itself arrives encoded.
    let path_info = strip_query(&signals.path_info).replace('%', "%25");
    let request_target = strip_query(&signals.raw_request_target);
    let home_path = signals.site_base_path.trim_matches('/');

    let request_target = if path_info.is_empty() {
        request_target.to_owned()
    } else {
        request_target.replacen(path_info.as_str(), "", 1)
    };

    RequestPath {
        request_target: strip_home(&request_target, home_path),
        path_info: strip_home(&path_info, home_path),
        script_self: strip_home(&signals.script_self_path, home_path),
    }
}

/// Canonical path for a request.
///
/// Path info wins when it is present and does not just name the front
/// controller. A request target that is exactly the front controller
/// normalizes to the empty path.
#[tracing::instrument(skip_all)]
pub fn normalize_request_path(signals: &RawRequestSignals, front_controller: &str) -> String {
    let parts = decompose(signals);

    if !parts.path_info.is_empty() && !parts.path_info.ends_with(front_controller) {
        parts.path_info
    } else if parts.request_target == front_controller {
        String::new()
    } else {
        parts.request_target
    }
}

fn strip_query(raw: &str) -> &str {
    match raw.split_once('?') {
        Some((path, _)) => path,
        None => raw,
    }
}

/// Trim slashes, drop one leading `home_path` (ASCII case-insensitive) and
/// trim again.
fn strip_home(path: &str, home_path: &str) -> String {
    let path = path.trim_matches('/');
    let stripped = strip_prefix_ignore_ascii_case(path, home_path).unwrap_or(path);
    stripped.trim_matches('/').to_owned()
}

fn strip_prefix_ignore_ascii_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.as_bytes().get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix.as_bytes()) {
        s.get(prefix.len()..)
    } else {
        None
    }
}

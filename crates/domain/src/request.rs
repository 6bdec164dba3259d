use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

/// The path-like server variables a request arrives with.
///
/// Every field may be empty; normalization treats a missing value the same
/// as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRequestSignals {
    /// Request target as sent by the client, query string included.
    pub raw_request_target: String,

    /// Extra path appended after the front controller (CGI `PATH_INFO`).
    pub path_info: String,

    /// Path of the executing script plus any path info (CGI `PHP_SELF`).
    pub script_self_path: String,

    /// Path component of the configured site base URL.
    pub site_base_path: String,
}

impl RawRequestSignals {
    pub fn new(
        raw_request_target: impl Into<String>,
        path_info: impl Into<String>,
        script_self_path: impl Into<String>,
        site_base_path: impl Into<String>,
    ) -> Self {
        Self {
            raw_request_target: raw_request_target.into(),
            path_info: path_info.into(),
            script_self_path: script_self_path.into(),
            site_base_path: site_base_path.into(),
        }
    }

    /// Derive the CGI-style signals for a request target the way a front
    /// controller deployment would see them.
    ///
    /// When a path segment equals `front_controller`, everything after it is
    /// path info and the script path covers the controller plus that path
    /// info. Otherwise the request was rewritten onto the controller, so path
    /// info is empty and the script path is `<site_base_path>/<front_controller>`.
    ///
    /// Like CGI `PATH_INFO`, path info and the script path are percent-decoded
    /// and carry no query string; the request target is kept as sent.
    #[tracing::instrument(skip_all)]
    pub fn from_request_target(target: &str, front_controller: &str, site_base_path: &str) -> Self {
        let path = match target.split_once('?') {
            Some((path, _query)) => path,
            None => target,
        };

        let mut offset = 0;
        let mut controller_end = None;
        if !front_controller.is_empty() {
            for segment in path.split('/') {
                let end = offset + segment.len();
                if segment == front_controller {
                    controller_end = Some(end);
                    break;
                }
                offset = end + 1;
            }
        }

        let (path_info, script_self_path) = match controller_end {
            Some(end) => (decode(&path[end..]), decode(path)),
            None => {
                let base = site_base_path.trim_matches('/');
                let script = if base.is_empty() {
                    format!("/{front_controller}")
                } else {
                    format!("/{base}/{front_controller}")
                };
                (String::new(), script)
            }
        };

        Self {
            raw_request_target: target.to_owned(),
            path_info,
            script_self_path,
            site_base_path: site_base_path.to_owned(),
        }
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Path component of a site base URL.
///
/// A value that does not parse as an absolute URL is taken to already be a
/// path, so `"/blog"` and `"https://example.com/blog"` give the same result.
pub fn site_base_path(base_url: &str) -> String {
    match Url::parse(base_url) {
        Ok(url) => url.path().to_owned(),
        Err(_) => base_url.to_owned(),
    }
}

// crates/edge/src/router.rs

use adapt::{http::MicrositeLayer, render::render_page, Site, ThemeHost};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use domain::template::ThemeSelection;
use serve::MicrositeResolver;
use std::sync::Arc;
use tracing::{debug, error};

pub const X_TEMPLATE: &str = "x-template";
pub const X_STYLESHEET: &str = "x-stylesheet";

// ─────────────────────────────────────────────────────────────────────────────
// Router construction
// ─────────────────────────────────────────────────────────────────────────────

/// Build the application router.
///
/// - `GET <admin path>` returns the template-set listing with microsites
///   hidden
/// - everything else renders a page with the request's template set
#[tracing::instrument(skip_all)]
pub fn build_app_router(site: Arc<Site>) -> Router {
    Router::new()
        .route(&site.admin_path, get(listing_handler))
        .fallback(page_handler)
        .layer(MicrositeLayer::new(site))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all)]
async fn listing_handler(Extension(host): Extension<Arc<ThemeHost>>) -> impl IntoResponse {
    Json(host.template_sets_for_listing())
}

#[tracing::instrument(skip_all)]
async fn page_handler(
    Extension(selection): Extension<ThemeSelection>,
    Extension(host): Extension<Arc<ThemeHost>>,
    Extension(resolver): Extension<Arc<MicrositeResolver>>,
) -> Response {
    debug!(
        "page for {:?} with {}/{}",
        resolver.request_path(),
        selection.template,
        selection.stylesheet
    );

    match render_page(&selection, host.roots(), resolver.request_path()) {
        Ok(html) => {
            let mut resp = (
                [(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"))],
                html,
            )
                .into_response();
            insert_selection_headers(&mut resp, &selection);
            resp
        }
        Err(e) => {
            error!(
                "render failed for template set {}: {}",
                selection.stylesheet, e
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering error").into_response()
        }
    }
}

fn insert_selection_headers(resp: &mut Response, selection: &ThemeSelection) {
    let headers = resp.headers_mut();
    // Names with bytes a header cannot carry are simply not echoed.
    if let Ok(v) = HeaderValue::from_str(&selection.template) {
        headers.insert(X_TEMPLATE, v);
    }
    if let Ok(v) = HeaderValue::from_str(&selection.stylesheet) {
        headers.insert(X_STYLESHEET, v);
    }
}

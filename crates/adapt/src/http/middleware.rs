// crates/adapt/src/http/middleware.rs

//! Tower middleware that decides the template set for every request.
//!
//! Each request gets its own resolver and host; nothing derived from one
//! request is visible to another. The outcome is placed in the request
//! extensions:
//!   - `ThemeSelection`: template, stylesheet and matched microsite
//!   - `Arc<ThemeHost>`: the host with all filters registered, for handlers
//!     that need the filtered admin listing
//!   - `Arc<MicrositeResolver>`: the request path and match decision

use crate::host::ThemeHost;
use crate::site::Site;

use axum::{body::Body, http::Request, response::Response};
use futures::future::BoxFuture;
use std::{
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

// ─────────────────────────────────────────────────────────────────────────────
// MicrositeLayer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MicrositeLayer {
    site: Arc<Site>,
}

impl MicrositeLayer {
    pub fn new(site: Arc<Site>) -> Self {
        Self { site }
    }
}

impl<S> Layer<S> for MicrositeLayer {
    type Service = MicrositeMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MicrositeMiddleware {
            inner,
            site: self.site.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MicrositeMiddleware
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MicrositeMiddleware<S> {
    inner: S,
    site: Arc<Site>,
}

impl<S> Service<Request<Body>> for MicrositeMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    #[tracing::instrument(skip_all, fields(uri = %req.uri()))]
    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        // Take the service that was driven to readiness, leave a clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let target = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_else(|| req.uri().path().to_owned());

        let resolution = self.site.resolve(&target);
        let host: Arc<ThemeHost> = Arc::new(resolution.host);

        req.extensions_mut().insert(resolution.selection);
        req.extensions_mut().insert(host);
        req.extensions_mut().insert(resolution.resolver);

        Box::pin(async move { inner.call(req).await })
    }
}

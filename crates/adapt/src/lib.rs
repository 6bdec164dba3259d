pub mod discovery;
pub mod host;
pub mod http;
pub mod render;
pub mod site;

pub use host::ThemeHost;
pub use site::{Resolution, Site};

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("manifest error: {0}")]
    Manifest(String),
}

impl Error {
    #[inline]
    pub fn manifest(msg: impl Into<String>) -> Self {
        Error::Manifest(msg.into())
    }
}

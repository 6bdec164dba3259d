pub mod host;
pub mod listing;
pub mod resolver;
pub mod uri;

pub use host::{ListingFilter, RenderHost, SelectionFilter};
pub use listing::{FsTemplateSetSource, TemplateSetSource};
pub use resolver::MicrositeResolver;
pub use uri::{decompose, normalize_request_path, RequestPath};

use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("template sets root {path:?} is unreadable: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::DirectoryUnreadable {
            path: path.into(),
            source,
        }
    }
}

pub mod middleware;

pub use middleware::{MicrositeLayer, MicrositeMiddleware};

mod http_backend;
mod http_blob_store;
mod wire;
mod ws_push;

pub use http_backend::{BackendError, HttpBackend};
pub use http_blob_store::HttpBlobStore;
pub use ws_push::WsPushChannel;

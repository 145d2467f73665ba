//! Upload pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! multipart request handler
//!     → pipeline.rs batch(category)       per-request file counting
//!     → accept: type / size / cap checks  first failure wins
//!     → random v4 id + preserved extension
//!     → store.rs write (atomic)           {root}/{directory}/{id}{ext}
//!     → UploadedAsset descriptor → URL via url_for
//! ```

pub mod pipeline;
pub mod store;
pub mod types;

pub use pipeline::{UploadBatch, UploadPipeline, PUBLIC_URL_PREFIX};
pub use store::{FsStore, StorageBackend};
pub use types::{Category, DeleteError, UploadError, UploadedAsset};

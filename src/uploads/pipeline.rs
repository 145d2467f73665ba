//! Upload acceptance, naming, and deletion.
//!
//! # Responsibilities
//! - Validate declared type, size, and per-request file count
//! - Name stored files collision-free (random v4 id + preserved extension)
//! - Map stored assets to public URLs, and delete them idempotently
//!
//! # Design Decisions
//! - Ids are random, never derived from content or filename: concurrent
//!   uploads need no coordination and no check-then-write
//! - Existence on disk is the source of truth, there is no manifest
//! - No reference counting: deleting a referencing document without calling
//!   delete here leaves the file orphaned (known limitation)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::config::schema::{CategoryConfig, UploadConfig};
use crate::observability::metrics;
use crate::uploads::store::StorageBackend;
use crate::uploads::types::{Category, DeleteError, UploadError, UploadedAsset};

/// URL prefix under which stored assets are served.
pub const PUBLIC_URL_PREFIX: &str = "/uploads";

/// Validated upload intake for both categories.
pub struct UploadPipeline {
    config: UploadConfig,
    root: PathBuf,
    store: Arc<dyn StorageBackend>,
}

impl UploadPipeline {
    /// Construct the pipeline and provision both category directories.
    ///
    /// Provisioning is recursive and idempotent; it happens once here, never
    /// on the per-request path.
    pub fn new(config: UploadConfig, store: Arc<dyn StorageBackend>) -> std::io::Result<Self> {
        let root = PathBuf::from(&config.root_dir);
        let pipeline = Self { config, root, store };

        for category in Category::ALL {
            let dir = pipeline.category_dir(category);
            pipeline.store.provision(&dir)?;
            tracing::debug!(category = %category, dir = %dir.display(), "Upload directory ready");
        }

        Ok(pipeline)
    }

    /// Limits for a category, from configuration.
    pub fn limits(&self, category: Category) -> &CategoryConfig {
        match category {
            Category::BlogImages => &self.config.blog_images,
            Category::TestimonialImages => &self.config.testimonial_images,
        }
    }

    /// Resolve a URL/path segment back to its category.
    pub fn category_for_directory(&self, directory: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| self.limits(*c).directory == directory)
    }

    /// Start a per-request acceptance context for `category`.
    pub fn batch(&self, category: Category) -> UploadBatch<'_> {
        UploadBatch {
            pipeline: self,
            category,
            accepted: 0,
        }
    }

    /// Public URL for a stored asset: `/uploads/{directory}/{id}{extension}`.
    ///
    /// Pure path construction, no I/O, never fails.
    pub fn url_for(&self, category: Category, id: Uuid, extension: &str) -> String {
        format!(
            "{}/{}/{}{}",
            PUBLIC_URL_PREFIX,
            self.limits(category).directory,
            id,
            extension
        )
    }

    /// Remove a stored asset. Removing one that is already gone is success,
    /// so repeated cleanup calls are safe.
    pub fn delete(&self, category: Category, id: Uuid, extension: &str) -> Result<(), DeleteError> {
        let file_name = format!("{}{}", id, extension);
        let path = self.asset_path(category, &file_name);

        let existed = self.store.remove(&path)?;
        if existed {
            metrics::record_upload_deleted(category.as_str());
            tracing::debug!(category = %category, file = %file_name, "Asset deleted");
        } else {
            tracing::debug!(category = %category, file = %file_name, "Asset already absent");
        }
        Ok(())
    }

    fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(&self.limits(category).directory)
    }

    fn asset_path(&self, category: Category, file_name: &str) -> PathBuf {
        self.category_dir(category).join(file_name)
    }
}

/// Per-request acceptance context.
///
/// Tracks how many files this request has stored so the category's file cap
/// applies across the whole request, not per file.
pub struct UploadBatch<'a> {
    pipeline: &'a UploadPipeline,
    category: Category,
    accepted: usize,
}

impl UploadBatch<'_> {
    /// Validate and store one file.
    ///
    /// Checks run in order and the first failure wins: declared type, then
    /// size (boundary inclusive), then the per-request cap.
    pub fn accept(
        &mut self,
        original_filename: &str,
        declared_mime: &str,
        data: &[u8],
    ) -> Result<UploadedAsset, UploadError> {
        let limits = self.pipeline.limits(self.category);

        if !declared_mime.starts_with("image/") {
            metrics::record_upload_rejected("unsupported_type");
            return Err(UploadError::UnsupportedType {
                mime_type: declared_mime.to_string(),
            });
        }

        let size_bytes = data.len() as u64;
        if size_bytes > limits.max_file_size_bytes {
            metrics::record_upload_rejected("too_large");
            return Err(UploadError::TooLarge {
                size_bytes,
                limit_bytes: limits.max_file_size_bytes,
            });
        }

        if self.accepted >= limits.max_files_per_request {
            metrics::record_upload_rejected("too_many_files");
            return Err(UploadError::TooManyFiles {
                limit: limits.max_files_per_request,
            });
        }

        let asset = UploadedAsset {
            id: Uuid::new_v4(),
            extension: extension_of(original_filename),
            category: self.category,
            size_bytes,
            mime_type: declared_mime.to_string(),
        };

        let path = self.pipeline.asset_path(self.category, &asset.file_name());
        self.pipeline.store.write(&path, data)?;
        self.accepted += 1;

        metrics::record_upload(self.category.as_str(), size_bytes);
        tracing::debug!(
            category = %self.category,
            file = %asset.file_name(),
            size_bytes,
            "Asset stored"
        );

        Ok(asset)
    }
}

/// Extension of the client-supplied filename, preserved verbatim with its
/// leading dot; empty when there is none.
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

//! Upload domain types.

use uuid::Uuid;

/// Storage bucket for uploaded images. Each category has its own directory
/// and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    BlogImages,
    TestimonialImages,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::BlogImages, Category::TestimonialImages];

    /// Stable name used for logging and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BlogImages => "blog-images",
            Category::TestimonialImages => "testimonial-images",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor for a stored upload.
///
/// The id is the on-disk filename stem; together with the preserved extension
/// it fully determines the storage path and public URL.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub id: Uuid,
    /// Original extension including the leading dot, empty when the client
    /// filename had none.
    pub extension: String,
    pub category: Category,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl UploadedAsset {
    /// On-disk filename: `{id}{extension}`.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.id, self.extension)
    }
}

/// Failure modes for accepting an upload.
///
/// The first three are client-input errors (4xx); `Storage` means the
/// environment failed us (5xx, logged).
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("unsupported content type {mime_type:?}, only images are accepted")]
    UnsupportedType { mime_type: String },

    #[error("file is {size_bytes} bytes, the limit is {limit_bytes}")]
    TooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("at most {limit} file(s) per request for this category")]
    TooManyFiles { limit: usize },

    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),
}

/// Failure mode for deleting a stored upload. A file that is already absent
/// is not an error.
#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),
}

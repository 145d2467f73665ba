//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows > 0, addresses parseable)
//! - Detect conflicting upload buckets (shared directories)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{CategoryConfig, GatewayConfig};

/// A single semantic violation in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),
    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    InvalidMetricsAddress(String),
    #[error("listener.request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,
    #[error("rate_limit.max_points must be greater than zero")]
    ZeroMaxPoints,
    #[error("rate_limit.window_secs must be greater than zero")]
    ZeroWindow,
    #[error("uploads.root_dir must not be empty")]
    EmptyUploadRoot,
    #[error("uploads.{0}.directory must not be empty")]
    EmptyCategoryDirectory(&'static str),
    #[error("uploads.{0}.directory must be a single path segment, got {1:?}")]
    NonSegmentCategoryDirectory(&'static str, String),
    #[error("uploads.{0}.max_file_size_bytes must be greater than zero")]
    ZeroFileSize(&'static str),
    #[error("uploads.{0}.max_files_per_request must be greater than zero")]
    ZeroFileCap(&'static str),
    #[error("upload buckets must use distinct directories, both use {0:?}")]
    DuplicateCategoryDirectory(String),
}

/// Check the configuration for semantic violations, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.rate_limit.max_points == Some(0) {
        errors.push(ValidationError::ZeroMaxPoints);
    }
    if config.rate_limit.window_secs == Some(0) {
        errors.push(ValidationError::ZeroWindow);
    }

    if config.uploads.root_dir.trim().is_empty() {
        errors.push(ValidationError::EmptyUploadRoot);
    }

    validate_category("blog_images", &config.uploads.blog_images, &mut errors);
    validate_category(
        "testimonial_images",
        &config.uploads.testimonial_images,
        &mut errors,
    );

    if !config.uploads.blog_images.directory.is_empty()
        && config.uploads.blog_images.directory == config.uploads.testimonial_images.directory
    {
        errors.push(ValidationError::DuplicateCategoryDirectory(
            config.uploads.blog_images.directory.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_category(name: &'static str, category: &CategoryConfig, errors: &mut Vec<ValidationError>) {
    if category.directory.trim().is_empty() {
        errors.push(ValidationError::EmptyCategoryDirectory(name));
    } else if category.directory.contains(['/', '\\']) || category.directory.contains("..") {
        // The directory name becomes both a filesystem path segment and a URL
        // segment; it must not traverse.
        errors.push(ValidationError::NonSegmentCategoryDirectory(
            name,
            category.directory.clone(),
        ));
    }

    if category.max_file_size_bytes == 0 {
        errors.push(ValidationError::ZeroFileSize(name));
    }
    if category.max_files_per_request == 0 {
        errors.push(ValidationError::ZeroFileCap(name));
    }
}

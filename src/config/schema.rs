//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the content gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Deployment mode: selects rate-limit profile and log format.
    pub mode: DeploymentMode,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Request admission (rate limiting) configuration.
    pub rate_limit: RateLimitConfig,

    /// Upload storage configuration.
    pub uploads: UploadConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Deployment mode flag.
///
/// Development selects the permissive admission profile and pretty logs;
/// production selects the strict profile and JSON logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    #[default]
    Development,
    Production,
}

impl DeploymentMode {
    pub fn is_development(self) -> bool {
        self == DeploymentMode::Development
    }
}

impl std::str::FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(DeploymentMode::Development),
            "production" | "prod" => Ok(DeploymentMode::Production),
            other => Err(format!("unknown deployment mode: {}", other)),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Total time budget for one request/response in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Rate limiting configuration.
///
/// The numeric fields are overrides; when absent, the deployment mode's
/// profile supplies the values (permissive in development, strict in
/// production).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum accepted requests per client per window.
    pub max_points: Option<u32>,

    /// Window length in seconds.
    pub window_secs: Option<u64>,

    /// Disable admission checks entirely. Honored only in development.
    pub bypass: bool,
}

/// 5 MiB per file for both buckets unless overridden.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Root directory under which category directories live.
    pub root_dir: String,

    /// Blog image bucket.
    pub blog_images: CategoryConfig,

    /// Testimonial image bucket.
    pub testimonial_images: CategoryConfig,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            root_dir: "uploads".to_string(),
            blog_images: CategoryConfig {
                directory: "blog-images".to_string(),
                max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
                max_files_per_request: 10,
            },
            testimonial_images: CategoryConfig {
                directory: "testimonial-images".to_string(),
                max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
                max_files_per_request: 1,
            },
        }
    }
}

impl UploadConfig {
    /// Ceiling for a whole multipart request body: the largest configured
    /// batch plus headroom for field boundaries and metadata.
    pub fn request_body_ceiling(&self) -> usize {
        let per_category = |c: &CategoryConfig| {
            c.max_file_size_bytes
                .saturating_mul(c.max_files_per_request as u64)
        };
        let largest = per_category(&self.blog_images).max(per_category(&self.testimonial_images));
        (largest + 1024 * 1024) as usize
    }
}

/// Per-bucket upload limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Directory name under the upload root (also the URL path segment).
    pub directory: String,

    /// Maximum size of a single file in bytes (boundary inclusive).
    pub max_file_size_bytes: u64,

    /// Maximum number of files accepted per request.
    pub max_files_per_request: usize,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            directory: String::new(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            max_files_per_request: 1,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

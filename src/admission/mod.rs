//! Request admission subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming API request:
//!     → middleware.rs (resolve client key from peer address)
//!     → controller.rs (fixed-window budget check per key)
//!     → allowed: pass request through untouched
//!     → denied: 429 + Retry-After / X-RateLimit-* headers + JSON body
//! ```
//!
//! # Design Decisions
//! - Advisory rate shaping, not authorization: protects capacity, not identity
//! - Missing client identity falls back to one shared budget, never an error
//! - Clock injected so tests control window expiry

pub mod clock;
pub mod controller;
pub mod middleware;

pub use clock::{Clock, SystemClock};
pub use controller::{AdmissionController, AdmissionSettings, Decision};
pub use middleware::admission_middleware;

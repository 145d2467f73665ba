//! Request identity plumbing.
//!
//! # Responsibilities
//! - Stamp every incoming request with a UUID request ID
//! - Propagate the ID onto the response for client-side correlation
//!
//! # Design Decisions
//! - ID added at the outermost layer so the trace span carries it

use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that generates a fresh UUID v4 `x-request-id` when absent.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

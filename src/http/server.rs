//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, admission, body limit)
//! - Serve stored uploads as static files
//! - Bind server to listener, drain gracefully on shutdown
//! - Own the admission controller's budget purge loop

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::admission::controller::{AdmissionController, AdmissionSettings};
use crate::admission::middleware::admission_middleware;
use crate::config::schema::GatewayConfig;
use crate::http::handlers::{
    delete_upload, health, upload_blog_images, upload_testimonial_images,
};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::metrics;
use crate::uploads::pipeline::UploadPipeline;
use crate::uploads::store::FsStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub admission: Arc<AdmissionController>,
    pub pipeline: Arc<UploadPipeline>,
    /// Whether the gateway runs in the permissive development profile;
    /// echoed in denial bodies.
    pub development: bool,
}

/// HTTP server for the content gateway.
pub struct HttpServer {
    router: Router,
    admission: Arc<AdmissionController>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Provisions the upload directories; failure here is a startup error,
    /// not something to discover on the first upload.
    pub fn new(config: GatewayConfig) -> std::io::Result<Self> {
        let settings = AdmissionSettings::from_config(&config.rate_limit, config.mode);
        tracing::info!(
            max_points = settings.max_points,
            window_secs = settings.window.as_secs(),
            bypass = settings.bypass,
            "Admission profile resolved"
        );

        let admission = Arc::new(AdmissionController::new(settings));
        let pipeline = Arc::new(UploadPipeline::new(
            config.uploads.clone(),
            Arc::new(FsStore::new()),
        )?);

        let state = AppState {
            admission: admission.clone(),
            pipeline,
            development: config.mode.is_development(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, admission })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let api = Router::new()
            .route("/uploads/blog-images", post(upload_blog_images))
            .route("/uploads/testimonial-images", post(upload_testimonial_images))
            .route("/uploads/{category}/{file}", delete(delete_upload))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                admission_middleware,
            ))
            .layer(DefaultBodyLimit::max(config.uploads.request_body_ceiling()));

        Router::new()
            .nest("/api", api)
            .route("/health", get(health))
            // Retrieval is plain static serving; disk is the source of truth.
            .nest_service("/uploads", ServeDir::new(&config.uploads.root_dir))
            .with_state(state)
            .layer(middleware::from_fn(track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server until the shutdown signal lands.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        // Stale budgets cost memory, nothing else; purging once per window
        // keeps the map bounded by active clients.
        let admission = self.admission.clone();
        let purge_interval = admission.settings().window.max(Duration::from_secs(1));
        let mut purge_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(purge_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let purged = admission.purge_stale();
                        if purged > 0 {
                            tracing::debug!(purged, "Stale client budgets dropped");
                        }
                    }
                    _ = purge_shutdown.recv() => break,
                }
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Record request count and latency for every response.
async fn track_requests(request: Request<Body>, next: axum::middleware::Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let response = next.run(request).await;

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

//! Fixed-window admission control.
//!
//! # Responsibilities
//! - Track a per-client request budget over a fixed window
//! - Decide allow/deny plus the advisory numbers the HTTP layer surfaces
//! - Garbage-collect budgets whose window has elapsed
//!
//! # Design Decisions
//! - Fixed window, not sliding: counter resets at window boundaries
//! - Sharded map keyed by client; read-check-decrement happens under the
//!   entry guard so two requests can never both consume the last point
//! - No I/O and no suspension: evaluate is synchronous
//! - This shapes capacity, it does not authenticate anyone

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

use crate::admission::clock::{Clock, SystemClock};
use crate::config::schema::{DeploymentMode, RateLimitConfig};

/// Permissive profile: iterative development against a local instance.
const PERMISSIVE_MAX_POINTS: u32 = 1000;
const PERMISSIVE_WINDOW_SECS: u64 = 60;

/// Strict profile: shared production capacity.
const STRICT_MAX_POINTS: u32 = 100;
const STRICT_WINDOW_SECS: u64 = 900;

/// Resolved admission settings: profile defaults with overrides applied.
#[derive(Debug, Clone)]
pub struct AdmissionSettings {
    pub max_points: u32,
    pub window: Duration,
    pub bypass: bool,
}

impl AdmissionSettings {
    /// Resolve the effective settings for a deployment mode.
    ///
    /// The bypass flag is only honored in development; a production config
    /// carrying it gets a warning and full enforcement.
    pub fn from_config(config: &RateLimitConfig, mode: DeploymentMode) -> Self {
        let (default_points, default_window) = match mode {
            DeploymentMode::Development => (PERMISSIVE_MAX_POINTS, PERMISSIVE_WINDOW_SECS),
            DeploymentMode::Production => (STRICT_MAX_POINTS, STRICT_WINDOW_SECS),
        };

        let bypass = if config.bypass && mode == DeploymentMode::Production {
            tracing::warn!("Rate limit bypass requested in production mode, ignoring");
            false
        } else {
            config.bypass
        };

        Self {
            max_points: config.max_points.unwrap_or(default_points),
            window: Duration::from_secs(config.window_secs.unwrap_or(default_window)),
            bypass,
        }
    }
}

/// The outcome of evaluating one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    /// Configured points per window, for the limit header.
    pub limit: u32,
    /// Points left in the current window after this evaluation.
    pub remaining: u32,
    /// Whole seconds until the window resets; zero when allowed.
    pub retry_after_secs: u64,
    /// Window reset time as unix seconds.
    pub reset_at: u64,
}

/// Per-client budget for the current window.
#[derive(Debug)]
struct RateBudget {
    points_remaining: u32,
    window_reset_at: SystemTime,
}

impl RateBudget {
    fn open(now: SystemTime, settings: &AdmissionSettings) -> Self {
        Self {
            points_remaining: settings.max_points,
            window_reset_at: now + settings.window,
        }
    }
}

/// Per-client fixed-window request admission.
///
/// Budgets are created lazily on a key's first request and dropped by
/// [`purge_stale`](Self::purge_stale) once their window has elapsed.
pub struct AdmissionController {
    settings: AdmissionSettings,
    budgets: DashMap<String, RateBudget>,
    clock: Arc<dyn Clock>,
}

impl AdmissionController {
    pub fn new(settings: AdmissionSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Construct with an injected clock. Tests use this to drive window
    /// expiry without sleeping.
    pub fn with_clock(settings: AdmissionSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            budgets: DashMap::new(),
            clock,
        }
    }

    pub fn settings(&self) -> &AdmissionSettings {
        &self.settings
    }

    /// Evaluate one request for the given client key.
    ///
    /// Never fails and performs no I/O. The entry guard is held across the
    /// read-check-decrement, so concurrent evaluations of the same key
    /// serialize; different keys only contend on their map shard.
    pub fn evaluate(&self, client_key: &str) -> Decision {
        let now = self.clock.now();

        if self.settings.bypass {
            return Decision {
                allowed: true,
                limit: self.settings.max_points,
                remaining: self.settings.max_points,
                retry_after_secs: 0,
                reset_at: unix_secs(now + self.settings.window),
            };
        }

        let mut entry = self
            .budgets
            .entry(client_key.to_string())
            .or_insert_with(|| RateBudget::open(now, &self.settings));
        let budget = entry.value_mut();

        if budget.window_reset_at <= now {
            *budget = RateBudget::open(now, &self.settings);
        }

        if budget.points_remaining > 0 {
            budget.points_remaining -= 1;
            Decision {
                allowed: true,
                limit: self.settings.max_points,
                remaining: budget.points_remaining,
                retry_after_secs: 0,
                reset_at: unix_secs(budget.window_reset_at),
            }
        } else {
            let wait = budget
                .window_reset_at
                .duration_since(now)
                .unwrap_or_default();
            Decision {
                allowed: false,
                limit: self.settings.max_points,
                remaining: 0,
                retry_after_secs: ceil_secs(wait),
                reset_at: unix_secs(budget.window_reset_at),
            }
        }
    }

    /// Drop every budget whose window has elapsed. Returns the number removed.
    pub fn purge_stale(&self) -> usize {
        let now = self.clock.now();
        let before = self.budgets.len();
        self.budgets.retain(|_, budget| budget.window_reset_at > now);
        before - self.budgets.len()
    }

    /// Number of clients currently holding a budget.
    pub fn tracked_clients(&self) -> usize {
        self.budgets.len()
    }
}

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

fn ceil_secs(d: Duration) -> u64 {
    let mut secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        secs += 1;
    }
    secs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::clock::ManualClock;

    fn settings(max_points: u32, window_secs: u64) -> AdmissionSettings {
        AdmissionSettings {
            max_points,
            window: Duration::from_secs(window_secs),
            bypass: false,
        }
    }

    fn controller(max_points: u32, window_secs: u64) -> (AdmissionController, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000)));
        let controller = AdmissionController::with_clock(settings(max_points, window_secs), clock.clone());
        (controller, clock)
    }

    #[test]
    fn test_allows_up_to_budget() {
        let (controller, _clock) = controller(5, 60);

        for i in 0..5 {
            let decision = controller.evaluate("10.0.0.1");
            assert!(decision.allowed, "request {} should be admitted", i + 1);
            assert_eq!(decision.remaining, 4 - i);
            assert_eq!(decision.limit, 5);
        }
    }

    #[test]
    fn test_denies_once_exhausted() {
        let (controller, _clock) = controller(3, 60);

        for _ in 0..3 {
            assert!(controller.evaluate("10.0.0.1").allowed);
        }

        let denied = controller.evaluate("10.0.0.1");
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert!(denied.retry_after_secs >= 1 && denied.retry_after_secs <= 60);
    }

    #[test]
    fn test_window_elapse_resets_budget() {
        let (controller, clock) = controller(2, 60);

        assert!(controller.evaluate("10.0.0.1").allowed);
        assert!(controller.evaluate("10.0.0.1").allowed);
        assert!(!controller.evaluate("10.0.0.1").allowed);

        clock.advance(Duration::from_secs(61));

        let decision = controller.evaluate("10.0.0.1");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
    }

    #[test]
    fn test_keys_are_isolated() {
        let (controller, _clock) = controller(1, 60);

        assert!(controller.evaluate("10.0.0.1").allowed);
        assert!(!controller.evaluate("10.0.0.1").allowed);

        // A different client still has its full budget.
        let other = controller.evaluate("10.0.0.2");
        assert!(other.allowed);
        assert_eq!(other.remaining, 0);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let (controller, clock) = controller(1, 60);

        assert!(controller.evaluate("10.0.0.1").allowed);
        clock.advance(Duration::from_millis(59_500));

        let denied = controller.evaluate("10.0.0.1");
        assert!(!denied.allowed);
        // 500ms left in the window still advertises a whole second.
        assert_eq!(denied.retry_after_secs, 1);
    }

    #[test]
    fn test_bypass_admits_unconditionally() {
        let mut s = settings(1, 60);
        s.bypass = true;
        let controller = AdmissionController::new(s);

        for _ in 0..100 {
            assert!(controller.evaluate("10.0.0.1").allowed);
        }
        assert_eq!(controller.tracked_clients(), 0);
    }

    #[test]
    fn test_bypass_ignored_in_production() {
        let config = RateLimitConfig {
            max_points: None,
            window_secs: None,
            bypass: true,
        };

        let dev = AdmissionSettings::from_config(&config, DeploymentMode::Development);
        assert!(dev.bypass);

        let prod = AdmissionSettings::from_config(&config, DeploymentMode::Production);
        assert!(!prod.bypass);
        assert_eq!(prod.max_points, 100);
        assert_eq!(prod.window, Duration::from_secs(900));
    }

    #[test]
    fn test_overrides_replace_profile_defaults() {
        let config = RateLimitConfig {
            max_points: Some(7),
            window_secs: Some(30),
            bypass: false,
        };

        let resolved = AdmissionSettings::from_config(&config, DeploymentMode::Production);
        assert_eq!(resolved.max_points, 7);
        assert_eq!(resolved.window, Duration::from_secs(30));
    }

    #[test]
    fn test_purge_drops_only_elapsed_windows() {
        let (controller, clock) = controller(5, 60);

        controller.evaluate("10.0.0.1");
        clock.advance(Duration::from_secs(30));
        controller.evaluate("10.0.0.2");
        assert_eq!(controller.tracked_clients(), 2);

        // 31s later the first window (opened at t=0) has elapsed, the second
        // (opened at t=30) has not.
        clock.advance(Duration::from_secs(31));
        assert_eq!(controller.purge_stale(), 1);
        assert_eq!(controller.tracked_clients(), 1);
    }

    #[test]
    fn test_concurrent_same_key_never_over_admits() {
        let max_points = 100;
        let controller = Arc::new(AdmissionController::new(settings(max_points, 60)));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let controller = controller.clone();
            handles.push(std::thread::spawn(move || {
                let mut admitted = 0u32;
                for _ in 0..50 {
                    if controller.evaluate("10.0.0.1").allowed {
                        admitted += 1;
                    }
                }
                admitted
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, max_points);
    }
}

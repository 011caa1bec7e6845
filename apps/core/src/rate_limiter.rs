use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A simple per-user rate limiter using a sliding window algorithm.
///
/// It tracks request timestamps for each `user_id` to decide whether a new
/// chat turn is allowed. Entries whose whole history has aged out of the
/// window are pruned on every check so the map does not grow unbounded.
pub struct RateLimiter {
    /// Stores timestamps of requests for each user.
    requests: HashMap<String, Vec<Instant>>,
    /// The maximum number of requests allowed within the `window`.
    limit: usize,
    /// The duration of the sliding window.
    window: Duration,
}

impl RateLimiter {
    /// Creates a new `RateLimiter` allowing `limit` requests per `window`.
    pub fn new(limit: usize, window: Duration) -> Self {
        RateLimiter {
            requests: HashMap::new(),
            limit,
            window,
        }
    }

    /// Checks if a request from `user_id` is allowed.
    ///
    /// If the request is allowed, it is recorded and the function returns
    /// `true`. Otherwise it returns `false`.
    pub fn check(&mut self, user_id: &str) -> bool {
        let now = Instant::now();
        let window_start = now - self.window;

        self.requests
            .retain(|_, stamps| stamps.iter().any(|&t| t > window_start));

        let user_requests = self.requests.entry(user_id.to_string()).or_default();
        user_requests.retain(|&timestamp| timestamp > window_start);

        if user_requests.len() < self.limit {
            user_requests.push(now);
            true
        } else {
            false
        }
    }
}

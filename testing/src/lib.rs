//! # Composable Collections Testing
//!
//! Testing utilities and helpers for collection reducers.
//!
//! This crate provides:
//! - Mock implementations of Environment traits ([`FixedClock`], [`MockTransport`])
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Effect assertions and a helper that resolves effects into their feedback actions
//!
//! ## Example
//!
//! ```ignore
//! use composable_collections_testing::{ReducerTest, assertions, test_clock};
//!
//! ReducerTest::new(CollectionsReducer::new())
//!     .with_env(test_environment())
//!     .given_state(CollectionsState::default())
//!     .when_action(fetch_busy("tags"))
//!     .then_state(|state| assert!(state.slice("tags").is_some_and(|s| s.is_fetching)))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

use chrono::{DateTime, Utc};
use composable_collections_core::environment::Clock;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use composable_collections_core::environment::{
        MutationRequest, Transport, TransportError, TransportFuture,
    };
    use serde_json::Value;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time until moved with [`FixedClock::advance`].
    ///
    /// ```
    /// use composable_collections_testing::mocks::FixedClock;
    /// use composable_collections_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward; clones share the same time
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }

    /// In-memory transport with canned responses
    ///
    /// `GET` responses are keyed by URL; unknown URLs answer 404. Mutation
    /// responses are served in FIFO order and default to `Ok(None)` (204).
    /// Every request is recorded for later inspection.
    #[derive(Debug, Clone, Default)]
    pub struct MockTransport {
        inner: Arc<Mutex<MockTransportInner>>,
    }

    #[derive(Debug, Default)]
    struct MockTransportInner {
        get_responses: HashMap<String, Result<Value, TransportError>>,
        mutation_responses: VecDeque<Result<Option<Value>, TransportError>>,
        requested_urls: Vec<String>,
        mutations: Vec<MutationRequest>,
    }

    impl MockTransport {
        /// Create an empty mock transport
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer `GET url` with the given body
        #[must_use]
        pub fn with_get(self, url: impl Into<String>, body: Value) -> Self {
            self.lock().get_responses.insert(url.into(), Ok(body));
            self
        }

        /// Answer `GET url` with the given error
        #[must_use]
        pub fn with_get_error(self, url: impl Into<String>, error: TransportError) -> Self {
            self.lock().get_responses.insert(url.into(), Err(error));
            self
        }

        /// Queue the response for the next mutation
        #[must_use]
        pub fn with_mutation_response(self, response: Result<Option<Value>, TransportError>) -> Self {
            self.lock().mutation_responses.push_back(response);
            self
        }

        /// URLs fetched so far, in order
        #[must_use]
        pub fn requested_urls(&self) -> Vec<String> {
            self.lock().requested_urls.clone()
        }

        /// Mutations sent so far, in order
        #[must_use]
        pub fn mutations(&self) -> Vec<MutationRequest> {
            self.lock().mutations.clone()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, MockTransportInner> {
            self.inner.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl Transport for MockTransport {
        fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a, Value> {
            let response = {
                let mut inner = self.lock();
                inner.requested_urls.push(url.to_string());
                inner.get_responses.get(url).cloned()
            };

            Box::pin(async move {
                response.unwrap_or_else(|| {
                    Err(TransportError::Status {
                        status: 404,
                        url: url.to_string(),
                        message: "Not Found".to_string(),
                        body: None,
                    })
                })
            })
        }

        fn send(&self, request: MutationRequest) -> TransportFuture<'_, Option<Value>> {
            let response = {
                let mut inner = self.lock();
                inner.mutations.push(request);
                inner.mutation_responses.pop_front()
            };

            Box::pin(async move { response.unwrap_or(Ok(None)) })
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    use composable_collections_core::effect::Effect;
    use futures::future::BoxFuture;

    /// Run effects to completion and collect the actions they feed back
    ///
    /// Futures are awaited in place, delays are skipped, and parallel
    /// effects are resolved in declaration order, so the result is
    /// deterministic. The reducer is not involved.
    pub fn resolve_effects<A>(effects: impl IntoIterator<Item = Effect<A>>) -> BoxFuture<'static, Vec<A>>
    where
        A: Send + 'static,
    {
        let effects: Vec<Effect<A>> = effects.into_iter().collect();
        Box::pin(async move {
            let mut actions = Vec::new();
            for effect in effects {
                match effect {
                    Effect::None => {},
                    Effect::Future(fut) => actions.extend(fut.await),
                    Effect::Delay { action, .. } => actions.push(*action),
                    Effect::Parallel(inner) | Effect::Sequential(inner) => {
                        actions.extend(resolve_effects(inner).await);
                    },
                }
            }
            actions
        })
    }

    /// Install a `tracing` subscriber for test output (`RUST_LOG` controlled)
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::resolve_effects;
pub use mocks::{FixedClock, MockTransport, test_clock};

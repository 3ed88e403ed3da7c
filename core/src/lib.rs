//! # Composable Collections Core
//!
//! Core traits and types for keeping remote API collections in a client-side
//! state store.
//!
//! This crate provides the abstractions every collection slice is built on:
//!
//! - **State**: A plain, `Clone`-able value owned by the store
//! - **Action**: All possible inputs to a reducer (requests and their outcomes)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies (clock, transport)
//!
//! ## Example
//!
//! ```
//! use composable_collections_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct FilterState {
//!     value: String,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum FilterAction {
//!     SetValue(String),
//! }
//!
//! struct FilterReducer;
//!
//! impl Reducer for FilterReducer {
//!     type State = FilterState;
//!     type Action = FilterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut FilterState,
//!         action: FilterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<FilterAction>; 4]> {
//!         match action {
//!             FilterAction::SetValue(value) => state.value = value,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = FilterState::default();
//! FilterReducer.reduce(&mut state, FilterAction::SetValue("gold".into()), &());
//! assert_eq!(state.value, "gold");
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Reducer composition utilities
pub mod composition;

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They hold every state transition of a feature and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed by the runtime
        ///
        /// Most actions produce no effect; the inline capacity of four keeps
        /// those returns allocation-free.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation (network requests to the collection API)
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap an async computation producing at most one follow-up action
        #[must_use]
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: std::future::Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Returns true if this is the no-op effect
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Collection reducers stamp `last_updated` and evaluate cache age
    /// through this trait, so tests can pin time with a fixed clock.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    pub use super::transport::{Method, MutationRequest, Transport, TransportError, TransportFuture};
}

/// Transport module - the HTTP collaborator boundary
///
/// Collections never talk to the network themselves. A [`Transport`] resolves a
/// request into a parsed JSON body or a structured [`TransportError`]; status
/// classification, CSRF headers and body encoding all live behind it.
pub mod transport {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use std::future::Future;
    use std::pin::Pin;
    use thiserror::Error;

    /// Boxed future returned by [`Transport`] methods
    pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send + 'a>>;

    /// Errors surfaced by a transport
    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum TransportError {
        /// The server answered with a non-2xx status
        #[error("Request to {url} failed with status {status}: {message}")]
        Status {
            /// HTTP status code
            status: u16,
            /// Requested URL
            url: String,
            /// Status text
            message: String,
            /// Parsed error body, when the server sent JSON
            body: Option<Value>,
        },

        /// The response body was not valid JSON
        #[error("Invalid JSON response from {url}: {message}")]
        InvalidJson {
            /// Requested URL
            url: String,
            /// Parser message
            message: String,
        },

        /// The request never produced a response
        #[error("Network error: {0}")]
        Network(String),
    }

    impl TransportError {
        /// Notification identifier for user-facing error toasts
        #[must_use]
        pub fn notification_id(&self) -> String {
            match self {
                Self::Status { status: 400, .. } => "400_BAD_REQUEST".to_string(),
                Self::Status { status: 403, .. } => "403_FORBIDDEN".to_string(),
                Self::Status { status: 404, .. } => "404_NOT_FOUND".to_string(),
                Self::Status { status, .. } => format!("{status}_UNEXPECTED_RESPONSE"),
                Self::InvalidJson { .. } => "INVALID_JSON_RESPONSE".to_string(),
                Self::Network(_) => "NETWORK_ERROR".to_string(),
            }
        }

        /// JSON error body sent by the server, if any
        #[must_use]
        pub const fn body(&self) -> Option<&Value> {
            match self {
                Self::Status { body, .. } => body.as_ref(),
                Self::InvalidJson { .. } | Self::Network(_) => None,
            }
        }
    }

    /// Mutation methods used by collection commands
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum Method {
        /// Create a record
        Post,
        /// Partially update a record
        Patch,
        /// Delete a record
        Delete,
    }

    impl std::fmt::Display for Method {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Post => write!(f, "POST"),
                Self::Patch => write!(f, "PATCH"),
                Self::Delete => write!(f, "DELETE"),
            }
        }
    }

    /// A create, update or delete request
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct MutationRequest {
        /// HTTP method
        pub method: Method,
        /// Absolute URL
        pub url: String,
        /// JSON payload (absent for deletes)
        pub body: Option<Value>,
    }

    /// The HTTP collaborator
    ///
    /// Uses explicit boxed futures so it can be held as `Arc<dyn Transport>`
    /// in a reducer environment.
    pub trait Transport: Send + Sync {
        /// Fetch a URL and return its parsed JSON body
        fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a, Value>;

        /// Perform a mutation; `None` means the server sent no content (204)
        fn send(&self, request: MutationRequest) -> TransportFuture<'_, Option<Value>>;
    }
}

//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use composable_collections_core::{SmallVec, effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// Several actions may be given with [`ReducerTest::when_action`]; they are
/// applied in order and the effect assertions see the effects of the last one.
///
/// # Example
///
/// ```ignore
/// use composable_collections_testing::{ReducerTest, assertions};
///
/// ReducerTest::new(CollectionReducer::new("tags"))
///     .with_env(test_environment())
///     .given_state(CollectionSlice::default())
///     .when_action(set_sort_key("tags", "title"))
///     .when_action(set_sort_key("tags", "title"))
///     .then_state(|slice| {
///         assert_eq!(slice.sort_direction, Some(SortDirection::Desc));
///     })
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an action to apply (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects of the last action (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let mut effects: SmallVec<[Effect<A>; 4]> = SmallVec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env);
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use composable_collections_core::effect::Effect;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if effects is not empty.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composable_collections_core::smallvec;

    #[derive(Clone, Debug, Default)]
    struct BusyState {
        busy_ids: Vec<u64>,
    }

    #[derive(Clone, Debug)]
    enum BusyAction {
        SetBusy { id: u64, busy: bool },
        Refresh,
    }

    struct BusyReducer;

    struct TestEnv;

    impl Reducer for BusyReducer {
        type State = BusyState;
        type Action = BusyAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                BusyAction::SetBusy { id, busy: true } => {
                    if !state.busy_ids.contains(&id) {
                        state.busy_ids.push(id);
                    }
                    smallvec![Effect::None]
                },
                BusyAction::SetBusy { id, busy: false } => {
                    state.busy_ids.retain(|busy_id| *busy_id != id);
                    smallvec![Effect::None]
                },
                BusyAction::Refresh => smallvec![Effect::future(async { None })],
            }
        }
    }

    #[test]
    fn single_action() {
        ReducerTest::new(BusyReducer)
            .with_env(TestEnv)
            .given_state(BusyState::default())
            .when_action(BusyAction::SetBusy { id: 15, busy: true })
            .then_state(|state| {
                assert_eq!(state.busy_ids, vec![15]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn actions_apply_in_order() {
        ReducerTest::new(BusyReducer)
            .with_env(TestEnv)
            .given_state(BusyState { busy_ids: vec![9, 8] })
            .when_action(BusyAction::SetBusy { id: 15, busy: true })
            .when_action(BusyAction::SetBusy { id: 9, busy: false })
            .then_state(|state| {
                assert_eq!(state.busy_ids, vec![8, 15]);
            })
            .run();
    }

    #[test]
    fn effects_come_from_last_action() {
        ReducerTest::new(BusyReducer)
            .with_env(TestEnv)
            .given_state(BusyState::default())
            .when_action(BusyAction::SetBusy { id: 1, busy: true })
            .when_action(BusyAction::Refresh)
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn no_effect_assertions_accept_empty_and_none() {
        assertions::assert_no_effects::<BusyAction>(&[Effect::None]);
        assertions::assert_no_effects::<BusyAction>(&[]);
    }
}

//! Rules and the environment they are assembled into.
//!
//! This crate defines the pieces a synthesis search is configured with:
//! - [`Function`]: typed steps with an opaque `execute`
//! - [`Axiom`], [`SolutionAxiom`], [`Heuristic`]: pruning, acceptance and ranking rules
//! - [`RuleHolder`]: lets any rule declare further rules it depends on
//! - [`EnvironmentBuilder`]: registers rules and closes them into a frozen [`Environment`]
//! - [`Pipeline`]: the partial/complete pipeline the rules are evaluated against

pub mod builder;
pub mod downcast;
pub mod environment;
pub mod function;
pub mod pipeline;
pub mod rules;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use builder::{BuildError, EnvironmentBuilder};
pub use downcast::{NoRedundantDowncast, downcast_functions};
pub use environment::{Environment, NOT_PRESENT};
pub use function::{
    FnFunction, Function, FunctionError, FunctionId, FunctionKind, InputFunction, OutputFunction,
    SharedFunction,
};
pub use pipeline::{Pipeline, PoolPolicy, Producer, Slot, SlotId, Step};
pub use rules::{Axiom, Heuristic, Rule, RuleHolder, RuleKey, RuleKind, SolutionAxiom};
pub use value::DataInstance;

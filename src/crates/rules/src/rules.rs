//! Axioms, solution axioms, heuristics and the rule-holder capability that ties them together.
//!
//! Any function, axiom or heuristic may declare further rules it needs in order to behave
//! correctly. The environment builder pulls those in transitively (see
//! [`crate::builder::EnvironmentBuilder::build`]). Rules are deduplicated by identity: two
//! `Arc`s pointing at the same rule count once, two separately allocated rules count twice.

use std::fmt;
use std::sync::Arc;

use crate::environment::Environment;
use crate::function::Function;
use crate::pipeline::Pipeline;

/// Declares the rules a component depends on. Every method defaults to "nothing".
pub trait RuleHolder {
    fn required_axioms(&self) -> Vec<Arc<dyn Axiom>> {
        Vec::new()
    }

    fn required_solution_axioms(&self) -> Vec<Arc<dyn SolutionAxiom>> {
        Vec::new()
    }

    fn required_heuristics(&self) -> Vec<Arc<dyn Heuristic>> {
        Vec::new()
    }
}

/// Validity check on a partial pipeline. States failing any axiom never enter the frontier.
pub trait Axiom: RuleHolder + Send + Sync + 'static {
    fn is_valid(&self, pipeline: &Pipeline, env: &Environment) -> bool;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Acceptance check on a complete pipeline, run before it is returned as the solution.
pub trait SolutionAxiom: RuleHolder + Send + Sync + 'static {
    fn accepts(&self, pipeline: &Pipeline, env: &Environment) -> bool;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Non-negative estimate of the remaining cost from a partial pipeline to the goal.
pub trait Heuristic: RuleHolder + Send + Sync + 'static {
    fn estimate(&self, pipeline: &Pipeline, env: &Environment) -> f64;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Function,
    Axiom,
    SolutionAxiom,
    Heuristic,
}

/// Identity of a registered rule: its kind plus the address of its shared allocation.
///
/// Only meaningful while the rule is kept alive, which the builder and environment guarantee by
/// holding the `Arc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleKey {
    kind: RuleKind,
    addr: usize,
}

impl RuleKey {
    fn of<T: ?Sized>(kind: RuleKind, rule: &Arc<T>) -> Self {
        Self {
            kind,
            addr: Arc::as_ptr(rule) as *const () as usize,
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }
}

/// Any one of the rule kinds an environment is assembled from.
#[derive(Clone)]
pub enum Rule {
    Function(Arc<dyn Function>),
    Axiom(Arc<dyn Axiom>),
    SolutionAxiom(Arc<dyn SolutionAxiom>),
    Heuristic(Arc<dyn Heuristic>),
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Function(_) => RuleKind::Function,
            Rule::Axiom(_) => RuleKind::Axiom,
            Rule::SolutionAxiom(_) => RuleKind::SolutionAxiom,
            Rule::Heuristic(_) => RuleKind::Heuristic,
        }
    }

    pub fn key(&self) -> RuleKey {
        match self {
            Rule::Function(f) => RuleKey::of(RuleKind::Function, f),
            Rule::Axiom(a) => RuleKey::of(RuleKind::Axiom, a),
            Rule::SolutionAxiom(a) => RuleKey::of(RuleKind::SolutionAxiom, a),
            Rule::Heuristic(h) => RuleKey::of(RuleKind::Heuristic, h),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Rule::Function(f) => f.name(),
            Rule::Axiom(a) => a.name(),
            Rule::SolutionAxiom(a) => a.name(),
            Rule::Heuristic(h) => h.name(),
        }
    }

    /// Rules this one directly requires.
    pub fn requirements(&self) -> Vec<Rule> {
        match self {
            Rule::Function(f) => requirements_of(f.as_ref()),
            Rule::Axiom(a) => requirements_of(a.as_ref()),
            Rule::SolutionAxiom(a) => requirements_of(a.as_ref()),
            Rule::Heuristic(h) => requirements_of(h.as_ref()),
        }
    }
}

fn requirements_of<H: RuleHolder + ?Sized>(holder: &H) -> Vec<Rule> {
    holder
        .required_axioms()
        .into_iter()
        .map(Rule::Axiom)
        .chain(
            holder
                .required_solution_axioms()
                .into_iter()
                .map(Rule::SolutionAxiom),
        )
        .chain(holder.required_heuristics().into_iter().map(Rule::Heuristic))
        .collect()
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always;

    impl RuleHolder for Always {}

    impl Axiom for Always {
        fn is_valid(&self, _pipeline: &Pipeline, _env: &Environment) -> bool {
            true
        }
    }

    struct NeedsAlways(Arc<dyn Axiom>);

    impl RuleHolder for NeedsAlways {
        fn required_axioms(&self) -> Vec<Arc<dyn Axiom>> {
            vec![self.0.clone()]
        }
    }

    impl Heuristic for NeedsAlways {
        fn estimate(&self, _pipeline: &Pipeline, _env: &Environment) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_key_is_identity() {
        let a: Arc<dyn Axiom> = Arc::new(Always);
        let b: Arc<dyn Axiom> = Arc::new(Always);
        assert_eq!(Rule::Axiom(a.clone()).key(), Rule::Axiom(a.clone()).key());
        assert_ne!(Rule::Axiom(a).key(), Rule::Axiom(b).key());
    }

    #[test]
    fn test_requirements() {
        let always: Arc<dyn Axiom> = Arc::new(Always);
        let holder = Rule::Heuristic(Arc::new(NeedsAlways(always.clone())));

        let reqs = holder.requirements();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].key(), Rule::Axiom(always).key());
        assert_eq!(reqs[0].kind(), RuleKind::Axiom);
        assert!(Rule::Axiom(Arc::new(Always)).requirements().is_empty());
    }
}

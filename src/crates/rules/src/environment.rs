//! The frozen, validated rule set a search runs against.

use std::collections::HashMap;
use std::sync::Arc;

use synth_lattice::{DataTypeId, TypeLattice};

use crate::function::{Function, FunctionId, FunctionKind};
use crate::pipeline::Pipeline;
use crate::rules::{Axiom, Heuristic, Rule, RuleKey, SolutionAxiom};

/// Value returned by [`Environment::position_of`] for functions that were never registered.
pub const NOT_PRESENT: isize = -1;

/// Immutable aggregate of functions, axioms and heuristics plus the single output function.
///
/// Produced by [`crate::builder::EnvironmentBuilder`]. Nothing is mutated after build, so an
/// environment can be shared (`Arc<Environment>`) across any number of concurrent searches.
pub struct Environment {
    lattice: Arc<TypeLattice>,
    functions: Vec<Arc<dyn Function>>,
    kinds: Vec<FunctionKind>,
    index: HashMap<RuleKey, FunctionId>,
    output: FunctionId,
    axioms: Vec<Arc<dyn Axiom>>,
    solution_axioms: Vec<Arc<dyn SolutionAxiom>>,
    heuristics: Vec<Arc<dyn Heuristic>>,
}

impl Environment {
    pub(crate) fn new(
        lattice: Arc<TypeLattice>,
        functions: Vec<Arc<dyn Function>>,
        output: FunctionId,
        axioms: Vec<Arc<dyn Axiom>>,
        solution_axioms: Vec<Arc<dyn SolutionAxiom>>,
        heuristics: Vec<Arc<dyn Heuristic>>,
    ) -> Self {
        let kinds = functions.iter().map(|f| f.kind()).collect();
        let index = functions
            .iter()
            .enumerate()
            .map(|(i, f)| (Rule::Function(f.clone()).key(), FunctionId(i as u32)))
            .collect();
        Self {
            lattice,
            functions,
            kinds,
            index,
            output,
            axioms,
            solution_axioms,
            heuristics,
        }
    }

    pub fn lattice(&self) -> &TypeLattice {
        &self.lattice
    }

    /// Registered functions in registration order; a function's position is its [`FunctionId`].
    pub fn functions(&self) -> &[Arc<dyn Function>] {
        &self.functions
    }

    pub fn function(&self, id: FunctionId) -> Option<&Arc<dyn Function>> {
        self.functions.get(id.index())
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Kind of `id` as reported at build time.
    pub fn kind(&self, id: FunctionId) -> Option<FunctionKind> {
        self.kinds.get(id.index()).copied()
    }

    /// Registration index of `function`, compared by identity.
    pub fn index_of(&self, function: &Arc<dyn Function>) -> Option<FunctionId> {
        self.index
            .get(&Rule::Function(function.clone()).key())
            .copied()
    }

    /// Like [`Environment::index_of`], with [`NOT_PRESENT`] for unknown functions.
    pub fn position_of(&self, function: &Arc<dyn Function>) -> isize {
        self.index_of(function)
            .map(|id| id.index() as isize)
            .unwrap_or(NOT_PRESENT)
    }

    pub fn output_id(&self) -> FunctionId {
        self.output
    }

    pub fn output_function(&self) -> &Arc<dyn Function> {
        &self.functions[self.output.index()]
    }

    /// Types the output function requires; the goal of every search.
    pub fn goal_types(&self) -> &[DataTypeId] {
        self.output_function().inputs()
    }

    pub fn input_ids(&self) -> impl Iterator<Item = FunctionId> + '_ {
        self.ids_of(FunctionKind::Input)
    }

    /// Functions the search may apply as steps.
    pub fn transform_ids(&self) -> impl Iterator<Item = FunctionId> + '_ {
        self.ids_of(FunctionKind::Transform)
    }

    fn ids_of(&self, kind: FunctionKind) -> impl Iterator<Item = FunctionId> + '_ {
        self.kinds
            .iter()
            .enumerate()
            .filter(move |(_, k)| **k == kind)
            .map(|(i, _)| FunctionId(i as u32))
    }

    pub fn axioms(&self) -> &[Arc<dyn Axiom>] {
        &self.axioms
    }

    pub fn solution_axioms(&self) -> &[Arc<dyn SolutionAxiom>] {
        &self.solution_axioms
    }

    pub fn heuristics(&self) -> &[Arc<dyn Heuristic>] {
        &self.heuristics
    }

    /// The pipeline every search starts from: no steps, the pool seeded by every input function.
    pub fn initial_pipeline(&self) -> Pipeline {
        let mut pipeline = Pipeline::new(self.functions.len());
        for id in self.input_ids() {
            pipeline.seed(id, self.functions[id.index()].outputs());
        }
        pipeline
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("functions", &self.functions.len())
            .field("output", &self.output_function().name())
            .field("axioms", &self.axioms.len())
            .field("solution_axioms", &self.solution_axioms.len())
            .field("heuristics", &self.heuristics.len())
            .finish()
    }
}

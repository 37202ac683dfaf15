//! Registration and closure of rules into an [`Environment`].
//!
//! The builder accepts functions, axioms, solution axioms and heuristics in any order. `build`
//! validates the function set, then repeatedly pulls in every rule required by a rule already
//! present until a pass adds nothing. Duplicates are suppressed by identity, so each pass either
//! grows the set or ends the loop.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use synth_lattice::{DataTypeId, LatticeError, TypeLattice};
use thiserror::Error;

use crate::environment::Environment;
use crate::function::{Function, FunctionId, FunctionKind};
use crate::rules::{Axiom, Heuristic, Rule, RuleKey, SolutionAxiom};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("no output function registered")]
    NoOutputFunction,
    #[error("{count} output functions registered, expected exactly one")]
    MultipleOutputFunctions { count: usize },
    #[error("no input function registered")]
    NoInputFunction,
    #[error("function '{function}' uses {ty}, which is not part of the lattice")]
    UnknownType { function: String, ty: DataTypeId },
    #[error(transparent)]
    Lattice(#[from] LatticeError),
}

/// Single-threaded registry that produces an [`Environment`].
///
/// # Example
///
/// ```ignore
/// let seed: Arc<dyn Function> = Arc::new(InputFunction::new("seed", vec![integer]));
/// let mut builder = EnvironmentBuilder::new(lattice);
/// let id = builder.add_function(seed.clone());
/// builder.add_function(Arc::new(OutputFunction::new("goal", vec![number])));
/// let env = builder.build()?;
/// assert_eq!(env.index_of(&seed), Some(id));
/// ```
pub struct EnvironmentBuilder {
    lattice: Arc<TypeLattice>,
    functions: Vec<Arc<dyn Function>>,
    function_ids: HashMap<RuleKey, FunctionId>,
    axioms: Vec<Arc<dyn Axiom>>,
    solution_axioms: Vec<Arc<dyn SolutionAxiom>>,
    heuristics: Vec<Arc<dyn Heuristic>>,
    // axioms, solution axioms and heuristics already held
    seen: HashSet<RuleKey>,
}

impl EnvironmentBuilder {
    pub fn new(lattice: Arc<TypeLattice>) -> Self {
        Self {
            lattice,
            functions: Vec::new(),
            function_ids: HashMap::new(),
            axioms: Vec::new(),
            solution_axioms: Vec::new(),
            heuristics: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn lattice(&self) -> &Arc<TypeLattice> {
        &self.lattice
    }

    /// Register a function and return its stable index. Registering the same function twice
    /// returns the index it already has.
    pub fn add_function(&mut self, function: Arc<dyn Function>) -> FunctionId {
        let key = Rule::Function(function.clone()).key();
        if let Some(id) = self.function_ids.get(&key) {
            log::debug!("builder: {} already registered as {}", function.name(), id);
            return *id;
        }
        let id = FunctionId(self.functions.len() as u32);
        self.function_ids.insert(key, id);
        self.functions.push(function);
        id
    }

    pub fn add_functions(&mut self, functions: impl IntoIterator<Item = Arc<dyn Function>>) {
        for function in functions {
            self.add_function(function);
        }
    }

    pub fn with_function(mut self, function: Arc<dyn Function>) -> Self {
        self.add_function(function);
        self
    }

    pub fn with_functions(
        mut self,
        functions: impl IntoIterator<Item = Arc<dyn Function>>,
    ) -> Self {
        self.add_functions(functions);
        self
    }

    /// Returns `false` if this exact axiom was already registered.
    pub fn add_axiom(&mut self, axiom: Arc<dyn Axiom>) -> bool {
        self.insert(Rule::Axiom(axiom))
    }

    pub fn add_solution_axiom(&mut self, axiom: Arc<dyn SolutionAxiom>) -> bool {
        self.insert(Rule::SolutionAxiom(axiom))
    }

    pub fn add_heuristic(&mut self, heuristic: Arc<dyn Heuristic>) -> bool {
        self.insert(Rule::Heuristic(heuristic))
    }

    pub fn with_axiom(mut self, axiom: Arc<dyn Axiom>) -> Self {
        self.add_axiom(axiom);
        self
    }

    pub fn with_solution_axiom(mut self, axiom: Arc<dyn SolutionAxiom>) -> Self {
        self.add_solution_axiom(axiom);
        self
    }

    pub fn with_heuristic(mut self, heuristic: Arc<dyn Heuristic>) -> Self {
        self.add_heuristic(heuristic);
        self
    }

    fn insert(&mut self, rule: Rule) -> bool {
        let key = rule.key();
        match rule {
            Rule::Function(function) => {
                let before = self.functions.len();
                self.add_function(function);
                self.functions.len() > before
            }
            Rule::Axiom(a) if self.seen.insert(key) => {
                self.axioms.push(a);
                true
            }
            Rule::SolutionAxiom(a) if self.seen.insert(key) => {
                self.solution_axioms.push(a);
                true
            }
            Rule::Heuristic(h) if self.seen.insert(key) => {
                self.heuristics.push(h);
                true
            }
            _ => false,
        }
    }

    fn rules(&self) -> impl Iterator<Item = Rule> + '_ {
        self.functions
            .iter()
            .cloned()
            .map(Rule::Function)
            .chain(self.axioms.iter().cloned().map(Rule::Axiom))
            .chain(self.solution_axioms.iter().cloned().map(Rule::SolutionAxiom))
            .chain(self.heuristics.iter().cloned().map(Rule::Heuristic))
    }

    /// Add every transitively required rule. Returns the number of passes that added something.
    fn close(&mut self) -> usize {
        let mut passes = 0;
        loop {
            let required: Vec<Rule> = self.rules().flat_map(|r| r.requirements()).collect();
            let added = required
                .into_iter()
                .filter(|rule| self.insert(rule.clone()))
                .count();
            if added == 0 {
                break;
            }
            passes += 1;
            log::debug!("builder: closure pass {} added {} rules", passes, added);
        }
        passes
    }

    fn validate(&self) -> Result<FunctionId, BuildError> {
        for function in &self.functions {
            let unknown = function
                .inputs()
                .iter()
                .chain(function.outputs())
                .find(|ty| !self.lattice.contains(**ty));
            if let Some(ty) = unknown {
                return Err(BuildError::UnknownType {
                    function: function.name().to_string(),
                    ty: *ty,
                });
            }
        }

        let outputs: Vec<FunctionId> = self
            .functions
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind() == FunctionKind::Output)
            .map(|(i, _)| FunctionId(i as u32))
            .collect();
        let output = match outputs.as_slice() {
            [] => return Err(BuildError::NoOutputFunction),
            [only] => *only,
            many => {
                return Err(BuildError::MultipleOutputFunctions { count: many.len() });
            }
        };

        if !self.functions.iter().any(|f| f.kind() == FunctionKind::Input) {
            return Err(BuildError::NoInputFunction);
        }
        Ok(output)
    }

    /// Validate, close and freeze. No partial environment is ever returned.
    pub fn build(mut self) -> Result<Environment, BuildError> {
        let output = self.validate()?;
        self.close();

        log::debug!(
            "builder: environment with {} functions, {} axioms, {} solution axioms, {} heuristics",
            self.functions.len(),
            self.axioms.len(),
            self.solution_axioms.len(),
            self.heuristics.len()
        );
        Ok(Environment::new(
            self.lattice,
            self.functions,
            output,
            self.axioms,
            self.solution_axioms,
            self.heuristics,
        ))
    }
}

impl std::fmt::Debug for EnvironmentBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentBuilder")
            .field("functions", &self.functions.len())
            .field("axioms", &self.axioms.len())
            .field("solution_axioms", &self.solution_axioms.len())
            .field("heuristics", &self.heuristics.len())
            .finish()
    }
}

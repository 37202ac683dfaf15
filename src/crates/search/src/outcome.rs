//! What a search reports back.

use synth_rules::{DataInstance, Environment, FunctionId, Pipeline, Step};

use crate::materialize::{ExecutionError, InputValues, execute_pipeline};

/// Which exploration bound stopped the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The expansion budget ran out.
    Expansions(usize),
    /// The frontier emptied, but some states were cut off at this depth.
    Depth(usize),
}

/// Result of a search. Non-resolution is an ordinary outcome, not an error.
#[derive(Debug)]
pub enum SearchOutcome {
    Solution(Solution),
    /// Every reachable state was explored and none was accepted.
    NotFound,
    /// An exploration bound was hit before the search could resolve.
    BoundExceeded(Bound),
    /// The search's [`crate::CancelToken`] was triggered.
    Cancelled,
}

impl SearchOutcome {
    pub fn is_solution(&self) -> bool {
        matches!(self, SearchOutcome::Solution(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SearchOutcome::Solution(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SearchOutcome::Solution(solution) => Some(solution),
            _ => None,
        }
    }
}

/// An accepted pipeline: ordered steps whose results satisfy the output function.
#[derive(Debug, Clone)]
pub struct Solution {
    pipeline: Pipeline,
}

impl Solution {
    pub(crate) fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// The complete pipeline, goal bindings included.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn steps(&self) -> &[Step] {
        self.pipeline.steps()
    }

    /// Applied functions in application order.
    pub fn functions(&self) -> Vec<FunctionId> {
        self.pipeline.steps().iter().map(Step::function).collect()
    }

    /// Number of applied steps, excluding input and output functions.
    pub fn len(&self) -> usize {
        self.pipeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipeline.is_empty()
    }

    pub fn cost(&self) -> f64 {
        self.pipeline.cost()
    }

    /// Run the pipeline and return what the output function produces.
    ///
    /// Input functions take their values from `inputs` when present there, otherwise from their
    /// own `execute`.
    pub fn execute(
        &self,
        env: &Environment,
        inputs: &InputValues,
    ) -> Result<Vec<DataInstance>, ExecutionError> {
        execute_pipeline(&self.pipeline, env, inputs)
    }
}

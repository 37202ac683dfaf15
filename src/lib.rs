//! Type-directed function synthesis.
//!
//! Register named types in a [`TypeLattice`], describe the available functions by their typed
//! signatures, assemble them with axioms and heuristics into an [`Environment`], and let a
//! [`Search`] discover a pipeline that carries the inputs to the output function.

pub use synth_heuristics as heuristics;
pub use synth_lattice as lattice;
pub use synth_rules as rules;
pub use synth_search as search;

pub use synth_lattice::{DataType, DataTypeId, Downcast, LatticeError, TypeLattice};
pub use synth_rules::{
    Axiom, BuildError, DataInstance, Environment, EnvironmentBuilder, FnFunction, Function,
    FunctionError, FunctionId, Heuristic, InputFunction, OutputFunction, Pipeline, PoolPolicy,
    Rule, RuleHolder, SolutionAxiom, downcast_functions,
};
pub use synth_search::{
    Bound, CancelToken, ExecutionError, FunctionReuse, InputValues, Search, SearchConfig,
    SearchOutcome, Solution,
};

pub mod prelude {
    pub use synth_lattice::{DataTypeId, TypeLattice};
    pub use synth_rules::{
        Axiom, DataInstance, Environment, EnvironmentBuilder, FnFunction, Function, Heuristic,
        InputFunction, OutputFunction, Pipeline, RuleHolder, SolutionAxiom, downcast_functions,
    };
    pub use synth_search::{InputValues, Search, SearchConfig, SearchOutcome};
}

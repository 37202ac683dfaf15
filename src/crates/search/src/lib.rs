//! Best-first synthesis search.
//!
//! Given a frozen [`Environment`](synth_rules::Environment), a [`Search`] looks for an ordered
//! chain of registered functions that carries the input functions' outputs to values the output
//! function accepts. Axioms prune partial pipelines, heuristics rank them, and solution axioms
//! decide whether a complete candidate is returned.
//!
//! # Example
//!
//! ```ignore
//! let env = EnvironmentBuilder::new(lattice.clone())
//!     .with_function(seed)
//!     .with_function(goal)
//!     .with_functions(downcast_functions(&lattice))
//!     .build()?;
//!
//! let mut search = Search::new(&env).with_config(SearchConfig::default().with_max_depth(8));
//! match search.run() {
//!     SearchOutcome::Solution(solution) => solution.execute(&env, &InputValues::new())?,
//!     SearchOutcome::NotFound => ...,
//!     SearchOutcome::BoundExceeded(bound) => ...,
//!     SearchOutcome::Cancelled => ...,
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod engine;
mod frontier;
pub mod materialize;
pub mod outcome;


pub use cancel::CancelToken;
pub use config::{FunctionReuse, SearchConfig};
pub use engine::{Search, SearchStats};
pub use materialize::{ExecutionError, InputValues};
pub use outcome::{Bound, SearchOutcome, Solution};

//! Best-first search over partial pipelines.
//!
//! The search:
//! - starts from the pipeline seeded by every input function (no steps applied)
//! - pops the frontier entry with the lowest `cost + estimate`, earliest insertion first on ties
//! - tests every way of completing the popped pipeline against the goal; a completion is
//!   returned only if every solution axiom accepts it, otherwise the search goes on
//! - expands the pipeline by every applicable transform under every distinct argument binding,
//!   discarding children that fail an axiom
//! - stops at the first accepted solution, an empty frontier, an exploration bound, or
//!   cancellation

use std::collections::HashSet;

use synth_rules::{Environment, FunctionId, Pipeline};

use crate::cancel::CancelToken;
use crate::config::{FunctionReuse, SearchConfig};
use crate::frontier::Frontier;
use crate::materialize::InputValues;
use crate::outcome::{Bound, SearchOutcome, Solution};

/// Counters describing the work a search did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Pipelines popped and expanded.
    pub expanded: usize,
    /// Child pipelines produced by expansion.
    pub generated: usize,
    /// Children rejected by an axiom.
    pub pruned: usize,
    /// Children skipped because an equivalent pipeline was already queued.
    pub duplicates: usize,
    /// Goal completions rejected by a solution axiom.
    pub rejected_solutions: usize,
    /// Children that passed every axiom but were dropped because of the depth bound.
    pub depth_truncated: usize,
}

/// Canonical form of a pipeline used to skip equivalent states.
///
/// Two pipelines applying the same functions the same number of times, with the same typed
/// slots marked used, offer the same options to every later step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StateKey {
    use_counts: Vec<u32>,
    slots: Vec<(u32, bool)>,
}

impl StateKey {
    fn of(pipeline: &Pipeline) -> Self {
        let mut slots: Vec<(u32, bool)> = pipeline
            .slots()
            .iter()
            .map(|slot| (slot.ty().raw(), slot.is_used()))
            .collect();
        slots.sort_unstable();
        Self {
            use_counts: pipeline.use_counts().to_vec(),
            slots,
        }
    }
}

/// One search invocation against a shared [`Environment`].
///
/// All mutable search state lives here, so any number of searches may run concurrently over
/// the same environment.
pub struct Search<'env> {
    env: &'env Environment,
    config: SearchConfig,
    cancel: Option<CancelToken>,
    stats: SearchStats,
}

impl<'env> Search<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self {
            env,
            config: SearchConfig::default(),
            cancel: None,
            stats: SearchStats::default(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Counters of the most recent run.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Search using the declared outputs of every input function.
    pub fn run(&mut self) -> SearchOutcome {
        let initial = self.env.initial_pipeline();
        self.run_from(initial)
    }

    /// Search using only the input functions `inputs` supplies values for.
    pub fn run_with_inputs(&mut self, inputs: &InputValues) -> SearchOutcome {
        let mut initial = Pipeline::new(self.env.function_count());
        for id in self.env.input_ids().filter(|id| inputs.contains(*id)) {
            if let Some(function) = self.env.function(id) {
                initial.seed(id, function.outputs());
            }
        }
        self.run_from(initial)
    }

    fn run_from(&mut self, initial: Pipeline) -> SearchOutcome {
        self.stats = SearchStats::default();
        let outcome = self.explore(initial);
        log::debug!(
            "search: {} after {} expansions \
             ({} generated, {} pruned, {} duplicates, {} rejected solutions)",
            describe(&outcome),
            self.stats.expanded,
            self.stats.generated,
            self.stats.pruned,
            self.stats.duplicates,
            self.stats.rejected_solutions
        );
        outcome
    }

    fn explore(&mut self, initial: Pipeline) -> SearchOutcome {
        if !self.is_valid(&initial) {
            return SearchOutcome::NotFound;
        }

        let mut frontier = Frontier::new();
        let mut seen = HashSet::new();
        if self.config.deduplicate_states {
            seen.insert(StateKey::of(&initial));
        }
        let priority = self.priority(&initial);
        frontier.push(priority, initial);

        while let Some(entry) = frontier.pop() {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return SearchOutcome::Cancelled;
            }

            let pipeline = entry.pipeline;
            if let Some(solution) = self.goal_test(&pipeline) {
                return SearchOutcome::Solution(solution);
            }

            if self.stats.expanded >= self.config.max_expansions {
                return SearchOutcome::BoundExceeded(Bound::Expansions(self.config.max_expansions));
            }
            self.stats.expanded += 1;
            log::trace!(
                "search: expanding pipeline of {} steps (priority {}, frontier {})",
                pipeline.len(),
                entry.priority,
                frontier.len()
            );
            self.expand(&pipeline, &mut frontier, &mut seen);
        }

        match self.config.max_depth {
            Some(depth) if self.stats.depth_truncated > 0 => {
                SearchOutcome::BoundExceeded(Bound::Depth(depth))
            }
            _ => SearchOutcome::NotFound,
        }
    }

    /// A solution if some way of feeding the output function from the pool yields a pipeline
    /// every solution axiom accepts.
    fn goal_test(&mut self, pipeline: &Pipeline) -> Option<Solution> {
        let completions =
            pipeline.bindings(self.env.goal_types(), self.env.lattice(), self.config.pool);
        for bindings in completions {
            let complete = pipeline.complete(bindings);
            let rejected_by = self
                .env
                .solution_axioms()
                .iter()
                .find(|axiom| !axiom.accepts(&complete, self.env));
            match rejected_by {
                None => return Some(Solution::new(complete)),
                Some(axiom) => {
                    log::trace!("search: candidate rejected by {}", axiom.name());
                    self.stats.rejected_solutions += 1;
                }
            }
        }
        None
    }

    fn expand(
        &mut self,
        pipeline: &Pipeline,
        frontier: &mut Frontier,
        seen: &mut HashSet<StateKey>,
    ) {
        let transforms: Vec<FunctionId> = self.env.transform_ids().collect();
        for id in transforms {
            if self.config.reuse == FunctionReuse::Once && pipeline.contains(id) {
                continue;
            }
            let Some(function) = self.env.function(id) else {
                continue;
            };
            let beyond_depth = self
                .config
                .max_depth
                .is_some_and(|depth| pipeline.len() >= depth);

            let candidates =
                pipeline.bindings(function.inputs(), self.env.lattice(), self.config.pool);
            for bindings in candidates {
                let child = pipeline.apply(id, function.as_ref(), bindings);
                self.stats.generated += 1;

                if !self.is_valid(&child) {
                    self.stats.pruned += 1;
                    continue;
                }
                if beyond_depth {
                    self.stats.depth_truncated += 1;
                    continue;
                }
                if self.config.deduplicate_states && !seen.insert(StateKey::of(&child)) {
                    self.stats.duplicates += 1;
                    continue;
                }

                let priority = self.priority(&child);
                frontier.push(priority, child);
            }
        }
    }

    fn is_valid(&self, pipeline: &Pipeline) -> bool {
        match self
            .env
            .axioms()
            .iter()
            .find(|axiom| !axiom.is_valid(pipeline, self.env))
        {
            None => true,
            Some(axiom) => {
                log::trace!(
                    "search: pipeline of {} steps pruned by {}",
                    pipeline.len(),
                    axiom.name()
                );
                false
            }
        }
    }

    /// Path cost plus the sum of every heuristic's estimate.
    fn priority(&self, pipeline: &Pipeline) -> f64 {
        let estimate: f64 = self
            .env
            .heuristics()
            .iter()
            .map(|heuristic| {
                let value = heuristic.estimate(pipeline, self.env);
                if value.is_nan() || value < 0.0 {
                    log::warn!(
                        "search: heuristic {} returned {}, using 0",
                        heuristic.name(),
                        value
                    );
                    0.0
                } else {
                    value
                }
            })
            .sum();
        pipeline.cost() + estimate
    }
}

fn describe(outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::Solution(solution) => format!("solution of {} steps", solution.len()),
        SearchOutcome::NotFound => "not found".to_string(),
        SearchOutcome::BoundExceeded(bound) => format!("bound exceeded ({:?})", bound),
        SearchOutcome::Cancelled => "cancelled".to_string(),
    }
}

impl std::fmt::Debug for Search<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Search")
            .field("env", &self.env)
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish()
    }
}

//! Distance-to-goal estimate.

use synth_lattice::DataTypeId;
use synth_rules::{Environment, Heuristic, Pipeline, RuleHolder};

/// Estimates the remaining cost from the output function's arguments that no slot in the pool
/// can fill yet.
///
/// The count of unfilled arguments is divided by the most arguments any single transform could
/// fill with its outputs, rounded up, and priced at the cheapest transform. Never overestimates.
#[derive(Debug, Default)]
pub struct UnsatisfiedGoalInputs;

impl UnsatisfiedGoalInputs {
    fn unsatisfied(pipeline: &Pipeline, env: &Environment) -> usize {
        let lattice = env.lattice();
        env.goal_types()
            .iter()
            .filter(|goal| {
                !pipeline
                    .available_types()
                    .any(|ty| lattice.can_connect_to(ty, **goal))
            })
            .count()
    }

    /// Most goal arguments one application of any transform could newly fill.
    fn widest_step(env: &Environment) -> usize {
        let goals = env.goal_types();
        env.transform_ids()
            .filter_map(|id| env.function(id))
            .map(|function| {
                goals
                    .iter()
                    .filter(|goal| fills(function.outputs(), **goal, env))
                    .count()
            })
            .max()
            .unwrap_or(0)
    }

    fn cheapest_step(env: &Environment) -> f64 {
        env.transform_ids()
            .filter_map(|id| env.function(id))
            .map(|function| function.cost().max(0.0))
            .reduce(f64::min)
            .unwrap_or(0.0)
    }
}

fn fills(outputs: &[DataTypeId], goal: DataTypeId, env: &Environment) -> bool {
    outputs
        .iter()
        .any(|ty| env.lattice().can_connect_to(*ty, goal))
}

impl RuleHolder for UnsatisfiedGoalInputs {}

impl Heuristic for UnsatisfiedGoalInputs {
    fn estimate(&self, pipeline: &Pipeline, env: &Environment) -> f64 {
        let unsatisfied = Self::unsatisfied(pipeline, env);
        if unsatisfied == 0 {
            return 0.0;
        }
        let widest = Self::widest_step(env);
        if widest == 0 {
            log::trace!(
                "heuristics: {} goal arguments unreachable by any transform",
                unsatisfied
            );
            return 0.0;
        }
        let steps = unsatisfied.div_ceil(widest);
        steps as f64 * Self::cheapest_step(env)
    }

    fn name(&self) -> &str {
        "UnsatisfiedGoalInputs"
    }
}

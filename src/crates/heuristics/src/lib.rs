//! Ready-made axioms, solution axioms and heuristics.

pub mod goal;
pub mod length;
pub mod reuse;
pub mod unused;

pub use goal::UnsatisfiedGoalInputs;
pub use length::MaxPipelineLength;
pub use reuse::NoDuplicateFunctions;
pub use unused::{AllInputsUsed, NoUnusedOutputs};

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use synth_rules::{Environment, Function, Pipeline, PoolPolicy};

    /// `pipeline` with `function` applied to the slots the accumulating pool would bind.
    pub(crate) fn extend(
        env: &Environment,
        pipeline: &Pipeline,
        function: &Arc<dyn Function>,
    ) -> anyhow::Result<Pipeline> {
        let id = env
            .index_of(function)
            .ok_or_else(|| anyhow::anyhow!("{} is not registered", function.name()))?;
        let bindings = pipeline
            .bind(function.inputs(), env.lattice(), PoolPolicy::Accumulate)
            .ok_or_else(|| anyhow::anyhow!("{} cannot be bound", function.name()))?;
        Ok(pipeline.apply(id, function.as_ref(), bindings))
    }

    /// `pipeline` with the output function bound, if it can be.
    pub(crate) fn finish(env: &Environment, pipeline: &Pipeline) -> anyhow::Result<Pipeline> {
        let bindings = pipeline
            .bind(env.goal_types(), env.lattice(), PoolPolicy::Accumulate)
            .ok_or_else(|| anyhow::anyhow!("goal cannot be bound"))?;
        Ok(pipeline.complete(bindings))
    }
}

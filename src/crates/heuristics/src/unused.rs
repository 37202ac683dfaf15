//! Solution axioms over how a complete pipeline uses its pool.

use synth_rules::{Environment, Pipeline, Producer, RuleHolder, SolutionAxiom};

/// Accepts only pipelines in which every value produced by a step is consumed by a later step
/// or by the output function.
#[derive(Debug, Default)]
pub struct NoUnusedOutputs;

impl RuleHolder for NoUnusedOutputs {}

impl SolutionAxiom for NoUnusedOutputs {
    fn accepts(&self, pipeline: &Pipeline, _env: &Environment) -> bool {
        pipeline
            .slots()
            .iter()
            .filter(|slot| matches!(slot.producer(), Producer::Step { .. }))
            .all(|slot| slot.is_used())
    }

    fn name(&self) -> &str {
        "NoUnusedOutputs"
    }
}

/// Accepts only pipelines that consume every value the input functions supply.
#[derive(Debug, Default)]
pub struct AllInputsUsed;

impl RuleHolder for AllInputsUsed {}

impl SolutionAxiom for AllInputsUsed {
    fn accepts(&self, pipeline: &Pipeline, _env: &Environment) -> bool {
        pipeline
            .slots()
            .iter()
            .filter(|slot| matches!(slot.producer(), Producer::Input { .. }))
            .all(|slot| slot.is_used())
    }

    fn name(&self) -> &str {
        "AllInputsUsed"
    }
}

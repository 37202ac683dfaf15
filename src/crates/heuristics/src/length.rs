use synth_rules::{Axiom, Environment, Pipeline, RuleHolder};

/// Rejects pipelines with more than `max` steps.
#[derive(Debug, Clone, Copy)]
pub struct MaxPipelineLength {
    max: usize,
}

impl MaxPipelineLength {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

impl RuleHolder for MaxPipelineLength {}

impl Axiom for MaxPipelineLength {
    fn is_valid(&self, pipeline: &Pipeline, _env: &Environment) -> bool {
        pipeline.len() <= self.max
    }

    fn name(&self) -> &str {
        "MaxPipelineLength"
    }
}

use synth_rules::{Axiom, Environment, Pipeline, RuleHolder};

/// Rejects pipelines that apply any function more than once.
///
/// Only needed when the search is configured to allow reuse and a particular environment
/// should not.
#[derive(Debug, Default)]
pub struct NoDuplicateFunctions;

impl RuleHolder for NoDuplicateFunctions {}

impl Axiom for NoDuplicateFunctions {
    fn is_valid(&self, pipeline: &Pipeline, _env: &Environment) -> bool {
        pipeline.use_counts().iter().all(|count| *count <= 1)
    }

    fn name(&self) -> &str {
        "NoDuplicateFunctions"
    }
}

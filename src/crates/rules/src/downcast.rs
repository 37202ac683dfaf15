//! Narrowing steps generated from the lattice.
//!
//! A [`Downcast`] edge becomes a passthrough function from the parent type to the child type.
//! Every downcast requires the shared [`NoRedundantDowncast`] axiom, so registering any number of
//! them adds that axiom to the environment exactly once.

use std::sync::{Arc, OnceLock};

use synth_lattice::{DataTypeId, Downcast, TypeLattice};

use crate::environment::Environment;
use crate::function::{Function, FunctionError};
use crate::pipeline::Pipeline;
use crate::rules::{Axiom, RuleHolder};
use crate::value::DataInstance;

impl RuleHolder for Downcast {
    fn required_axioms(&self) -> Vec<Arc<dyn Axiom>> {
        vec![NoRedundantDowncast::shared()]
    }
}

impl Function for Downcast {
    fn inputs(&self) -> &[DataTypeId] {
        std::slice::from_ref(&self.parent)
    }

    fn outputs(&self) -> &[DataTypeId] {
        std::slice::from_ref(&self.child)
    }

    fn execute(&self, inputs: &[DataInstance]) -> Result<Vec<DataInstance>, FunctionError> {
        Ok(inputs.to_vec())
    }

    fn as_downcast(&self) -> Option<&Downcast> {
        Some(self)
    }

    fn name(&self) -> &str {
        "Downcast"
    }
}

/// Every downcast of `lattice`, ready to be registered.
pub fn downcast_functions(lattice: &TypeLattice) -> Vec<Arc<dyn Function>> {
    lattice
        .generate_downcasts()
        .into_iter()
        .map(|d| Arc::new(d) as Arc<dyn Function>)
        .collect()
}

/// Rejects pipelines that narrow a value which already has the target type.
///
/// Without it, a pool holding an `Integer` could be "narrowed" from `Number` to `Integer` again,
/// and the search would waste expansions on casts that change nothing.
#[derive(Debug, Default)]
pub struct NoRedundantDowncast;

impl NoRedundantDowncast {
    /// The instance every generated downcast requires.
    pub fn shared() -> Arc<dyn Axiom> {
        static SHARED: OnceLock<Arc<dyn Axiom>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(NoRedundantDowncast))
            .clone()
    }
}

impl RuleHolder for NoRedundantDowncast {}

impl Axiom for NoRedundantDowncast {
    fn is_valid(&self, pipeline: &Pipeline, env: &Environment) -> bool {
        pipeline.steps().iter().all(|step| {
            let Some(downcast) = env
                .function(step.function())
                .and_then(|f| f.as_downcast())
            else {
                return true;
            };
            step.inputs().iter().all(|slot| {
                pipeline
                    .slot(*slot)
                    .is_none_or(|slot| !env.lattice().can_connect_to(slot.ty(), downcast.child))
            })
        })
    }

    fn name(&self) -> &str {
        "NoRedundantDowncast"
    }
}

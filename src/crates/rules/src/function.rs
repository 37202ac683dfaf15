//! The `Function` trait and ready-made function shapes.
//!
//! A function is a typed transformation step. The engine only reads its declared signature
//! (`inputs` / `outputs`) while searching, and only calls `execute` when a discovered pipeline
//! is materialized.

use std::fmt;
use std::sync::Arc;

use synth_lattice::{DataTypeId, Downcast};

use crate::rules::RuleHolder;
use crate::value::DataInstance;

/// Error returned by a domain function's `execute`.
pub type FunctionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stable registration index of a function inside an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub(crate) u32);

impl FunctionId {
    pub fn from_raw(value: u32) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fn({})", self.0)
    }
}

/// Role a function plays in a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// Supplies external data. Treated as already applied when a search starts.
    Input,
    /// An ordinary step the search may apply.
    Transform,
    /// The goal. Its inputs define what the pipeline must produce; its outputs are never consumed.
    Output,
}

/// Core trait for composable steps.
///
/// # Example
///
/// ```ignore
/// struct Blur { io: [DataTypeId; 1] }
///
/// impl RuleHolder for Blur {}
///
/// impl Function for Blur {
///     fn inputs(&self) -> &[DataTypeId] { &self.io }
///     fn outputs(&self) -> &[DataTypeId] { &self.io }
///     fn execute(&self, inputs: &[DataInstance]) -> Result<Vec<DataInstance>, FunctionError> {
///         // ...
///     }
/// }
/// ```
pub trait Function: RuleHolder + Send + Sync + 'static {
    /// Required input types, in argument order.
    fn inputs(&self) -> &[DataTypeId];

    /// Produced output types, in result order.
    fn outputs(&self) -> &[DataTypeId];

    /// Run the transformation. `inputs` lines up with [`Function::inputs`].
    fn execute(&self, inputs: &[DataInstance]) -> Result<Vec<DataInstance>, FunctionError>;

    /// Functions without inputs are input functions unless they say otherwise.
    fn kind(&self) -> FunctionKind {
        if self.inputs().is_empty() {
            FunctionKind::Input
        } else {
            FunctionKind::Transform
        }
    }

    /// Path cost added each time the step is applied.
    fn cost(&self) -> f64 {
        1.0
    }

    /// Set for generated narrowing steps.
    fn as_downcast(&self) -> Option<&Downcast> {
        None
    }

    /// Optional: provide a human-readable name for debugging.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A shared reference to a registered function.
pub type SharedFunction = Arc<dyn Function>;

/// Externally supplied data: no inputs, returns the values it was given.
pub struct InputFunction {
    name: String,
    outputs: Vec<DataTypeId>,
    values: Option<Vec<DataInstance>>,
}

impl InputFunction {
    /// An input whose values are supplied at execution time.
    pub fn new(name: impl Into<String>, outputs: Vec<DataTypeId>) -> Self {
        Self {
            name: name.into(),
            outputs,
            values: None,
        }
    }

    /// An input carrying its own values.
    pub fn with_values(mut self, values: Vec<DataInstance>) -> Self {
        self.values = Some(values);
        self
    }
}

impl RuleHolder for InputFunction {}

impl Function for InputFunction {
    fn inputs(&self) -> &[DataTypeId] {
        &[]
    }

    fn outputs(&self) -> &[DataTypeId] {
        &self.outputs
    }

    fn execute(&self, _inputs: &[DataInstance]) -> Result<Vec<DataInstance>, FunctionError> {
        self.values
            .clone()
            .ok_or_else(|| format!("input '{}' has no values attached", self.name).into())
    }

    fn kind(&self) -> FunctionKind {
        FunctionKind::Input
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The goal of a search. Executing it hands its inputs back as the pipeline result.
pub struct OutputFunction {
    name: String,
    inputs: Vec<DataTypeId>,
}

impl OutputFunction {
    pub fn new(name: impl Into<String>, inputs: Vec<DataTypeId>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }
}

impl RuleHolder for OutputFunction {}

impl Function for OutputFunction {
    fn inputs(&self) -> &[DataTypeId] {
        &self.inputs
    }

    fn outputs(&self) -> &[DataTypeId] {
        &[]
    }

    fn execute(&self, inputs: &[DataInstance]) -> Result<Vec<DataInstance>, FunctionError> {
        Ok(inputs.to_vec())
    }

    fn kind(&self) -> FunctionKind {
        FunctionKind::Output
    }

    fn name(&self) -> &str {
        &self.name
    }
}

type ExecuteFn =
    dyn Fn(&[DataInstance]) -> Result<Vec<DataInstance>, FunctionError> + Send + Sync + 'static;

/// A transform step backed by a closure.
pub struct FnFunction {
    name: String,
    inputs: Vec<DataTypeId>,
    outputs: Vec<DataTypeId>,
    cost: f64,
    execute: Box<ExecuteFn>,
}

impl FnFunction {
    pub fn new<F>(
        name: impl Into<String>,
        inputs: Vec<DataTypeId>,
        outputs: Vec<DataTypeId>,
        execute: F,
    ) -> Self
    where
        F: Fn(&[DataInstance]) -> Result<Vec<DataInstance>, FunctionError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            inputs,
            outputs,
            cost: 1.0,
            execute: Box::new(execute),
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }
}

impl RuleHolder for FnFunction {}

impl Function for FnFunction {
    fn inputs(&self) -> &[DataTypeId] {
        &self.inputs
    }

    fn outputs(&self) -> &[DataTypeId] {
        &self.outputs
    }

    fn execute(&self, inputs: &[DataInstance]) -> Result<Vec<DataInstance>, FunctionError> {
        (self.execute)(inputs)
    }

    fn cost(&self) -> f64 {
        self.cost
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for dyn Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("inputs", &self.inputs())
            .field("outputs", &self.outputs())
            .field("kind", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use synth_lattice::TypeLattice;

    use super::*;

    #[test]
    fn test_kind_defaults_from_signature() {
        let mut lattice = TypeLattice::new();
        let number = lattice.add_type("Number", &[]).unwrap();

        let source = FnFunction::new("source", vec![], vec![number], |_| Ok(vec![]));
        let step = FnFunction::new("step", vec![number], vec![number], |i| Ok(i.to_vec()));
        assert_eq!(source.kind(), FunctionKind::Input);
        assert_eq!(step.kind(), FunctionKind::Transform);
        assert_eq!(
            OutputFunction::new("goal", vec![number]).kind(),
            FunctionKind::Output
        );
        assert_eq!(step.cost(), 1.0);
        assert_eq!(step.with_cost(2.5).cost(), 2.5);
    }

    #[test]
    fn test_input_function_values() -> anyhow::Result<()> {
        let mut lattice = TypeLattice::new();
        let number = lattice.add_type("Number", &[])?;

        let empty = InputFunction::new("seed", vec![number]);
        assert!(empty.execute(&[]).is_err());

        let seeded =
            InputFunction::new("seed", vec![number]).with_values(vec![DataInstance::new(7u32)]);
        let values = seeded.execute(&[]).map_err(|e| anyhow::anyhow!(e))?;
        assert_eq!(values[0].downcast_ref::<u32>(), Some(&7));
        assert_eq!(seeded.name(), "seed");
        Ok(())
    }

    #[test]
    fn test_output_function_passes_inputs_through() -> anyhow::Result<()> {
        let goal = OutputFunction::new("goal", vec![]);
        let value = DataInstance::new(1.5f64);
        let out = goal
            .execute(std::slice::from_ref(&value))
            .map_err(|e| anyhow::anyhow!(e))?;
        assert!(out[0].same_payload(&value));
        Ok(())
    }
}

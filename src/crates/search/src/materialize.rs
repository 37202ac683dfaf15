//! Running an accepted pipeline against real values.
//!
//! Every slot of the pipeline gets one storage cell. Input functions fill their slots first,
//! then each step reads its bound cells, executes, and writes its outputs, in application order.
//! Finally the output function is executed on the goal bindings.

use std::collections::HashMap;

use synth_rules::{
    DataInstance, Environment, Function, FunctionError, FunctionId, Pipeline, Producer, SlotId,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("pipeline has no goal bindings")]
    Incomplete,
    #[error("{0} is not registered in this environment")]
    UnknownFunction(FunctionId),
    #[error("{0} was read before any value was written to it")]
    MissingValue(SlotId),
    #[error("function '{function}' returned {actual} values, expected {expected}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },
    #[error("function '{function}' failed")]
    Function {
        function: String,
        #[source]
        source: FunctionError,
    },
}

/// Values for input functions, keyed by their id in the environment.
#[derive(Debug, Clone, Default)]
pub struct InputValues(HashMap<FunctionId, Vec<DataInstance>>);

impl InputValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, function: FunctionId, values: Vec<DataInstance>) {
        self.0.insert(function, values);
    }

    pub fn with(mut self, function: FunctionId, values: Vec<DataInstance>) -> Self {
        self.insert(function, values);
        self
    }

    pub fn get(&self, function: FunctionId) -> Option<&[DataInstance]> {
        self.0.get(&function).map(Vec::as_slice)
    }

    pub fn contains(&self, function: FunctionId) -> bool {
        self.0.contains_key(&function)
    }

    pub fn functions(&self) -> impl Iterator<Item = FunctionId> + '_ {
        self.0.keys().copied()
    }
}

/// One cell per pipeline slot.
struct SlotStorage {
    cells: Vec<Option<DataInstance>>,
}

impl SlotStorage {
    fn new(len: usize) -> Self {
        Self {
            cells: vec![None; len],
        }
    }

    fn set(&mut self, slot: SlotId, value: DataInstance) {
        if let Some(cell) = self.cells.get_mut(slot.index()) {
            *cell = Some(value);
        }
    }

    fn gather(&self, slots: &[SlotId]) -> Result<Vec<DataInstance>, ExecutionError> {
        slots
            .iter()
            .map(|slot| {
                self.cells
                    .get(slot.index())
                    .and_then(Option::clone)
                    .ok_or(ExecutionError::MissingValue(*slot))
            })
            .collect()
    }
}

fn lookup(env: &Environment, id: FunctionId) -> Result<&dyn Function, ExecutionError> {
    env.function(id)
        .map(|f| f.as_ref())
        .ok_or(ExecutionError::UnknownFunction(id))
}

fn run(
    function: &dyn Function,
    inputs: &[DataInstance],
) -> Result<Vec<DataInstance>, ExecutionError> {
    function
        .execute(inputs)
        .map_err(|source| ExecutionError::Function {
            function: function.name().to_string(),
            source,
        })
}

fn check_arity(
    function: &dyn Function,
    expected: usize,
    values: &[DataInstance],
) -> Result<(), ExecutionError> {
    if values.len() != expected {
        return Err(ExecutionError::ArityMismatch {
            function: function.name().to_string(),
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

pub(crate) fn execute_pipeline(
    pipeline: &Pipeline,
    env: &Environment,
    inputs: &InputValues,
) -> Result<Vec<DataInstance>, ExecutionError> {
    let goal = pipeline.goal().ok_or(ExecutionError::Incomplete)?;
    let mut storage = SlotStorage::new(pipeline.slots().len());

    // input functions run at most once each
    let mut supplied: HashMap<FunctionId, Vec<DataInstance>> = HashMap::new();
    for (i, slot) in pipeline.slots().iter().enumerate() {
        let Producer::Input { function: id, output } = slot.producer() else {
            continue;
        };
        if !supplied.contains_key(&id) {
            let function = lookup(env, id)?;
            let values = match inputs.get(id) {
                Some(values) => values.to_vec(),
                None => run(function, &[])?,
            };
            check_arity(function, function.outputs().len(), &values)?;
            supplied.insert(id, values);
        }
        if let Some(value) = supplied.get(&id).and_then(|values| values.get(output)) {
            storage.set(SlotId::from_index(i), value.clone());
        }
    }

    for step in pipeline.steps() {
        let function = lookup(env, step.function())?;
        let args = storage.gather(step.inputs())?;
        let results = run(function, &args)?;
        check_arity(function, step.outputs().len(), &results)?;
        for (slot, value) in step.outputs().iter().zip(results) {
            storage.set(*slot, value);
        }
    }

    let output = env.output_function();
    let args = storage.gather(goal)?;
    log::debug!(
        "materialize: {} steps executed, running output '{}'",
        pipeline.len(),
        output.name()
    );
    run(output.as_ref(), &args)
}

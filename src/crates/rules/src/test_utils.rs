//! Fixtures shared by the tests of this crate and its dependents.

use std::sync::Arc;

use synth_lattice::{DataTypeId, TypeLattice};

use crate::function::{FnFunction, Function, InputFunction, OutputFunction};
use crate::value::DataInstance;

/// `Object <- Number <- Integer`, the lattice most scenarios are phrased in.
pub struct NumberLattice {
    pub lattice: Arc<TypeLattice>,
    pub number: DataTypeId,
    pub integer: DataTypeId,
}

impl NumberLattice {
    pub fn new() -> Self {
        let mut lattice = TypeLattice::new();
        let number = lattice
            .add_type("Number", &[])
            .expect("fresh lattice accepts Number");
        let integer = lattice
            .add_type("Integer", &[number])
            .expect("fresh lattice accepts Integer");
        Self {
            lattice: Arc::new(lattice),
            number,
            integer,
        }
    }
}

impl Default for NumberLattice {
    fn default() -> Self {
        Self::new()
    }
}

pub fn input(name: &str, outputs: Vec<DataTypeId>) -> Arc<dyn Function> {
    Arc::new(InputFunction::new(name, outputs))
}

pub fn input_with(
    name: &str,
    outputs: Vec<DataTypeId>,
    values: Vec<DataInstance>,
) -> Arc<dyn Function> {
    Arc::new(InputFunction::new(name, outputs).with_values(values))
}

pub fn output(name: &str, inputs: Vec<DataTypeId>) -> Arc<dyn Function> {
    Arc::new(OutputFunction::new(name, inputs))
}

/// A transform that forwards its first input to every output slot.
pub fn transform(
    name: &str,
    inputs: Vec<DataTypeId>,
    outputs: Vec<DataTypeId>,
) -> Arc<dyn Function> {
    let arity = outputs.len();
    Arc::new(FnFunction::new(name, inputs, outputs, move |values| {
        let first = values.first().cloned().ok_or("transform called without inputs")?;
        Ok(vec![first; arity])
    }))
}

//! Partial and complete pipelines: the state the search explores and rules inspect.
//!
//! A pipeline is a pool of typed slots plus the ordered steps that produced them. Input
//! functions seed the pool; each applied step binds some slots as its arguments and appends its
//! outputs as new slots. Pipelines are values: applying a step returns a new pipeline and leaves
//! the parent untouched, so sibling expansions never alias each other.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use synth_lattice::{DataTypeId, TypeLattice};

use crate::function::{Function, FunctionId};

/// Whether binding a slot as an argument uses it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolPolicy {
    /// Produced values stay available after being consumed; one value may feed many steps.
    #[default]
    Accumulate,
    /// Each produced value feeds at most one argument.
    Consume,
}

/// Position of a slot in [`Pipeline::slots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) u32);

impl SlotId {
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

/// Where a slot's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Producer {
    /// Output `output` of an input function.
    Input { function: FunctionId, output: usize },
    /// Output `output` of step `step` of this pipeline.
    Step { step: usize, output: usize },
}

/// A typed value in the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    ty: DataTypeId,
    producer: Producer,
    uses: u32,
}

impl Slot {
    pub fn ty(&self) -> DataTypeId {
        self.ty
    }

    pub fn producer(&self) -> Producer {
        self.producer
    }

    /// How many arguments (goal included) this slot is bound to.
    pub fn uses(&self) -> u32 {
        self.uses
    }

    pub fn is_used(&self) -> bool {
        self.uses > 0
    }

    fn class(&self) -> SlotClass {
        let origin = match self.producer {
            Producer::Input { function, .. } => Origin::Input(function),
            Producer::Step { step, .. } => Origin::Step(step),
        };
        SlotClass {
            ty: self.ty,
            used: self.is_used(),
            origin,
        }
    }
}

/// One applied function with its argument bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    function: FunctionId,
    inputs: Vec<SlotId>,
    outputs: Vec<SlotId>,
}

impl Step {
    pub fn function(&self) -> FunctionId {
        self.function
    }

    /// Slots bound to the function's arguments, in argument order.
    pub fn inputs(&self) -> &[SlotId] {
        &self.inputs
    }

    /// Slots holding the function's results, in result order.
    pub fn outputs(&self) -> &[SlotId] {
        &self.outputs
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    slots: Vec<Slot>,
    steps: Vec<Step>,
    // indexed by FunctionId
    use_counts: Vec<u32>,
    goal: Option<Vec<SlotId>>,
    cost: f64,
}

impl Pipeline {
    /// An empty pipeline over `function_count` registered functions.
    pub fn new(function_count: usize) -> Self {
        Self {
            slots: Vec::new(),
            steps: Vec::new(),
            use_counts: vec![0; function_count],
            goal: None,
            cost: 0.0,
        }
    }

    /// Add the outputs of an input function to the pool. Input functions are not steps.
    pub fn seed(&mut self, function: FunctionId, outputs: &[DataTypeId]) {
        for (output, ty) in outputs.iter().enumerate() {
            self.slots.push(Slot {
                ty: *ty,
                producer: Producer::Input { function, output },
                uses: 0,
            });
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id.index())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of applied steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Accumulated path cost of the applied steps.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Bindings of the output function's arguments, once the pipeline is complete.
    pub fn goal(&self) -> Option<&[SlotId]> {
        self.goal.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.goal.is_some()
    }

    /// How many times `function` was applied.
    pub fn uses_of(&self, function: FunctionId) -> u32 {
        self.use_counts.get(function.index()).copied().unwrap_or(0)
    }

    pub fn contains(&self, function: FunctionId) -> bool {
        self.uses_of(function) > 0
    }

    /// Per-function application counts, indexed by [`FunctionId::index`].
    pub fn use_counts(&self) -> &[u32] {
        &self.use_counts
    }

    /// Types currently in the pool, in production order.
    pub fn available_types(&self) -> impl Iterator<Item = DataTypeId> + '_ {
        self.slots.iter().map(Slot::ty)
    }

    pub fn unused_slots(&self) -> impl Iterator<Item = (SlotId, &Slot)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_used())
            .map(|(i, slot)| (SlotId(i as u32), slot))
    }

    /// The preferred slot for every required type, or `None` if the requirements cannot be met.
    ///
    /// Each requirement takes the first compatible slot nobody uses yet, falling back to a
    /// compatible slot that is already used when the policy allows sharing.
    pub fn bind(
        &self,
        required: &[DataTypeId],
        lattice: &TypeLattice,
        policy: PoolPolicy,
    ) -> Option<Vec<SlotId>> {
        Bindings::new(self, required, lattice, policy, 1).collect().pop()
    }

    /// Every distinct way to bind `required`, the preferred binding first.
    ///
    /// Slots of one type, one producer and one used state are interchangeable, so bindings that
    /// only swap such slots are listed once.
    pub fn bindings(
        &self,
        required: &[DataTypeId],
        lattice: &TypeLattice,
        policy: PoolPolicy,
    ) -> Vec<Vec<SlotId>> {
        Bindings::new(self, required, lattice, policy, usize::MAX).collect()
    }

    /// A new pipeline with `function` applied to `bindings`.
    pub fn apply(&self, id: FunctionId, function: &dyn Function, bindings: Vec<SlotId>) -> Self {
        let mut next = self.clone();
        next.mark_used(&bindings);

        let step = next.steps.len();
        let outputs = function
            .outputs()
            .iter()
            .enumerate()
            .map(|(output, ty)| {
                next.slots.push(Slot {
                    ty: *ty,
                    producer: Producer::Step { step, output },
                    uses: 0,
                });
                SlotId((next.slots.len() - 1) as u32)
            })
            .collect();

        next.steps.push(Step {
            function: id,
            inputs: bindings,
            outputs,
        });
        if let Some(count) = next.use_counts.get_mut(id.index()) {
            *count += 1;
        }
        next.cost += function.cost();
        next
    }

    /// A new pipeline whose goal arguments are bound to `bindings`.
    pub fn complete(&self, bindings: Vec<SlotId>) -> Self {
        let mut done = self.clone();
        done.mark_used(&bindings);
        done.goal = Some(bindings);
        done
    }

    fn mark_used(&mut self, bindings: &[SlotId]) {
        for slot in bindings {
            if let Some(slot) = self.slots.get_mut(slot.index()) {
                slot.uses += 1;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Origin {
    Input(FunctionId),
    Step(usize),
}

/// Slots in one class can stand in for each other in a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotClass {
    ty: DataTypeId,
    used: bool,
    origin: Origin,
}

/// Depth-first enumeration of argument bindings.
struct Bindings<'a> {
    pipeline: &'a Pipeline,
    // compatible slot indices per argument, in slot order
    candidates: Vec<Vec<usize>>,
    policy: PoolPolicy,
    limit: usize,
    seen: HashSet<Vec<(SlotClass, usize)>>,
    found: Vec<Vec<SlotId>>,
}

impl<'a> Bindings<'a> {
    fn new(
        pipeline: &'a Pipeline,
        required: &[DataTypeId],
        lattice: &TypeLattice,
        policy: PoolPolicy,
        limit: usize,
    ) -> Self {
        let candidates = required
            .iter()
            .map(|target| {
                (0..pipeline.slots.len())
                    .filter(|i| lattice.can_connect_to(pipeline.slots[*i].ty, *target))
                    .collect()
            })
            .collect();
        Self {
            pipeline,
            candidates,
            policy,
            limit,
            seen: HashSet::new(),
            found: Vec::new(),
        }
    }

    fn collect(mut self) -> Vec<Vec<SlotId>> {
        let mut chosen = Vec::with_capacity(self.candidates.len());
        self.descend(&mut chosen);
        self.found
    }

    fn descend(&mut self, chosen: &mut Vec<usize>) {
        if self.found.len() >= self.limit {
            return;
        }
        let arg = chosen.len();
        if arg == self.candidates.len() {
            if self.seen.insert(self.key(chosen)) {
                self.found.push(chosen.iter().map(|i| SlotId(*i as u32)).collect());
            }
            return;
        }

        let passes = match self.policy {
            PoolPolicy::Accumulate => &[true, false][..],
            PoolPolicy::Consume => &[true][..],
        };
        let pipeline = self.pipeline;
        let mut tried = HashSet::new();
        for &fresh_pass in passes {
            for k in 0..self.candidates[arg].len() {
                let i = self.candidates[arg][k];
                let slot = &pipeline.slots[i];
                let taken = chosen.contains(&i);
                if (!slot.is_used() && !taken) != fresh_pass {
                    continue;
                }
                // slots not bound yet in this binding are interchangeable within their class
                if !taken && !tried.insert(slot.class()) {
                    continue;
                }
                chosen.push(i);
                self.descend(chosen);
                chosen.pop();
            }
        }
    }

    /// Class of each bound slot plus the first argument sharing that slot.
    fn key(&self, chosen: &[usize]) -> Vec<(SlotClass, usize)> {
        chosen
            .iter()
            .enumerate()
            .map(|(arg, i)| {
                let first = chosen[..arg].iter().position(|j| j == i).unwrap_or(arg);
                (self.pipeline.slots[*i].class(), first)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::function::FnFunction;

    use super::*;

    struct Fixture {
        lattice: TypeLattice,
        number: DataTypeId,
        integer: DataTypeId,
    }

    fn fixture() -> Fixture {
        let mut lattice = TypeLattice::new();
        let number = lattice.add_type("Number", &[]).unwrap();
        let integer = lattice.add_type("Integer", &[number]).unwrap();
        Fixture {
            lattice,
            number,
            integer,
        }
    }

    fn seeded(fx: &Fixture) -> Pipeline {
        let mut pipeline = Pipeline::new(3);
        pipeline.seed(FunctionId(0), &[fx.integer]);
        pipeline
    }

    #[test]
    fn test_bind_through_ancestry() {
        let fx = fixture();
        let pipeline = seeded(&fx);

        assert_eq!(
            pipeline.bind(&[fx.number], &fx.lattice, PoolPolicy::Accumulate),
            Some(vec![SlotId(0)])
        );
        let mut narrow = Pipeline::new(1);
        narrow.seed(FunctionId(0), &[fx.number]);
        assert_eq!(
            narrow.bind(&[fx.integer], &fx.lattice, PoolPolicy::Accumulate),
            None
        );
    }

    #[test]
    fn test_bind_sharing_depends_on_policy() {
        let fx = fixture();
        let pipeline = seeded(&fx);
        let twice = [fx.number, fx.number];

        assert_eq!(
            pipeline.bind(&twice, &fx.lattice, PoolPolicy::Accumulate),
            Some(vec![SlotId(0), SlotId(0)])
        );
        assert_eq!(pipeline.bind(&twice, &fx.lattice, PoolPolicy::Consume), None);
    }

    #[test]
    fn test_apply_leaves_parent_untouched() {
        let fx = fixture();
        let parent = seeded(&fx);
        let widen = FnFunction::new("widen", vec![fx.integer], vec![fx.number], |i| {
            Ok(i.to_vec())
        });

        let bindings = parent
            .bind(widen.inputs(), &fx.lattice, PoolPolicy::Accumulate)
            .unwrap();
        let child = parent.apply(FunctionId(1), &widen, bindings);

        assert_eq!(parent.len(), 0);
        assert!(!parent.slots()[0].is_used());
        assert_eq!(child.len(), 1);
        assert_eq!(child.cost(), 1.0);
        assert!(child.contains(FunctionId(1)));
        assert!(child.slots()[0].is_used());
        assert_eq!(
            child.slots()[1].producer(),
            Producer::Step { step: 0, output: 0 }
        );
        assert_eq!(child.steps()[0].outputs(), &[SlotId(1)]);
        assert_eq!(child.unused_slots().count(), 1);
    }

    #[test]
    fn test_bind_prefers_fresh_slots() {
        let fx = fixture();
        let mut pipeline = Pipeline::new(2);
        pipeline.seed(FunctionId(0), &[fx.number, fx.number]);
        let used = pipeline.complete(vec![SlotId(0)]);

        assert_eq!(
            used.bind(&[fx.number], &fx.lattice, PoolPolicy::Accumulate),
            Some(vec![SlotId(1)])
        );
        assert!(used.is_complete());
        assert_eq!(used.goal(), Some(&[SlotId(0)][..]));
    }

    #[test]
    fn test_bindings_cover_every_distinct_choice() {
        let fx = fixture();
        let mut pipeline = Pipeline::new(2);
        pipeline.seed(FunctionId(0), &[fx.integer]);
        pipeline.seed(FunctionId(1), &[fx.number, fx.number]);

        // the two Number slots are interchangeable, the Integer slot is not
        assert_eq!(
            pipeline.bindings(&[fx.number], &fx.lattice, PoolPolicy::Consume),
            vec![vec![SlotId(0)], vec![SlotId(1)]]
        );
        assert_eq!(
            pipeline.bindings(&[fx.number, fx.number], &fx.lattice, PoolPolicy::Consume),
            vec![
                vec![SlotId(0), SlotId(1)],
                vec![SlotId(1), SlotId(0)],
                vec![SlotId(1), SlotId(2)],
            ]
        );
        assert_eq!(
            pipeline.bindings(&[fx.integer], &fx.lattice, PoolPolicy::Consume),
            vec![vec![SlotId(0)]]
        );
    }

    #[test]
    fn test_bindings_share_and_reuse_under_accumulate() {
        let fx = fixture();
        let mut pipeline = Pipeline::new(2);
        pipeline.seed(FunctionId(0), &[fx.number, fx.number]);
        let used = pipeline.complete(vec![SlotId(0)]);

        assert_eq!(
            used.bindings(&[fx.number], &fx.lattice, PoolPolicy::Accumulate),
            vec![vec![SlotId(1)], vec![SlotId(0)]]
        );
        assert_eq!(
            used.bindings(&[fx.number], &fx.lattice, PoolPolicy::Consume),
            vec![vec![SlotId(1)]]
        );
        assert_eq!(
            used.bindings(&[fx.number, fx.number], &fx.lattice, PoolPolicy::Accumulate),
            vec![
                vec![SlotId(1), SlotId(0)],
                vec![SlotId(1), SlotId(1)],
                vec![SlotId(0), SlotId(1)],
                vec![SlotId(0), SlotId(0)],
            ]
        );
    }

    #[test]
    fn test_bind_backtracks_under_consume() {
        let fx = fixture();
        let mut pipeline = Pipeline::new(2);
        pipeline.seed(FunctionId(0), &[fx.integer, fx.number]);

        // taking the Integer slot for the Number argument would starve the Integer argument
        assert_eq!(
            pipeline.bind(&[fx.number, fx.integer], &fx.lattice, PoolPolicy::Consume),
            Some(vec![SlotId(1), SlotId(0)])
        );
    }
}

//! Scenario definition.

use mdx_calc::{Evaluator, ResultStyle};
use mdx_compiler::{CompilerOptions, Exp};
use mdx_core::{DimensionId, Member, Value};
use mdx_schema::Schema;
use mdx_types::Type;
use std::sync::Arc;

use crate::assertion::{Assertion, AssertionBuilder};
use crate::error::ScenarioResult;
use crate::evaluator::CellEvaluator;
use crate::runner::Runner;

/// One expression to compile and evaluate.
#[derive(Debug)]
pub struct Step {
    pub name: String,
    pub exp: Exp,
    pub target: Type,
    pub styles: &'static [ResultStyle],
    pub assertion: Assertion,
}

/// A sequence of steps compiled against one schema and cell table.
///
/// Every step compiles in a fresh session and evaluates against a fresh
/// evaluator positioned at the scenario's context.
pub struct Scenario {
    name: String,
    schema: Arc<Schema>,
    options: CompilerOptions,
    enhanced: bool,
    context: Vec<Arc<Member>>,
    cells: Vec<(Vec<Arc<Member>>, Value)>,
    unrelated: Vec<DimensionId>,
    failing: bool,
    steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self {
            name: name.into(),
            schema,
            options: CompilerOptions::default(),
            enhanced: false,
            context: Vec::new(),
            cells: Vec::new(),
            unrelated: Vec::new(),
            failing: false,
            steps: Vec::new(),
        }
    }

    pub fn options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    /// Compile through the enhanced compiler instead of the base one.
    pub fn enhanced(mut self) -> Self {
        self.enhanced = true;
        self
    }

    /// Make a member current before each evaluation.
    pub fn context(mut self, member: Arc<Member>) -> Self {
        self.context.push(member);
        self
    }

    pub fn cell(mut self, coordinates: &[Arc<Member>], value: impl Into<Value>) -> Self {
        self.cells.push((coordinates.to_vec(), value.into()));
        self
    }

    pub fn unrelated(mut self, dimension: DimensionId) -> Self {
        self.unrelated.push(dimension);
        self
    }

    /// Fail every cell read.
    pub fn failing_cells(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Add a step compiled with the `ANY` style.
    pub fn step<F>(self, name: &str, exp: Exp, target: Type, f: F) -> Self
    where
        F: FnOnce(AssertionBuilder) -> AssertionBuilder,
    {
        self.step_styled(name, exp, target, ResultStyle::ANY_ONLY, f)
    }

    pub fn step_styled<F>(
        mut self,
        name: &str,
        exp: Exp,
        target: Type,
        styles: &'static [ResultStyle],
        f: F,
    ) -> Self
    where
        F: FnOnce(AssertionBuilder) -> AssertionBuilder,
    {
        self.steps.push(Step {
            name: name.to_string(),
            exp,
            target,
            styles,
            assertion: f(AssertionBuilder::new()).build(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn compiler_options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn is_enhanced(&self) -> bool {
        self.enhanced
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// A fresh evaluator positioned at the scenario's context.
    pub fn evaluator(&self) -> CellEvaluator {
        let mut evaluator = CellEvaluator::new(&self.schema);
        for (coordinates, value) in &self.cells {
            evaluator = evaluator.with_cell(coordinates, value.clone());
        }
        for dimension in &self.unrelated {
            evaluator = evaluator.with_unrelated_dimension(*dimension);
        }
        if self.failing {
            evaluator = evaluator.failing();
        }
        for member in &self.context {
            evaluator.set_context_member(member);
        }
        evaluator
    }

    /// Run the scenario.
    pub fn run(&self) -> ScenarioResult<()> {
        Runner::new(self).run()
    }
}

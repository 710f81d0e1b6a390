//! MDX Tests
//!
//! Fixtures and a scenario harness for compiling and evaluating expressions
//! end to end.
//!
//! Responsibilities:
//! - Provide the sales fixture schema
//! - Provide an in-memory `Evaluator` over a cell table
//! - Run scenarios: compile each step, evaluate it, verify its assertion

pub mod assertion;
pub mod error;
pub mod evaluator;
pub mod fixture;
pub mod runner;
pub mod scenario;

pub mod prelude {
    pub use crate::assertion::{AssertionBuilder, IntoValue, StepOutcome};
    pub use crate::error::{ScenarioError, ScenarioResult};
    pub use crate::evaluator::CellEvaluator;
    pub use crate::fixture::{dimension, hierarchy, level, member, sales_schema};
    pub use crate::runner::init_tracing;
    pub use crate::scenario::Scenario;
    pub use mdx_calc::{CalcKind, ResultStyle};
    pub use mdx_compiler::{Builtin, CompilerOptions, Exp, Syntax};
    pub use mdx_core::Value;
    pub use mdx_types::{HierarchyType, MemberType, Type};
}

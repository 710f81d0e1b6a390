//! MDX Calc
//!
//! Executable calculator nodes and the contracts they are evaluated against.
//!
//! Responsibilities:
//! - Define the `Calc` contract every compiled node satisfies
//! - Define the `Evaluator` contract and the `ContextGuard` that restores
//!   dimensional context on every exit path
//! - Provide the conversion nodes the compiler inserts between shapes
//! - Provide the value readers, navigation, set and scalar operator nodes
//! - Render calculator trees for plan explanation

mod calc;
mod constant;
mod convert;
mod error;
mod evaluator;
mod navigate;
mod reader;
mod scalar;
mod set;
mod shape;
mod writer;


pub use calc::{Calc, CalcKind, CalcRef, ResultStyle};
pub use constant::ConstantCalc;
pub use convert::{
    truncate_to_integer, DoubleToIntegerCalc, IntegerToDoubleCalc, NumericToBooleanCalc,
    UnknownToCalc,
};
pub use error::{CalcError, CalcResult};
pub use evaluator::{ContextGuard, Evaluator, Savepoint};
pub use navigate::{Navigation, NavigationCalc};
pub use reader::{MemberArrayValueCalc, MemberValueCalc, TupleValueCalc};
pub use scalar::{ArithmeticCalc, ArithmeticOp, CastCalc, ConcatCalc, LogicalCalc, LogicalOp};
pub use set::{LevelMembersIterCalc, LevelMembersListCalc, SetListCalc, TupleCalc};
pub use shape::{CopyListCalc, IterableListCalc, MemberToTupleCalc};
pub use writer::CalcWriter;

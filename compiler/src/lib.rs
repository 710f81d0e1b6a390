//! MDX Compiler
//!
//! Compile resolved expressions into calculator trees.
//!
//! Responsibilities:
//! - Model expressions and bind unresolved calls through the `Validator`
//! - Compile expressions to a requested type and result style, inserting
//!   conversion nodes where the static type does not match
//! - Fold constant conversions at compile time
//! - Register query parameters in a per-session slot registry
//! - Decorate compilers with hooks and extra conversions

mod builtin;
mod compiler;
mod context;
mod delegating;
mod enhanced;
mod error;
mod exp;
mod options;
mod parameter;
mod validator;

pub use compiler::{BaseCompiler, ExpCompiler};
pub use context::CompileContext;
pub use delegating::{
    CompileHook, DelegatingCompiler, EntryPoint, EntryStats, LoggingHook, ProfilingHook,
};
pub use enhanced::EnhancedCompiler;
pub use error::{CompileError, CompileResult};
pub use exp::{Builtin, Exp, FunCall, Literal, Syntax, UnresolvedCall};
pub use options::{CompilerOptions, StylePreset};
pub use parameter::{Parameter, ParameterCalc, ParameterRegistry, ParameterSlot};
pub use validator::{BuiltinValidator, Validator};

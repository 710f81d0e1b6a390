//! Compiler decorators that observe every compile.

use crate::{CompileContext, CompileResult, Exp, ExpCompiler, Parameter, ParameterSlot};
use mdx_calc::{CalcRef, CalcWriter, ResultStyle};
use mdx_types::Type;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace, Level};

/// The compiler entry point a call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryPoint {
    Compile,
    CompileAs,
    Member,
    Level,
    Hierarchy,
    Dimension,
    Tuple,
    Scalar,
    Integer,
    Double,
    String,
    Boolean,
    DateTime,
    List,
    Iter,
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryPoint::Compile => "compile",
            EntryPoint::CompileAs => "compile_as",
            EntryPoint::Member => "compile_member",
            EntryPoint::Level => "compile_level",
            EntryPoint::Hierarchy => "compile_hierarchy",
            EntryPoint::Dimension => "compile_dimension",
            EntryPoint::Tuple => "compile_tuple",
            EntryPoint::Scalar => "compile_scalar",
            EntryPoint::Integer => "compile_integer",
            EntryPoint::Double => "compile_double",
            EntryPoint::String => "compile_string",
            EntryPoint::Boolean => "compile_boolean",
            EntryPoint::DateTime => "compile_datetime",
            EntryPoint::List => "compile_list",
            EntryPoint::Iter => "compile_iter",
        };
        write!(f, "{}", s)
    }
}

/// Observes successful compiles made through a [`DelegatingCompiler`].
pub trait CompileHook: Send + Sync {
    fn after_compile(&self, entry: EntryPoint, exp: &Exp, calc: &CalcRef, elapsed: Duration);
}

/// Forwards every entry point to a parent compiler and reports each
/// successful result to a hook.
///
/// Nested compiles recurse through the session's outermost compiler, so a
/// delegating compiler installed there sees the whole tree being built.
#[derive(Debug)]
pub struct DelegatingCompiler<P, H> {
    parent: P,
    hook: H,
}

impl<P: ExpCompiler, H: CompileHook> DelegatingCompiler<P, H> {
    pub fn new(parent: P, hook: H) -> Self {
        Self { parent, hook }
    }

    pub fn parent(&self) -> &P {
        &self.parent
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    fn observe(
        &self,
        entry: EntryPoint,
        exp: &Exp,
        compile: impl FnOnce() -> CompileResult<CalcRef>,
    ) -> CompileResult<CalcRef> {
        let start = Instant::now();
        let calc = compile()?;
        self.hook.after_compile(entry, exp, &calc, start.elapsed());
        Ok(calc)
    }
}

impl<P: ExpCompiler, H: CompileHook> ExpCompiler for DelegatingCompiler<P, H> {
    fn compile(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::Compile, exp, || self.parent.compile(cx, exp))
    }

    fn compile_as(
        &self,
        cx: &mut CompileContext<'_>,
        exp: &Exp,
        target: &Type,
        styles: &'static [ResultStyle],
    ) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::CompileAs, exp, || {
            self.parent.compile_as(cx, exp, target, styles)
        })
    }

    fn compile_member(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::Member, exp, || self.parent.compile_member(cx, exp))
    }

    fn compile_level(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::Level, exp, || self.parent.compile_level(cx, exp))
    }

    fn compile_hierarchy(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::Hierarchy, exp, || self.parent.compile_hierarchy(cx, exp))
    }

    fn compile_dimension(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::Dimension, exp, || self.parent.compile_dimension(cx, exp))
    }

    fn compile_tuple(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::Tuple, exp, || self.parent.compile_tuple(cx, exp))
    }

    fn compile_scalar(
        &self,
        cx: &mut CompileContext<'_>,
        exp: &Exp,
        specific: bool,
    ) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::Scalar, exp, || {
            self.parent.compile_scalar(cx, exp, specific)
        })
    }

    fn compile_integer(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::Integer, exp, || self.parent.compile_integer(cx, exp))
    }

    fn compile_double(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::Double, exp, || self.parent.compile_double(cx, exp))
    }

    fn compile_string(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::String, exp, || self.parent.compile_string(cx, exp))
    }

    fn compile_boolean(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::Boolean, exp, || self.parent.compile_boolean(cx, exp))
    }

    fn compile_datetime(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::DateTime, exp, || self.parent.compile_datetime(cx, exp))
    }

    fn compile_list(
        &self,
        cx: &mut CompileContext<'_>,
        exp: &Exp,
        mutable: bool,
    ) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::List, exp, || self.parent.compile_list(cx, exp, mutable))
    }

    fn compile_iter(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.observe(EntryPoint::Iter, exp, || self.parent.compile_iter(cx, exp))
    }

    fn register_parameter(
        &self,
        cx: &mut CompileContext<'_>,
        parameter: &Arc<Parameter>,
    ) -> CompileResult<Arc<ParameterSlot>> {
        self.parent.register_parameter(cx, parameter)
    }
}

// ========== Hooks ==========

/// Logs every compiled node at debug level, and the whole tree of each
/// `compile_as` at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHook;

impl CompileHook for LoggingHook {
    fn after_compile(&self, entry: EntryPoint, exp: &Exp, calc: &CalcRef, elapsed: Duration) {
        debug!(
            entry = %entry,
            exp = %exp,
            calc = calc.name(),
            kind = %calc.kind(),
            elapsed_us = elapsed.as_micros() as u64,
            "compiled"
        );
        if entry == EntryPoint::CompileAs && tracing::enabled!(Level::TRACE) {
            trace!(tree = %CalcWriter::explain(&**calc), "compiled tree");
        }
    }
}

/// Call count and cumulative time of one entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryStats {
    pub count: u64,
    pub total: Duration,
}

/// Accumulates per-entry-point compile statistics.
#[derive(Debug, Default)]
pub struct ProfilingHook {
    stats: Mutex<HashMap<EntryPoint, EntryStats>>,
}

impl ProfilingHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self, entry: EntryPoint) -> EntryStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entry)
            .copied()
            .unwrap_or_default()
    }

    /// Compiles observed across all entry points.
    pub fn total_count(&self) -> u64 {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|s| s.count)
            .sum()
    }

    /// Stats of every entry point seen so far, ordered by entry point.
    pub fn snapshot(&self) -> Vec<(EntryPoint, EntryStats)> {
        let stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<_> = stats.iter().map(|(e, s)| (*e, *s)).collect();
        entries.sort_by_key(|(e, _)| *e);
        entries
    }
}

impl CompileHook for ProfilingHook {
    fn after_compile(&self, entry: EntryPoint, _exp: &Exp, _calc: &CalcRef, elapsed: Duration) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = stats.entry(entry).or_default();
        entry.count += 1;
        entry.total += elapsed;
    }
}

impl<H: CompileHook> CompileHook for Arc<H> {
    fn after_compile(&self, entry: EntryPoint, exp: &Exp, calc: &CalcRef, elapsed: Duration) {
        (**self).after_compile(entry, exp, calc, elapsed)
    }
}

//! Query parameters and the per-session slot registry.

use crate::validator::cast_keyword;
use crate::{CompileContext, CompileResult, Exp, Syntax};
use mdx_calc::{Calc, CalcError, CalcKind, CalcRef, CalcResult, Evaluator, ResultStyle};
use mdx_core::{Hierarchy, Value};
use mdx_types::Type;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use std::thread::{self, ThreadId};
use tracing::debug;

/// A named query parameter with a declared type and a default expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    ty: Type,
    default: Exp,
    description: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Type, default: Exp) -> Self {
        Self {
            name: name.into(),
            ty,
            default,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn default_exp(&self) -> &Exp {
        &self.default
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Default)]
struct SlotValues {
    value: Option<Value>,
    cached_default: Option<Value>,
}

/// The runtime home of one parameter within a statement.
///
/// The default calculator is set once, after the slot is registered. Values
/// sit behind a lock so concurrent evaluators can read them.
pub struct ParameterSlot {
    parameter: Arc<Parameter>,
    index: usize,
    default_calc: OnceLock<CalcRef>,
    values: RwLock<SlotValues>,
    /// Threads currently evaluating the default, for cycle detection.
    evaluating: Mutex<Vec<ThreadId>>,
}

impl ParameterSlot {
    fn new(parameter: Arc<Parameter>, index: usize) -> Self {
        Self {
            parameter,
            index,
            default_calc: OnceLock::new(),
            values: RwLock::new(SlotValues::default()),
            evaluating: Mutex::new(Vec::new()),
        }
    }

    pub fn parameter(&self) -> &Arc<Parameter> {
        &self.parameter
    }

    /// Dense zero-based position of the slot within its session.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn default_calc(&self) -> Option<&CalcRef> {
        self.default_calc.get()
    }

    /// Returns false if a default was already set.
    pub(crate) fn set_default_calc(&self, calc: CalcRef) -> bool {
        self.default_calc.set(calc).is_ok()
    }

    pub fn set_value(&self, value: Value) {
        self.write().value = Some(value);
    }

    pub fn value(&self) -> Option<Value> {
        self.read().value.clone()
    }

    pub fn is_set(&self) -> bool {
        self.read().value.is_some()
    }

    /// Clear the assigned value; evaluation falls back to the default.
    pub fn unset(&self) {
        self.write().value = None;
    }

    pub fn cached_default_value(&self) -> Option<Value> {
        self.read().cached_default.clone()
    }

    /// The assigned value, else the default value.
    pub fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        if let Some(value) = self.value() {
            return Ok(value);
        }
        self.default_value(evaluator)
    }

    fn default_value(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        if let Some(value) = self.cached_default_value() {
            return Ok(value);
        }
        let calc = self.default_calc.get().ok_or_else(|| {
            CalcError::evaluation(format!(
                "Parameter '{}' has no compiled default",
                self.parameter.name()
            ))
        })?;

        let _entry = self.enter()?;
        let value = calc.evaluate(evaluator)?;
        self.write().cached_default = Some(value.clone());
        Ok(value)
    }

    fn enter(&self) -> CalcResult<EvaluatingEntry<'_>> {
        let current = thread::current().id();
        let mut evaluating = self.evaluating.lock().unwrap_or_else(PoisonError::into_inner);
        if evaluating.contains(&current) {
            return Err(CalcError::CyclicParameter(self.parameter.name().to_string()));
        }
        evaluating.push(current);
        Ok(EvaluatingEntry {
            slot: self,
            thread: current,
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SlotValues> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SlotValues> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks the default of a slot as being evaluated on one thread.
struct EvaluatingEntry<'s> {
    slot: &'s ParameterSlot,
    thread: ThreadId,
}

impl Drop for EvaluatingEntry<'_> {
    fn drop(&mut self) {
        let mut evaluating = self
            .slot
            .evaluating
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        evaluating.retain(|t| *t != self.thread);
    }
}

impl fmt::Debug for ParameterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterSlot")
            .field("name", &self.parameter.name())
            .field("index", &self.index)
            .field("has_default", &self.default_calc.get().is_some())
            .finish()
    }
}

/// Reads a parameter through its slot.
#[derive(Debug)]
pub struct ParameterCalc {
    ty: Type,
    slot: Arc<ParameterSlot>,
}

impl ParameterCalc {
    pub fn new(slot: Arc<ParameterSlot>) -> Self {
        Self {
            ty: slot.parameter().ty().clone(),
            slot,
        }
    }

    pub fn slot(&self) -> &Arc<ParameterSlot> {
        &self.slot
    }
}

impl Calc for ParameterCalc {
    fn name(&self) -> &str {
        "Parameter"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::Generic
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        self.slot.evaluate(evaluator)
    }

    // The default is evaluated once and cached, so the value never follows
    // the context. The default calculator is not a child: it may read this
    // slot again.
    fn depends_on(&self, _hierarchy: &Hierarchy) -> bool {
        false
    }

    fn result_style(&self) -> ResultStyle {
        ResultStyle::Value
    }
}

/// Parameter slots of one compile session, keyed by parameter identity.
///
/// Two distinct parameters that share a name get distinct slots.
#[derive(Debug, Default)]
pub struct ParameterRegistry {
    slots: Vec<Arc<ParameterSlot>>,
    by_identity: HashMap<usize, usize>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot of this exact parameter, if it was registered.
    pub fn lookup(&self, parameter: &Arc<Parameter>) -> Option<&Arc<ParameterSlot>> {
        self.by_identity
            .get(&identity(parameter))
            .map(|&i| &self.slots[i])
    }

    /// The first slot registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<ParameterSlot>> {
        self.slots.iter().find(|s| s.parameter().name() == name)
    }

    pub fn slot(&self, index: usize) -> Option<&Arc<ParameterSlot>> {
        self.slots.get(index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ParameterSlot>> {
        self.slots.iter()
    }

    fn allocate(&mut self, parameter: Arc<Parameter>) -> Arc<ParameterSlot> {
        let index = self.slots.len();
        self.by_identity.insert(identity(&parameter), index);
        let slot = Arc::new(ParameterSlot::new(parameter, index));
        self.slots.push(slot.clone());
        slot
    }

    /// Drop every slot from `len` on, keeping indices dense.
    fn truncate(&mut self, len: usize) {
        for slot in self.slots.drain(len..) {
            self.by_identity.remove(&identity(slot.parameter()));
        }
    }
}

// A slot holds its parameter, so the address stays unique while registered.
fn identity(parameter: &Arc<Parameter>) -> usize {
    Arc::as_ptr(parameter) as usize
}

/// Register a parameter with the session, compiling its default once.
///
/// The slot is registered before the default is compiled, so a default that
/// refers to its own parameter compiles to a read of the same slot. If the
/// default fails to compile, the slot and any slot registered while
/// compiling it are removed again.
pub(crate) fn register_parameter(
    cx: &mut CompileContext<'_>,
    parameter: &Arc<Parameter>,
) -> CompileResult<Arc<ParameterSlot>> {
    if let Some(slot) = cx.parameters().lookup(parameter) {
        return Ok(slot.clone());
    }

    let slot = cx.parameters_mut().allocate(parameter.clone());
    debug!(
        name = parameter.name(),
        index = slot.index(),
        ty = %parameter.ty(),
        description = parameter.description().unwrap_or_default(),
        "registered parameter"
    );

    match compile_default(cx, parameter) {
        Ok(calc) => {
            slot.set_default_calc(calc);
            Ok(slot)
        }
        Err(e) => {
            debug!(name = parameter.name(), error = %e, "discarding parameter slot");
            cx.parameters_mut().truncate(slot.index());
            Err(e)
        }
    }
}

fn compile_default(cx: &mut CompileContext<'_>, parameter: &Parameter) -> CompileResult<CalcRef> {
    let default = parameter.default_exp();
    let compiler = cx.compiler();
    match parameter.ty() {
        Type::Scalar(target) => {
            let default_ty = cx.validator().validate(default, true)?.ty();
            let exp = match cast_keyword(*target) {
                Some(keyword) if default_ty != *parameter.ty() => {
                    debug!(
                        name = parameter.name(),
                        from = %default_ty,
                        to = %target,
                        "casting parameter default"
                    );
                    let cast = Exp::unresolved(
                        "Cast",
                        Syntax::Function,
                        vec![default.clone(), Exp::symbol(keyword)],
                    );
                    cx.validator().validate(&cast, true)?
                }
                _ => default.clone(),
            };
            compiler.compile_scalar(cx, &exp, true)
        }
        ty => compiler.compile_as(cx, default, ty, ResultStyle::ANY_ONLY),
    }
}

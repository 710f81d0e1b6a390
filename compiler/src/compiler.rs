//! The expression compiler.
//!
//! Every entry point takes the session's [`CompileContext`] and recurses
//! through `cx.compiler()`, the outermost compiler of the session. A
//! decorator therefore sees every nested compile, not just the top-level one.

use crate::parameter;
use crate::{Builtin, CompileContext, CompileError, CompileResult, Exp, Parameter, ParameterSlot};
use mdx_calc::{
    truncate_to_integer, CalcKind, CalcRef, ConstantCalc, DoubleToIntegerCalc,
    IntegerToDoubleCalc, IterableListCalc, MemberArrayValueCalc, MemberToTupleCalc,
    MemberValueCalc, Navigation, NavigationCalc, NumericToBooleanCalc, ResultStyle,
    TupleValueCalc, UnknownToCalc,
};
use mdx_core::Value;
use mdx_types::{DimensionType, HierarchyType, LevelType, MemberType, ScalarType, Type};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, trace};

/// Compiles expressions to calculators, one entry point per target shape.
///
/// The provided methods implement the base algorithm. Decorators override
/// them and forward to a parent compiler.
pub trait ExpCompiler {
    /// Compile without a target shape.
    fn compile(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile");
        let exp = resolve(cx, exp, false)?;
        exp.accept(cx)
    }

    /// Compile to `target` with `styles` active for the duration of the call.
    fn compile_as(
        &self,
        cx: &mut CompileContext<'_>,
        exp: &Exp,
        target: &Type,
        styles: &'static [ResultStyle],
    ) -> CompileResult<CalcRef> {
        trace!(exp = %exp, target = %target, "compile_as");
        cx.with_styles(styles, |cx| compile_as(cx, exp, target, styles))
    }

    fn compile_member(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile_member");
        compile_member(cx, exp)
    }

    fn compile_level(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile_level");
        compile_level(cx, exp)
    }

    fn compile_hierarchy(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile_hierarchy");
        compile_hierarchy(cx, exp)
    }

    fn compile_dimension(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile_dimension");
        compile_dimension(cx, exp)
    }

    fn compile_tuple(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile_tuple");
        compile_tuple(cx, exp)
    }

    /// Compile to a scalar value. With `specific`, a scalar expression is
    /// compiled through the entry point of its own scalar type.
    fn compile_scalar(
        &self,
        cx: &mut CompileContext<'_>,
        exp: &Exp,
        specific: bool,
    ) -> CompileResult<CalcRef> {
        trace!(exp = %exp, specific, "compile_scalar");
        compile_scalar(cx, exp, specific)
    }

    fn compile_integer(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile_integer");
        compile_integer(cx, exp)
    }

    fn compile_double(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile_double");
        compile_double(cx, exp)
    }

    fn compile_string(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile_string");
        compile_simple(cx, exp, ScalarType::String, CalcKind::String)
    }

    fn compile_boolean(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile_boolean");
        compile_boolean(cx, exp)
    }

    fn compile_datetime(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile_datetime");
        compile_simple(cx, exp, ScalarType::DateTime, CalcKind::DateTime)
    }

    /// Compile a set to a materialized list, one the caller may mutate if
    /// `mutable` is set.
    fn compile_list(
        &self,
        cx: &mut CompileContext<'_>,
        exp: &Exp,
        mutable: bool,
    ) -> CompileResult<CalcRef> {
        trace!(exp = %exp, mutable, "compile_list");
        compile_list(cx, exp, mutable)
    }

    /// Compile a set to something that can be iterated.
    fn compile_iter(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        trace!(exp = %exp, "compile_iter");
        compile_iter(cx, exp)
    }

    /// Bind a parameter to its session slot, compiling its default on first
    /// registration.
    fn register_parameter(
        &self,
        cx: &mut CompileContext<'_>,
        parameter: &Arc<Parameter>,
    ) -> CompileResult<Arc<ParameterSlot>> {
        trace!(name = parameter.name(), "register_parameter");
        parameter::register_parameter(cx, parameter)
    }
}

/// The compiler with no decoration.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseCompiler;

impl ExpCompiler for BaseCompiler {}

// ========== Helpers ==========

/// Run unresolved calls through the validator.
pub(crate) fn resolve<'e>(
    cx: &CompileContext<'_>,
    exp: &'e Exp,
    scalar_context: bool,
) -> CompileResult<Cow<'e, Exp>> {
    if exp.is_resolved() {
        Ok(Cow::Borrowed(exp))
    } else {
        cx.validator().validate(exp, scalar_context).map(Cow::Owned)
    }
}

/// Wrap `calc` in a runtime check unless it already satisfies `target`.
fn ensure_kind(calc: CalcRef, target: CalcKind, ty: Type) -> CalcRef {
    if calc.kind().satisfies(target) {
        return calc;
    }
    debug!(calc = calc.name(), from = %calc.kind(), to = %target, "inserting runtime conversion");
    Arc::new(UnknownToCalc::new(ty, target, calc))
}

fn navigate(cx: &CompileContext<'_>, ty: Type, step: Navigation, child: CalcRef) -> CalcRef {
    debug!(step = %step, child = child.name(), "inserting runtime navigation");
    Arc::new(NavigationCalc::new(ty, step, child, cx.schema().clone()))
}

/// Whether the type can be read as a cell value.
fn has_value(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Scalar(_) | Type::Member(_) | Type::Hierarchy(_) | Type::Dimension(_) | Type::Tuple(_)
    )
}

// ========== Dimensional targets ==========

fn compile_as(
    cx: &mut CompileContext<'_>,
    exp: &Exp,
    target: &Type,
    styles: &[ResultStyle],
) -> CompileResult<CalcRef> {
    let compiler = cx.compiler();
    match target {
        Type::Member(_) => compiler.compile_member(cx, exp),
        Type::Level(_) => compiler.compile_level(cx, exp),
        Type::Hierarchy(_) => compiler.compile_hierarchy(cx, exp),
        Type::Dimension(_) => compiler.compile_dimension(cx, exp),
        Type::Tuple(_) => compiler.compile_tuple(cx, exp),
        Type::Scalar(ScalarType::Numeric(n)) if n.is_integer() => compiler.compile_integer(cx, exp),
        Type::Scalar(ScalarType::Numeric(_)) => compiler.compile_double(cx, exp),
        Type::Scalar(ScalarType::String) => compiler.compile_string(cx, exp),
        Type::Scalar(ScalarType::Boolean) => compiler.compile_boolean(cx, exp),
        Type::Scalar(ScalarType::DateTime) => compiler.compile_datetime(cx, exp),
        Type::Scalar(ScalarType::Any | ScalarType::Null) => compiler.compile_scalar(cx, exp, false),
        Type::Set(_) => {
            let preferred = styles.iter().copied().find(|s| {
                matches!(
                    s,
                    ResultStyle::Iterable | ResultStyle::List | ResultStyle::MutableList
                )
            });
            match preferred {
                Some(ResultStyle::Iterable) => compiler.compile_iter(cx, exp),
                Some(ResultStyle::MutableList) => compiler.compile_list(cx, exp, true),
                Some(_) => compiler.compile_list(cx, exp, false),
                None => {
                    let exp = resolve(cx, exp, false)?;
                    if !exp.ty().is_set() {
                        return Err(CompileError::mismatch("set", &exp.ty(), &exp));
                    }
                    compiler.compile(cx, &exp)
                }
            }
        }
        Type::Cube => {
            let exp = resolve(cx, exp, false)?;
            match exp.ty() {
                Type::Cube => compiler.compile(cx, &exp),
                other => Err(CompileError::unsupported_conversion(other, target)),
            }
        }
    }
}

fn compile_member(cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
    let exp = resolve(cx, exp, false)?;
    let ty = exp.ty();
    let calc = match &ty {
        Type::Member(_) => exp.accept(cx)?,
        // <Hierarchy>.CurrentMember
        Type::Hierarchy(_) | Type::Dimension(_) => {
            let member_ty = Type::Member(MemberType::for_type(&ty));
            let current = Exp::call(Builtin::CurrentMember, vec![exp.into_owned()], member_ty);
            let compiler = cx.compiler();
            compiler.compile_member(cx, &current)?
        }
        _ => return Err(CompileError::mismatch("member", &ty, &exp)),
    };
    let member_ty = Type::Member(MemberType::for_type(&ty));
    Ok(ensure_kind(calc, CalcKind::Member, member_ty))
}

fn compile_level(cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
    let exp = resolve(cx, exp, false)?;
    let ty = exp.ty();
    let level_ty = Type::Level(LevelType::for_type(&ty));
    let calc = match &ty {
        Type::Level(_) => exp.accept(cx)?,
        Type::Member(_) | Type::Hierarchy(_) | Type::Dimension(_) => {
            match ty.level_id().and_then(|id| cx.schema().level(id)) {
                Some(level) => Arc::new(ConstantCalc::level(level.clone())),
                None => {
                    let compiler = cx.compiler();
                    let member = compiler.compile_member(cx, &exp)?;
                    navigate(cx, level_ty.clone(), Navigation::Level, member)
                }
            }
        }
        _ => return Err(CompileError::mismatch("level", &ty, &exp)),
    };
    Ok(ensure_kind(calc, CalcKind::Level, level_ty))
}

fn compile_hierarchy(cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
    let exp = resolve(cx, exp, false)?;
    let ty = exp.ty();
    let hierarchy_ty = Type::Hierarchy(HierarchyType::for_type(&ty));
    let compiler = cx.compiler();
    let calc = match &ty {
        Type::Hierarchy(_) => exp.accept(cx)?,
        Type::Dimension(d) => {
            // Only a dimension with exactly one hierarchy resolves statically.
            match d.dimension().and_then(|id| cx.schema().unique_hierarchy_of(id)) {
                Some(hierarchy) => Arc::new(ConstantCalc::hierarchy(hierarchy.clone())),
                None => {
                    let dimension = compiler.compile_dimension(cx, &exp)?;
                    navigate(cx, hierarchy_ty.clone(), Navigation::DefaultHierarchy, dimension)
                }
            }
        }
        Type::Level(_) | Type::Member(_) => {
            match ty.hierarchy_id().and_then(|id| cx.schema().hierarchy(id)) {
                Some(hierarchy) => Arc::new(ConstantCalc::hierarchy(hierarchy.clone())),
                None => {
                    let child = if matches!(ty, Type::Level(_)) {
                        compiler.compile_level(cx, &exp)?
                    } else {
                        compiler.compile_member(cx, &exp)?
                    };
                    navigate(cx, hierarchy_ty.clone(), Navigation::Hierarchy, child)
                }
            }
        }
        _ => return Err(CompileError::mismatch("hierarchy", &ty, &exp)),
    };
    Ok(ensure_kind(calc, CalcKind::Hierarchy, hierarchy_ty))
}

fn compile_dimension(cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
    let exp = resolve(cx, exp, false)?;
    let ty = exp.ty();
    let dimension_ty = Type::Dimension(DimensionType::for_type(&ty));
    let compiler = cx.compiler();
    let calc = match &ty {
        Type::Dimension(_) => exp.accept(cx)?,
        Type::Hierarchy(_) | Type::Level(_) | Type::Member(_) => {
            match ty.dimension_id().and_then(|id| cx.schema().dimension(id)) {
                Some(dimension) => Arc::new(ConstantCalc::dimension(dimension.clone())),
                None => {
                    let child = match ty {
                        Type::Hierarchy(_) => compiler.compile_hierarchy(cx, &exp)?,
                        Type::Level(_) => compiler.compile_level(cx, &exp)?,
                        _ => compiler.compile_member(cx, &exp)?,
                    };
                    navigate(cx, dimension_ty.clone(), Navigation::Dimension, child)
                }
            }
        }
        _ => return Err(CompileError::mismatch("dimension", &ty, &exp)),
    };
    Ok(ensure_kind(calc, CalcKind::Dimension, dimension_ty))
}

fn compile_tuple(cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
    let exp = resolve(cx, exp, false)?;
    let ty = exp.ty();
    let calc = match &ty {
        Type::Tuple(_) => exp.accept(cx)?,
        Type::Member(_) => {
            let compiler = cx.compiler();
            let member = compiler.compile_member(cx, &exp)?;
            debug!(member = member.name(), "wrapping member as tuple");
            Arc::new(MemberToTupleCalc::new(member))
        }
        _ => return Err(CompileError::mismatch("tuple", &ty, &exp)),
    };
    Ok(ensure_kind(calc, CalcKind::Tuple, ty))
}

// ========== Scalar targets ==========

fn compile_scalar(cx: &mut CompileContext<'_>, exp: &Exp, specific: bool) -> CompileResult<CalcRef> {
    let exp = resolve(cx, exp, true)?;
    let ty = exp.ty();
    let compiler = cx.compiler();
    match &ty {
        Type::Scalar(scalar) if specific => match scalar {
            ScalarType::Numeric(n) if n.is_integer() => compiler.compile_integer(cx, &exp),
            ScalarType::Numeric(_) => compiler.compile_double(cx, &exp),
            ScalarType::String => compiler.compile_string(cx, &exp),
            ScalarType::Boolean => compiler.compile_boolean(cx, &exp),
            ScalarType::DateTime => compiler.compile_datetime(cx, &exp),
            ScalarType::Any | ScalarType::Null => exp.accept(cx),
        },
        Type::Scalar(_) => exp.accept(cx),
        Type::Member(_) | Type::Hierarchy(_) | Type::Dimension(_) => {
            let member = compiler.compile_member(cx, &exp)?;
            Ok(Arc::new(MemberValueCalc::new(member, cx.null_check())))
        }
        // A tuple literal reads its members directly, without building the tuple.
        Type::Tuple(_) => match &*exp {
            Exp::Call(call) if call.fun == Builtin::Tuple => {
                let members = call
                    .args
                    .iter()
                    .map(|arg| compiler.compile_member(cx, arg))
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(Arc::new(MemberArrayValueCalc::new(members, cx.null_check())))
            }
            _ => {
                let tuple = compiler.compile_tuple(cx, &exp)?;
                Ok(Arc::new(TupleValueCalc::new(tuple, cx.null_check())))
            }
        },
        _ => Err(CompileError::mismatch("scalar", &ty, &exp)),
    }
}

/// Compile to the source calculator a scalar conversion starts from.
fn scalar_source<'e>(
    cx: &mut CompileContext<'_>,
    exp: &'e Exp,
    expected: &str,
) -> CompileResult<(Cow<'e, Exp>, CalcRef)> {
    let exp = resolve(cx, exp, true)?;
    let ty = exp.ty();
    if !has_value(&ty) {
        return Err(CompileError::mismatch(expected, &ty, &exp));
    }
    let compiler = cx.compiler();
    let calc = compiler.compile_scalar(cx, &exp, false)?;
    Ok((exp, calc))
}

fn compile_integer(cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
    let resolved = resolve(cx, exp, true)?;
    if resolved.ty().is_integer() {
        let calc = resolved.accept(cx)?;
        return Ok(ensure_kind(calc, CalcKind::Integer, Type::integer()));
    }

    let (exp, calc) = scalar_source(cx, &resolved, "integer")?;
    let ty = exp.ty();
    if let Some(value) = calc.constant_value().cloned() {
        if ty.is_null() {
            debug!(exp = %exp, "folding null constant to integer");
            return Ok(Arc::new(ConstantCalc::null(CalcKind::Integer, Type::integer())));
        }
        if cx.options().fold_constants {
            let folded = match value {
                Value::Null => ConstantCalc::null(CalcKind::Integer, Type::integer()),
                Value::Int(i) => ConstantCalc::integer(i),
                Value::Double(d) => match truncate_to_integer(d) {
                    Some(i) => ConstantCalc::integer(i),
                    None => return Err(CompileError::fold_failure(&Value::Double(d), "INTEGER")),
                },
                other => return Err(CompileError::fold_failure(&other, "INTEGER")),
            };
            debug!(exp = %exp, value = %folded.value(), "folded constant to integer");
            return Ok(Arc::new(folded));
        }
    }
    if calc.kind() == CalcKind::Double {
        debug!(calc = calc.name(), "inserting double to integer narrowing");
        return Ok(Arc::new(DoubleToIntegerCalc::new(calc)));
    }
    Ok(ensure_kind(calc, CalcKind::Integer, Type::integer()))
}

fn compile_double(cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
    let (exp, calc) = scalar_source(cx, exp, "double")?;
    let fold = cx.options().fold_constants;
    let constant = calc.constant_value().cloned();
    match (calc.kind(), constant) {
        (CalcKind::Double, _) => Ok(calc),
        (CalcKind::Integer, Some(Value::Int(i))) if fold => {
            debug!(exp = %exp, "folded constant integer to double");
            Ok(Arc::new(ConstantCalc::double(i as f64)))
        }
        (CalcKind::Integer, _) => {
            debug!(calc = calc.name(), "inserting integer to double widening");
            Ok(Arc::new(IntegerToDoubleCalc::new(calc)))
        }
        (_, Some(Value::Null)) => {
            debug!(exp = %exp, "folding null constant to double");
            Ok(Arc::new(ConstantCalc::null(CalcKind::Double, Type::numeric())))
        }
        (_, Some(value)) if fold => match value.as_number() {
            Some(n) => {
                debug!(exp = %exp, value = n, "folded constant to double");
                Ok(Arc::new(ConstantCalc::double(n)))
            }
            None => Err(CompileError::fold_failure(&value, "NUMERIC")),
        },
        _ => Ok(ensure_kind(calc, CalcKind::Double, Type::numeric())),
    }
}

fn compile_boolean(cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
    let resolved = resolve(cx, exp, true)?;
    if resolved.ty() == Type::boolean() {
        let calc = resolved.accept(cx)?;
        return Ok(ensure_kind(calc, CalcKind::Boolean, Type::boolean()));
    }

    let (exp, calc) = scalar_source(cx, &resolved, "boolean")?;
    let fold = cx.options().fold_constants;
    let folded = match calc.constant_value().cloned() {
        None => return Ok(numeric_to_boolean(calc)),
        Some(Value::Null) => ConstantCalc::null(CalcKind::Boolean, Type::boolean()),
        Some(Value::Bool(_)) => return Ok(ensure_kind(calc, CalcKind::Boolean, Type::boolean())),
        Some(_) if !fold => return Ok(numeric_to_boolean(calc)),
        Some(Value::Int(i)) => ConstantCalc::boolean(i > 0),
        Some(Value::Double(d)) => ConstantCalc::boolean(d > 0.0),
        Some(other) => return Err(CompileError::fold_failure(&other, "BOOLEAN")),
    };
    debug!(exp = %exp, value = %folded.value(), "folded constant to boolean");
    Ok(Arc::new(folded))
}

fn numeric_to_boolean(calc: CalcRef) -> CalcRef {
    match calc.kind() {
        CalcKind::Integer | CalcKind::Double => {
            debug!(calc = calc.name(), "inserting numeric to boolean conversion");
            Arc::new(NumericToBooleanCalc::new(calc))
        }
        _ => ensure_kind(calc, CalcKind::Boolean, Type::boolean()),
    }
}

/// String and datetime: the expression's own calculator if it already has
/// the kind, else a runtime check.
fn compile_simple(
    cx: &mut CompileContext<'_>,
    exp: &Exp,
    target: ScalarType,
    kind: CalcKind,
) -> CompileResult<CalcRef> {
    let resolved = resolve(cx, exp, true)?;
    let calc = if resolved.ty() == Type::Scalar(target) {
        resolved.accept(cx)?
    } else {
        scalar_source(cx, &resolved, &target.to_string())?.1
    };
    Ok(ensure_kind(calc, kind, Type::Scalar(target)))
}

// ========== Set targets ==========

fn compile_list(cx: &mut CompileContext<'_>, exp: &Exp, mutable: bool) -> CompileResult<CalcRef> {
    let exp = resolve(cx, exp, false)?;
    let ty = exp.ty();
    if !ty.is_set() {
        return Err(CompileError::mismatch("list", &ty, &exp));
    }
    let styles = if mutable {
        ResultStyle::MUTABLE_LIST_ONLY
    } else {
        ResultStyle::LIST_ONLY
    };
    let calc = cx.with_styles(styles, |cx| {
        let compiler = cx.compiler();
        compiler.compile(cx, &exp)
    })?;
    if calc.kind() == CalcKind::Iter {
        debug!(calc = calc.name(), "materializing iterator as list");
        return Ok(Arc::new(IterableListCalc::new(calc)));
    }
    Ok(ensure_kind(calc, CalcKind::List, ty))
}

fn compile_iter(cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
    let exp = resolve(cx, exp, false)?;
    let ty = exp.ty();
    if !ty.is_set() {
        return Err(CompileError::mismatch("iterable", &ty, &exp));
    }
    let calc = cx.with_styles(ResultStyle::ITERABLE_ANY, |cx| {
        let compiler = cx.compiler();
        compiler.compile(cx, &exp)
    })?;
    Ok(ensure_kind(calc, CalcKind::Iter, ty))
}

//! Compilation of resolved builtin calls.

use crate::{Builtin, CompileContext, CompileError, CompileResult, FunCall};
use mdx_calc::{
    ArithmeticCalc, CalcRef, CastCalc, ConcatCalc, ConstantCalc, LevelMembersIterCalc,
    LevelMembersListCalc, LogicalCalc, Navigation, NavigationCalc, ResultStyle, SetListCalc,
    TupleCalc,
};
use mdx_types::Type;
use std::sync::Arc;
use tracing::debug;

/// The shape `.Members` produces under a style preference list.
fn members_style(styles: &[ResultStyle]) -> ResultStyle {
    styles
        .iter()
        .copied()
        .find(|s| matches!(s, ResultStyle::Iterable | ResultStyle::List | ResultStyle::Any))
        .unwrap_or(ResultStyle::List)
}

fn first_arg(call: &FunCall) -> CompileResult<&crate::Exp> {
    call.args.first().ok_or_else(|| {
        CompileError::validation(format!("'{}' requires an argument", call.fun.name()))
    })
}

fn navigation(cx: &CompileContext<'_>, ty: &Type, step: Navigation, child: CalcRef) -> CalcRef {
    Arc::new(NavigationCalc::new(ty.clone(), step, child, cx.schema().clone()))
}

/// Compile a call to its calculator, compiling arguments through the
/// active compiler.
pub(crate) fn compile_call(call: &FunCall, cx: &mut CompileContext<'_>) -> CompileResult<CalcRef> {
    let compiler = cx.compiler();
    let calc: CalcRef = match call.fun {
        Builtin::CurrentMember => {
            let hierarchy = compiler.compile_hierarchy(cx, first_arg(call)?)?;
            navigation(cx, &call.ty, Navigation::CurrentMember, hierarchy)
        }
        Builtin::DefaultMember => {
            let hierarchy = compiler.compile_hierarchy(cx, first_arg(call)?)?;
            let known = hierarchy
                .constant_value()
                .and_then(|v| v.as_hierarchy())
                .and_then(|h| h.default_member.clone());
            match known {
                Some(member) => Arc::new(ConstantCalc::member(member)),
                None => navigation(cx, &call.ty, Navigation::DefaultMember, hierarchy),
            }
        }
        Builtin::Hierarchy => {
            let arg = first_arg(call)?;
            match arg.ty() {
                Type::Dimension(_) => compiler.compile_hierarchy(cx, arg)?,
                Type::Level(_) => {
                    let level = compiler.compile_level(cx, arg)?;
                    navigation(cx, &call.ty, Navigation::Hierarchy, level)
                }
                _ => {
                    let member = compiler.compile_member(cx, arg)?;
                    navigation(cx, &call.ty, Navigation::Hierarchy, member)
                }
            }
        }
        Builtin::Dimension => {
            let arg = first_arg(call)?;
            let child = match arg.ty() {
                Type::Hierarchy(_) => compiler.compile_hierarchy(cx, arg)?,
                Type::Level(_) => compiler.compile_level(cx, arg)?,
                _ => compiler.compile_member(cx, arg)?,
            };
            navigation(cx, &call.ty, Navigation::Dimension, child)
        }
        Builtin::Level => {
            let member = compiler.compile_member(cx, first_arg(call)?)?;
            navigation(cx, &call.ty, Navigation::Level, member)
        }
        Builtin::Members => {
            let level = compiler.compile_level(cx, first_arg(call)?)?;
            match members_style(cx.styles()) {
                ResultStyle::Iterable => Arc::new(LevelMembersIterCalc::new(call.ty.clone(), level)),
                _ => Arc::new(LevelMembersListCalc::new(call.ty.clone(), level)),
            }
        }
        Builtin::Tuple => {
            let members = call
                .args
                .iter()
                .map(|arg| compiler.compile_member(cx, arg))
                .collect::<CompileResult<Vec<_>>>()?;
            Arc::new(TupleCalc::new(members))
        }
        Builtin::Set => {
            let mut elements = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                let element = match arg.ty() {
                    Type::Tuple(_) => compiler.compile_tuple(cx, arg)?,
                    Type::Set(_) => compiler.compile_list(cx, arg, false)?,
                    _ => compiler.compile_member(cx, arg)?,
                };
                elements.push(element);
            }
            Arc::new(SetListCalc::new(call.ty.clone(), elements))
        }
        Builtin::Cast(target) => {
            let child = compiler.compile_scalar(cx, first_arg(call)?, false)?;
            match child.constant_value() {
                Some(value) if cx.options().fold_constants => {
                    let folded = CastCalc::cast(target, value.clone())
                        .map_err(|_| CompileError::fold_failure(value, target))?;
                    debug!(target = %target, value = %folded, "folded constant cast");
                    Arc::new(ConstantCalc::new(call.ty.clone(), folded))
                }
                _ => Arc::new(CastCalc::new(target, child)),
            }
        }
        Builtin::Arithmetic(op) => {
            let (left, right) = match call.args.as_slice() {
                [left, right] => (left, right),
                _ => return Err(CompileError::validation(format!("'{}' requires two operands", op))),
            };
            let (left, right) = if call.ty.is_integer() {
                (compiler.compile_integer(cx, left)?, compiler.compile_integer(cx, right)?)
            } else {
                (compiler.compile_double(cx, left)?, compiler.compile_double(cx, right)?)
            };
            Arc::new(ArithmeticCalc::new(op, left, right))
        }
        Builtin::Concat => {
            let parts = call
                .args
                .iter()
                .map(|arg| compiler.compile_string(cx, arg))
                .collect::<CompileResult<Vec<_>>>()?;
            Arc::new(ConcatCalc::new(parts))
        }
        Builtin::Logical(op) => {
            let operands = call
                .args
                .iter()
                .map(|arg| compiler.compile_boolean(cx, arg))
                .collect::<CompileResult<Vec<_>>>()?;
            Arc::new(LogicalCalc::new(op, operands))
        }
    };
    Ok(calc)
}

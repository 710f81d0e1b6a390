//! A compiler decorator with extra conversions.

use crate::compiler::resolve;
use crate::{CompileContext, CompileResult, Exp, ExpCompiler, Parameter, ParameterSlot};
use mdx_calc::{CalcRef, CopyListCalc, ResultStyle};
use mdx_types::Type;
use std::sync::Arc;
use tracing::debug;

/// Forwards to a parent compiler, adding two behaviors:
///
/// - a hierarchy or dimension compiled as a tuple becomes the one-member
///   tuple of its default member
/// - a mutable list request never hands out a list another calculator may
///   share; such results are wrapped in a copy
#[derive(Debug, Clone, Copy, Default)]
pub struct EnhancedCompiler<P> {
    parent: P,
}

impl<P: ExpCompiler> EnhancedCompiler<P> {
    pub fn new(parent: P) -> Self {
        Self { parent }
    }

    pub fn parent(&self) -> &P {
        &self.parent
    }
}

impl<P: ExpCompiler> ExpCompiler for EnhancedCompiler<P> {
    fn compile(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.parent.compile(cx, exp)
    }

    fn compile_as(
        &self,
        cx: &mut CompileContext<'_>,
        exp: &Exp,
        target: &Type,
        styles: &'static [ResultStyle],
    ) -> CompileResult<CalcRef> {
        self.parent.compile_as(cx, exp, target, styles)
    }

    fn compile_member(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.parent.compile_member(cx, exp)
    }

    fn compile_level(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.parent.compile_level(cx, exp)
    }

    fn compile_hierarchy(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.parent.compile_hierarchy(cx, exp)
    }

    fn compile_dimension(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.parent.compile_dimension(cx, exp)
    }

    fn compile_tuple(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        let resolved = resolve(cx, exp, false)?;
        match resolved.ty() {
            // <Hierarchy>.DefaultMember
            Type::Hierarchy(_) | Type::Dimension(_) => {
                let default = Exp::property(resolved.into_owned(), "DefaultMember");
                let default = cx.validator().validate(&default, false)?;
                debug!(exp = %default, "compiling default member as tuple");
                let compiler = cx.compiler();
                compiler.compile_tuple(cx, &default)
            }
            _ => self.parent.compile_tuple(cx, &resolved),
        }
    }

    fn compile_scalar(
        &self,
        cx: &mut CompileContext<'_>,
        exp: &Exp,
        specific: bool,
    ) -> CompileResult<CalcRef> {
        self.parent.compile_scalar(cx, exp, specific)
    }

    fn compile_integer(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.parent.compile_integer(cx, exp)
    }

    fn compile_double(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.parent.compile_double(cx, exp)
    }

    fn compile_string(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.parent.compile_string(cx, exp)
    }

    fn compile_boolean(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.parent.compile_boolean(cx, exp)
    }

    fn compile_datetime(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.parent.compile_datetime(cx, exp)
    }

    fn compile_list(
        &self,
        cx: &mut CompileContext<'_>,
        exp: &Exp,
        mutable: bool,
    ) -> CompileResult<CalcRef> {
        let calc = self.parent.compile_list(cx, exp, mutable)?;
        if mutable && calc.result_style() == ResultStyle::List {
            debug!(calc = calc.name(), "copying immutable list for mutable request");
            return Ok(Arc::new(CopyListCalc::new(calc)));
        }
        Ok(calc)
    }

    fn compile_iter(&self, cx: &mut CompileContext<'_>, exp: &Exp) -> CompileResult<CalcRef> {
        self.parent.compile_iter(cx, exp)
    }

    fn register_parameter(
        &self,
        cx: &mut CompileContext<'_>,
        parameter: &Arc<Parameter>,
    ) -> CompileResult<Arc<ParameterSlot>> {
        self.parent.register_parameter(cx, parameter)
    }
}

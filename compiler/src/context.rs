//! Per-session compile state.

use crate::{CompileResult, CompilerOptions, Exp, ExpCompiler, ParameterRegistry, Validator};
use mdx_calc::{CalcRef, Evaluator, ResultStyle};
use mdx_schema::Schema;
use mdx_types::Type;
use std::sync::Arc;

/// Everything one compilation session shares across recursive calls.
///
/// The context carries the outermost compiler, so every entry point recurses
/// through it rather than through whichever compiler it was called on. It
/// also owns the only mutable compile state: the active result-style list
/// and the parameter registry.
pub struct CompileContext<'a> {
    compiler: &'a dyn ExpCompiler,
    validator: &'a dyn Validator,
    schema: Arc<Schema>,
    options: CompilerOptions,
    styles: &'static [ResultStyle],
    parameters: ParameterRegistry,
    evaluator_null_check: bool,
}

impl<'a> CompileContext<'a> {
    pub fn new(
        compiler: &'a dyn ExpCompiler,
        validator: &'a dyn Validator,
        schema: Arc<Schema>,
    ) -> Self {
        let options = CompilerOptions::default();
        Self {
            compiler,
            validator,
            schema,
            styles: options.default_styles.styles(),
            options,
            parameters: ParameterRegistry::new(),
            evaluator_null_check: false,
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.styles = options.default_styles.styles();
        self.options = options;
        self
    }

    /// Take the null-for-unrelated-dimension behavior from the evaluator the
    /// compiled tree will run against.
    pub fn with_evaluator(mut self, evaluator: &dyn Evaluator) -> Self {
        self.evaluator_null_check = evaluator.might_return_null_for_unrelated_dimension();
        self
    }

    /// The outermost compiler of this session.
    pub fn compiler(&self) -> &'a dyn ExpCompiler {
        self.compiler
    }

    pub fn validator(&self) -> &'a dyn Validator {
        self.validator
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// The active result-style preference list.
    pub fn styles(&self) -> &'static [ResultStyle] {
        self.styles
    }

    /// Run `f` with `styles` active, restoring the previous list afterwards
    /// whether `f` succeeds or fails.
    pub fn with_styles<T>(
        &mut self,
        styles: &'static [ResultStyle],
        f: impl FnOnce(&mut Self) -> CompileResult<T>,
    ) -> CompileResult<T> {
        let saved = std::mem::replace(&mut self.styles, styles);
        let result = f(self);
        self.styles = saved;
        result
    }

    pub fn parameters(&self) -> &ParameterRegistry {
        &self.parameters
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut ParameterRegistry {
        &mut self.parameters
    }

    /// Whether value readers should check for unrelated dimensions.
    pub fn null_check(&self) -> bool {
        self.options
            .null_for_unrelated_dimension
            .unwrap_or(self.evaluator_null_check)
    }

    // ========== Session entry points ==========

    pub fn compile(&mut self, exp: &Exp) -> CompileResult<CalcRef> {
        let compiler = self.compiler;
        compiler.compile(self, exp)
    }

    pub fn compile_as(
        &mut self,
        exp: &Exp,
        target: &Type,
        styles: &'static [ResultStyle],
    ) -> CompileResult<CalcRef> {
        let compiler = self.compiler;
        compiler.compile_as(self, exp, target, styles)
    }
}

//! Scalar conversion integration tests.
//!
//! These tests compile literals and cell reads to each scalar target and
//! check:
//! - Constant folding of null, numeric and boolean conversions
//! - Runtime widening and narrowing nodes when folding is off
//! - Runtime checks around cell reads of unknown type
//! - Fold failures on constants that cannot convert

use mdx_calc::CalcWriter;
use mdx_compiler::{BaseCompiler, BuiltinValidator, CompileContext};
use mdx_tests::prelude::*;
use pretty_assertions::assert_eq;

mod folding {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("folding", sales_schema())
            .step("integer_over_null", Exp::null(), Type::integer(), |a| {
                a.kind(CalcKind::Integer).constant().null().reads(0)
            })
            .step("integer_truncates", Exp::numeric(-7.8), Type::integer(), |a| {
                a.constant().value(-7i64)
            })
            .step("double_widens_integer", Exp::integer(3), Type::numeric(), |a| {
                a.kind(CalcKind::Double).constant().value(3.0)
            })
            .step("double_over_null", Exp::null(), Type::numeric(), |a| {
                a.kind(CalcKind::Double).null()
            })
            .step("boolean_over_five", Exp::integer(5), Type::boolean(), |a| {
                a.constant().value(true)
            })
            .step("boolean_over_zero", Exp::integer(0), Type::boolean(), |a| {
                a.constant().value(false)
            })
            .step("boolean_over_null", Exp::null(), Type::boolean(), |a| {
                a.kind(CalcKind::Boolean).null()
            })
            .step("boolean_unchanged", Exp::boolean(false), Type::boolean(), |a| {
                a.calc("Constant").value(false)
            })
            .step("boolean_over_string", Exp::string("maybe"), Type::boolean(), |a| {
                a.error("Cannot fold")
            })
            .step("integer_over_string", Exp::string("abc"), Type::integer(), |a| {
                a.error("Cannot fold")
            })
            .step("double_over_string", Exp::string("abc"), Type::numeric(), |a| {
                a.error("Cannot fold")
            })
    }

    #[test]
    fn test_constant_folding() {
        scenario().run().unwrap();
    }
}

mod runtime_nodes {
    use super::*;

    pub fn scenario() -> Scenario {
        let options = CompilerOptions {
            fold_constants: false,
            ..CompilerOptions::default()
        };
        Scenario::new("runtime_nodes", sales_schema())
            .options(options)
            .step("narrowing", Exp::numeric(2.9), Type::integer(), |a| {
                a.calc("DoubleToInteger").not_constant().value(2i64)
            })
            .step("widening", Exp::integer(2), Type::numeric(), |a| {
                a.calc("IntegerToDouble").value(2.0)
            })
            .step("numeric_to_boolean", Exp::numeric(-0.5), Type::boolean(), |a| {
                a.calc("NumericToBoolean").value(true)
            })
            .step("null_still_folds", Exp::null(), Type::integer(), |a| {
                a.constant().null()
            })
    }

    #[test]
    fn test_conversion_nodes_without_folding() {
        scenario().run().unwrap();
    }
}

mod cell_reads {
    use super::*;

    pub fn scenario() -> Scenario {
        let schema = sales_schema();
        let female = member(&schema, "[Gender].[F]");
        let male = member(&schema, "[Gender].[M]");
        Scenario::new("cell_reads", schema)
            .cell(&[female.clone()], 4i64)
            .cell(&[male.clone()], false)
            .step("scalar", Exp::Member(female.clone()), Type::scalar(), |a| {
                a.calc("MemberValue").value(4i64).reads(1)
            })
            .step("as_double", Exp::Member(female.clone()), Type::numeric(), |a| {
                a.calc("UnknownToDouble").value(4.0)
            })
            .step("as_boolean", Exp::Member(male), Type::boolean(), |a| {
                a.kind(CalcKind::Boolean).value(false)
            })
            .step("as_string", Exp::Member(female), Type::string(), |a| {
                a.error("Cannot convert")
            })
    }

    #[test]
    fn test_cell_reads_get_runtime_checks() {
        scenario().run().unwrap();
    }
}

#[test]
fn test_cast_folds_at_compile_time() {
    let cast = Exp::unresolved("Cast", Syntax::Function, vec![Exp::integer(12), Exp::symbol("String")]);
    let bad = Exp::unresolved("Cast", Syntax::Function, vec![Exp::string("x"), Exp::symbol("Integer")]);

    Scenario::new("cast", sales_schema())
        .step("int_to_string", cast, Type::string(), |a| a.constant().value("12"))
        .step("string_to_int", bad, Type::integer(), |a| a.error("Cannot fold"))
        .run()
        .unwrap();
}

#[test]
fn test_arithmetic_over_cells() {
    let schema = sales_schema();
    let female = member(&schema, "[Gender].[F]");
    let male = member(&schema, "[Gender].[M]");
    let sum = Exp::unresolved("+", Syntax::Infix, vec![Exp::Member(female.clone()), Exp::Member(male.clone())]);
    let ratio = Exp::unresolved("/", Syntax::Infix, vec![Exp::Member(female.clone()), Exp::integer(0)]);

    Scenario::new("arithmetic", schema)
        .cell(&[female], 6i64)
        .cell(&[male], 4i64)
        .step("sum", sum, Type::numeric(), |a| a.kind(CalcKind::Double).value(10.0).reads(2))
        .step("division_by_zero", ratio, Type::numeric(), |a| a.error("Division by zero"))
        .run()
        .unwrap();
}

#[test]
fn test_explain_shows_inserted_conversion() {
    // GIVEN a session that does not fold constants
    let compiler = BaseCompiler;
    let validator = BuiltinValidator;
    let options = CompilerOptions {
        fold_constants: false,
        ..CompilerOptions::default()
    };
    let mut cx = CompileContext::new(&compiler, &validator, sales_schema()).with_options(options);

    // WHEN
    let calc = cx.compile_as(&Exp::integer(2), &Type::numeric(), ResultStyle::ANY_ONLY).unwrap();

    // THEN the widening node sits above the literal
    assert_eq!(
        CalcWriter::explain(&*calc),
        "IntegerToDouble(kind=Double, type=NUMERIC, style=VALUE)\n  \
         Constant(kind=Integer, type=INTEGER, style=VALUE, value=2)\n"
    );
}

//! Parameter registration integration tests.

use mdx_compiler::{BaseCompiler, BuiltinValidator, CompileContext, ExpCompiler, Parameter};
use mdx_tests::prelude::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn session_parts() -> (BaseCompiler, BuiltinValidator) {
    (BaseCompiler, BuiltinValidator)
}

#[test]
fn test_parameter_referenced_twice_shares_one_slot() {
    // GIVEN
    let schema = sales_schema();
    let (compiler, validator) = session_parts();
    let mut cx = CompileContext::new(&compiler, &validator, schema.clone());
    let rate = Arc::new(Parameter::new("Rate", Type::integer(), Exp::integer(3)));
    let double_rate = Exp::unresolved(
        "+",
        Syntax::Infix,
        vec![Exp::Parameter(rate.clone()), Exp::Parameter(rate.clone())],
    );

    // WHEN
    let calc = cx.compile_as(&double_rate, &Type::integer(), ResultStyle::ANY_ONLY).unwrap();

    // THEN
    assert_eq!(cx.parameters().len(), 1);
    let mut evaluator = CellEvaluator::new(&schema);
    assert_eq!(calc.evaluate(&mut evaluator).unwrap(), Value::Int(6));

    let slot = cx.parameters().get("Rate").unwrap();
    slot.set_value(Value::Int(10));
    assert_eq!(calc.evaluate(&mut evaluator).unwrap(), Value::Int(20));
    slot.unset();
    assert_eq!(calc.evaluate(&mut evaluator).unwrap(), Value::Int(6));
}

#[test]
fn test_slots_are_dense_in_registration_order() {
    let (compiler, validator) = session_parts();
    let mut cx = CompileContext::new(&compiler, &validator, sales_schema());
    let a = Arc::new(Parameter::new("A", Type::integer(), Exp::integer(1)));
    let b = Arc::new(Parameter::new("B", Type::string(), Exp::string("b")));

    let slot_a = compiler.register_parameter(&mut cx, &a).unwrap();
    let slot_b = compiler.register_parameter(&mut cx, &b).unwrap();
    let again = compiler.register_parameter(&mut cx, &a).unwrap();

    assert_eq!((slot_a.index(), slot_b.index()), (0, 1));
    assert!(Arc::ptr_eq(&slot_a, &again));
    let names: Vec<_> = cx.parameters().iter().map(|s| s.parameter().name().to_string()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn test_default_is_converted_to_declared_type() {
    let schema = sales_schema();
    let (compiler, validator) = session_parts();
    let mut cx = CompileContext::new(&compiler, &validator, schema.clone());
    let ratio = Arc::new(Parameter::new("Ratio", Type::numeric(), Exp::integer(2)));
    let label = Arc::new(Parameter::new("Label", Type::string(), Exp::numeric(1.5)));

    let ratio = compiler.register_parameter(&mut cx, &ratio).unwrap();
    let label = compiler.register_parameter(&mut cx, &label).unwrap();

    let mut evaluator = CellEvaluator::new(&schema);
    assert_eq!(ratio.evaluate(&mut evaluator).unwrap(), Value::Double(2.0));
    assert_eq!(label.evaluate(&mut evaluator).unwrap(), Value::String("1.5".into()));
    assert_eq!(ratio.cached_default_value(), Some(Value::Double(2.0)));
}

#[test]
fn test_member_parameter_reads_its_cell() {
    // GIVEN a member-typed parameter whose default is a fixed member
    let schema = sales_schema();
    let female = member(&schema, "[Gender].[F]");
    let male = member(&schema, "[Gender].[M]");
    let gender = Arc::new(Parameter::new(
        "Gender",
        Type::Member(MemberType::for_member(&female)),
        Exp::Member(female.clone()),
    ));

    // WHEN / THEN
    Scenario::new("member_parameter", schema)
        .cell(&[female], 8i64)
        .cell(&[male], 5i64)
        .step("read", Exp::Parameter(gender), Type::scalar(), |a| {
            a.calc("MemberValue").value(8i64)
        })
        .run()
        .unwrap();
}

#[test]
fn test_slot_keeps_the_declared_parameter() {
    let (compiler, validator) = session_parts();
    let mut cx = CompileContext::new(&compiler, &validator, sales_schema());
    let year = Arc::new(
        Parameter::new("Year", Type::integer(), Exp::integer(1997))
            .with_description("Fiscal year to report on"),
    );

    let slot = compiler.register_parameter(&mut cx, &year).unwrap();

    assert!(Arc::ptr_eq(slot.parameter(), &year));
    assert_eq!(slot.parameter().description(), Some("Fiscal year to report on"));
    assert_eq!(slot.parameter().ty(), &Type::integer());
}

//! Compiler decorator integration tests.

use mdx_compiler::{
    BaseCompiler, BuiltinValidator, CompileContext, DelegatingCompiler, EnhancedCompiler, EntryPoint,
    ExpCompiler, LoggingHook, ProfilingHook,
};
use mdx_tests::prelude::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn test_hook_fires_for_every_nested_compile() {
    // GIVEN
    init_tracing();
    let schema = sales_schema();
    let female = member(&schema, "[Gender].[F]");
    let hook = Arc::new(ProfilingHook::new());
    let compiler = DelegatingCompiler::new(BaseCompiler, hook.clone());
    let validator = BuiltinValidator;
    let mut cx = CompileContext::new(&compiler, &validator, schema);
    let sum = Exp::unresolved("+", Syntax::Infix, vec![Exp::Member(female), Exp::integer(2)]);

    // WHEN
    cx.compile_as(&sum, &Type::numeric(), ResultStyle::ANY_ONLY).unwrap();

    // THEN the outer request, the sum, and each operand with its value read
    let counts: Vec<_> = hook.snapshot().into_iter().map(|(e, s)| (e, s.count)).collect();
    assert_eq!(
        counts,
        vec![
            (EntryPoint::CompileAs, 1),
            (EntryPoint::Member, 1),
            (EntryPoint::Scalar, 3),
            (EntryPoint::Double, 3),
        ]
    );
    assert_eq!(hook.total_count(), 8);
}

#[test]
fn test_decorators_stack() {
    let schema = sales_schema();
    let store = hierarchy(&schema, "[Store]");
    let hook = Arc::new(ProfilingHook::new());
    let compiler = DelegatingCompiler::new(EnhancedCompiler::new(BaseCompiler), hook.clone());
    let validator = BuiltinValidator;
    let mut cx = CompileContext::new(&compiler, &validator, schema);

    let calc = cx
        .compile_as(&Exp::Hierarchy(store), &Type::Tuple(Vec::new()), ResultStyle::ANY_ONLY)
        .unwrap();

    assert_eq!(calc.kind(), CalcKind::Tuple);
    // Once for the hierarchy, once for the synthesized default member.
    assert_eq!(hook.stats(EntryPoint::Tuple).count, 2);
}

#[test]
fn test_logging_hook_passes_results_through() {
    init_tracing();
    let compiler = DelegatingCompiler::new(BaseCompiler, LoggingHook);
    let validator = BuiltinValidator;
    let mut cx = CompileContext::new(&compiler, &validator, sales_schema());

    let calc = cx.compile_as(&Exp::integer(4), &Type::boolean(), ResultStyle::ANY_ONLY).unwrap();

    assert_eq!(calc.constant_value(), Some(&Value::Bool(true)));
}

mod enhanced_tuples {
    use super::*;

    pub fn scenario() -> Scenario {
        let schema = sales_schema();
        let store = hierarchy(&schema, "[Store]");
        let time = dimension(&schema, "Time");
        let all_stores = member(&schema, "[Store].[All Stores]");
        let year = member(&schema, "[Time].[1997]");
        Scenario::new("enhanced_tuples", schema)
            .enhanced()
            .step("hierarchy", Exp::Hierarchy(store), Type::Tuple(Vec::new()), |a| {
                a.value(Value::Tuple(vec![all_stores]))
            })
            .step("dimension", Exp::Dimension(time), Type::Tuple(Vec::new()), |a| {
                a.kind(CalcKind::Tuple).value(Value::Tuple(vec![year]))
            })
    }

    #[test]
    fn test_default_member_tuples() {
        scenario().run().unwrap();
    }
}

#[test]
fn test_mutable_list_does_not_share_schema_storage() {
    // GIVEN
    let schema = sales_schema();
    let genders = level(&schema, "[Gender].[Gender]");
    let female = member(&schema, "[Gender].[F]");
    let members = Exp::property(Exp::Level(genders.clone()), "Members");
    let base = BaseCompiler;
    let enhanced = EnhancedCompiler::new(BaseCompiler);
    let validator = BuiltinValidator;
    let mut evaluator = CellEvaluator::new(&schema);

    // WHEN
    let shared = {
        let mut cx = CompileContext::new(&base, &validator, schema.clone());
        base.compile_list(&mut cx, &members, true).unwrap()
    };
    let copied = {
        let mut cx = CompileContext::new(&enhanced, &validator, schema.clone());
        enhanced.compile_list(&mut cx, &members, true).unwrap()
    };
    let shared = shared.evaluate_list(&mut evaluator).unwrap();
    let mut copied = copied.evaluate_list(&mut evaluator).unwrap();

    // THEN
    assert!(shared.is_shared());
    assert!(!copied.is_shared());
    copied.push(vec![female]);
    assert_eq!(copied.len(), 3);
    assert_eq!(genders.members.len(), 2);
}

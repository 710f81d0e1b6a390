//! Value reader integration tests.
//!
//! These tests run against the sales schema to test:
//! - Member, tuple and member-array readers
//! - Null for members of unrelated dimensions
//! - Context restoration when the cell read fails
//! - Hierarchy dependencies of readers

use mdx_compiler::{BaseCompiler, BuiltinValidator, CompileContext};
use mdx_tests::prelude::*;
use pretty_assertions::assert_eq;

fn tuple(members: Vec<Exp>) -> Exp {
    Exp::unresolved("()", Syntax::Parentheses, members)
}

mod readers {
    use super::*;

    pub fn scenario() -> Scenario {
        let schema = sales_schema();
        let female = member(&schema, "[Gender].[F]");
        let ca = member(&schema, "[Store].[USA].[CA]");
        let usa = member(&schema, "[Store].[USA]");
        let store_hierarchy = hierarchy(&schema, "[Store]");
        Scenario::new("readers", schema)
            .context(usa.clone())
            .cell(&[usa.clone()], 11i64)
            .cell(&[ca.clone()], 3i64)
            .cell(&[female.clone(), usa], 20i64)
            .cell(&[female.clone(), ca.clone()], 7i64)
            .step("member", Exp::Member(ca.clone()), Type::scalar(), |a| {
                a.calc("MemberValue").value(3i64).reads(1)
            })
            .step(
                "tuple_literal",
                tuple(vec![Exp::Member(female.clone()), Exp::Member(ca)]),
                Type::scalar(),
                |a| a.calc("MemberArrayValue").value(7i64),
            )
            .step(
                "tuple_with_current_member",
                tuple(vec![Exp::Member(female), Exp::Hierarchy(store_hierarchy.clone())]),
                Type::scalar(),
                |a| a.calc("MemberArrayValue").value(20i64),
            )
            .step("hierarchy", Exp::Hierarchy(store_hierarchy), Type::scalar(), |a| {
                a.calc("MemberValue").value(11i64)
            })
    }

    #[test]
    fn test_readers_bind_context() {
        scenario().run().unwrap();
    }
}

mod unrelated_dimensions {
    use super::*;

    pub fn scenario(options: CompilerOptions) -> Scenario {
        let schema = sales_schema();
        let ca = member(&schema, "[Store].[USA].[CA]");
        let store = dimension(&schema, "Store");
        Scenario::new("unrelated_dimensions", schema)
            .options(options)
            .unrelated(store.id)
            .cell(&[ca.clone()], 3i64)
            .step("member", Exp::Member(ca.clone()), Type::scalar(), |a| a.null().reads(0))
            .step("tuple", tuple(vec![Exp::Member(ca)]), Type::scalar(), |a| a.null().reads(0))
    }

    #[test]
    fn test_unrelated_dimension_reads_null() {
        scenario(CompilerOptions::default()).run().unwrap();
    }

    #[test]
    fn test_option_disables_null_check() {
        let options = CompilerOptions {
            null_for_unrelated_dimension: Some(false),
            ..CompilerOptions::default()
        };

        let err = scenario(options).run().unwrap_err();

        assert!(matches!(err, ScenarioError::AssertionFailed { .. }));
    }
}

#[test]
fn test_context_restored_when_read_fails() {
    // GIVEN a cell store that fails every read
    let schema = sales_schema();
    let female = member(&schema, "[Gender].[F]");
    let ca = member(&schema, "[Store].[USA].[CA]");

    // WHEN / THEN the runner also fails the step if a savepoint is left open
    Scenario::new("failing", schema)
        .failing_cells()
        .step("member", Exp::Member(female.clone()), Type::scalar(), |a| {
            a.error("cell store unavailable")
        })
        .step("tuple", tuple(vec![Exp::Member(female), Exp::Member(ca)]), Type::scalar(), |a| {
            a.error("cell store unavailable")
        })
        .run()
        .unwrap();
}

#[test]
fn test_reader_dependencies() {
    // GIVEN
    let schema = sales_schema();
    let female = member(&schema, "[Gender].[F]");
    let gender = hierarchy(&schema, "[Gender]");
    let store = hierarchy(&schema, "[Store]");
    let compiler = BaseCompiler;
    let validator = BuiltinValidator;
    let mut cx = CompileContext::new(&compiler, &validator, schema);

    // WHEN
    let fixed = cx
        .compile_as(&Exp::Member(female), &Type::scalar(), ResultStyle::ANY_ONLY)
        .unwrap();
    let current = cx
        .compile_as(&Exp::Hierarchy(gender.clone()), &Type::scalar(), ResultStyle::ANY_ONLY)
        .unwrap();

    // THEN
    assert_eq!(
        (fixed.depends_on(&gender), fixed.depends_on(&store)),
        (false, true)
    );
    assert!(current.depends_on(&gender));
}

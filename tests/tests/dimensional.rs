//! Dimensional conversion integration tests.
//!
//! These tests run against the sales schema to test:
//! - Static resolution of hierarchies, levels and dimensions
//! - Runtime navigation when the target cannot be resolved statically
//! - `.CurrentMember` and `.DefaultMember` semantics
//! - Set shapes and static type mismatches

use mdx_tests::prelude::*;
use mdx_types::{DimensionType, LevelType};

fn hierarchy_type() -> Type {
    Type::Hierarchy(HierarchyType::unknown())
}

fn member_type() -> Type {
    Type::Member(MemberType::unknown())
}

mod dimension_to_hierarchy {
    use super::*;

    pub fn scenario() -> Scenario {
        let schema = sales_schema();
        let gender = dimension(&schema, "Gender");
        let time = dimension(&schema, "Time");
        let gender_hierarchy = hierarchy(&schema, "[Gender]");
        let time_hierarchy = hierarchy(&schema, "[Time]");
        Scenario::new("dimension_to_hierarchy", schema)
            .step("single_hierarchy", Exp::Dimension(gender), hierarchy_type(), |a| {
                a.constant().value(Value::Hierarchy(gender_hierarchy))
            })
            .step("several_hierarchies", Exp::Dimension(time), hierarchy_type(), |a| {
                a.calc("DefaultHierarchy")
                    .not_constant()
                    .value(Value::Hierarchy(time_hierarchy))
            })
    }

    #[test]
    fn test_dimension_to_hierarchy() {
        scenario().run().unwrap();
    }
}

mod static_resolution {
    use super::*;

    pub fn scenario() -> Scenario {
        let schema = sales_schema();
        let ca = member(&schema, "[Store].[USA].[CA]");
        let state = level(&schema, "[Store].[State]");
        let store = dimension(&schema, "Store");
        let store_hierarchy = hierarchy(&schema, "[Store]");
        Scenario::new("static_resolution", schema)
            .step("member_level", Exp::Member(ca.clone()), Type::Level(LevelType::unknown()), |a| {
                a.constant().value(Value::Level(state.clone()))
            })
            .step("member_hierarchy", Exp::Member(ca.clone()), hierarchy_type(), |a| {
                a.constant().value(Value::Hierarchy(store_hierarchy.clone()))
            })
            .step("level_hierarchy", Exp::Level(state.clone()), hierarchy_type(), |a| {
                a.constant().value(Value::Hierarchy(store_hierarchy))
            })
            .step(
                "member_dimension",
                Exp::Member(ca),
                Type::Dimension(DimensionType::unknown()),
                |a| a.constant().value(Value::Dimension(store)),
            )
    }

    #[test]
    fn test_static_targets_fold_to_constants() {
        scenario().run().unwrap();
    }
}

mod current_member {
    use super::*;

    pub fn scenario() -> Scenario {
        let schema = sales_schema();
        let female = member(&schema, "[Gender].[F]");
        let gender_hierarchy = hierarchy(&schema, "[Gender]");
        let store_hierarchy = hierarchy(&schema, "[Store]");
        let all_stores = member(&schema, "[Store].[All Stores]");
        let gender = dimension(&schema, "Gender");
        Scenario::new("current_member", schema)
            .context(female.clone())
            .step("hierarchy", Exp::Hierarchy(gender_hierarchy), member_type(), |a| {
                a.calc("CurrentMember").value(Value::Member(female.clone()))
            })
            .step("dimension", Exp::Dimension(gender), member_type(), |a| {
                a.calc("CurrentMember").value(Value::Member(female))
            })
            .step(
                "default_member",
                Exp::property(Exp::Hierarchy(store_hierarchy), "DefaultMember"),
                member_type(),
                |a| a.constant().value(Value::Member(all_stores)),
            )
    }

    #[test]
    fn test_current_and_default_member() {
        scenario().run().unwrap();
    }
}

mod shapes {
    use super::*;

    pub fn scenario() -> Scenario {
        let schema = sales_schema();
        let female = member(&schema, "[Gender].[F]");
        let genders = level(&schema, "[Gender].[Gender]");
        let members = Exp::property(Exp::Level(genders), "Members");
        Scenario::new("shapes", schema)
            .step("member_as_tuple", Exp::Member(female.clone()), Type::Tuple(Vec::new()), |a| {
                a.calc("MemberToTuple").value(Value::Tuple(vec![female.clone()]))
            })
            .step_styled(
                "members_as_list",
                members.clone(),
                Type::set(member_type()),
                ResultStyle::LIST_ONLY,
                |a| {
                    a.kind(CalcKind::List)
                        .assert_fn(|o| o.value.as_list().map(|l| l.len()) == Some(2))
                },
            )
            .step_styled(
                "members_as_iterable",
                members,
                Type::set(member_type()),
                ResultStyle::ITERABLE_ANY,
                |a| a.kind(CalcKind::Iter),
            )
    }

    #[test]
    fn test_set_shapes_follow_styles() {
        scenario().run().unwrap();
    }
}

mod mismatches {
    use super::*;

    pub fn scenario() -> Scenario {
        let schema = sales_schema();
        let female = member(&schema, "[Gender].[F]");
        let store_hierarchy = hierarchy(&schema, "[Store]");
        Scenario::new("mismatches", schema)
            .step("member_over_null", Exp::null(), member_type(), |a| {
                a.error("cannot be compiled as member")
            })
            .step("list_over_scalar", Exp::integer(1), Type::set(member_type()), |a| {
                a.error("cannot be compiled as list")
            })
            .step("tuple_over_hierarchy", Exp::Hierarchy(store_hierarchy), Type::Tuple(Vec::new()), |a| {
                a.error("cannot be compiled as tuple")
            })
            .step("cube_over_member", Exp::Member(female), Type::Cube, |a| {
                a.error("Cannot convert")
            })
            .step(
                "unknown_function",
                Exp::unresolved("Ancestor", Syntax::Function, vec![Exp::integer(1)]),
                Type::scalar(),
                |a| a.error("No function matches signature"),
            )
    }

    #[test]
    fn test_unreachable_targets_fail_fast() {
        scenario().run().unwrap();
    }
}

//! Type lattice integration tests over schema-derived types.

use mdx_tests::prelude::*;
use mdx_types::{common_type, is_union_compatible};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn member_type(unique_name: &str) -> Type {
    let schema = sales_schema();
    Type::Member(MemberType::for_member(&member(&schema, unique_name)))
}

fn sample(name: &str) -> Type {
    match name {
        "numeric" => Type::numeric(),
        "string" => Type::string(),
        "boolean" => Type::boolean(),
        "female" => member_type("[Gender].[F]"),
        "california" => member_type("[Store].[USA].[CA]"),
        _ => unreachable!("unknown sample {}", name),
    }
}

#[rstest]
#[case("numeric", "string")]
#[case("numeric", "female")]
#[case("string", "boolean")]
#[case("string", "california")]
#[case("boolean", "female")]
#[case("female", "california")]
#[case("female", "female")]
fn test_common_type_is_symmetric(#[case] a: &str, #[case] b: &str) {
    let (a, b) = (sample(a), sample(b));

    assert_eq!(a.compute_common_type(&b, None), b.compute_common_type(&a, None));
}

#[test]
fn test_siblings_meet_at_their_level() {
    // GIVEN
    let schema = sales_schema();
    let gender_level = level(&schema, "[Gender].[Gender]");

    // WHEN
    let common = member_type("[Gender].[F]").compute_common_type(&member_type("[Gender].[M]"), None);

    // THEN
    assert_eq!(common, Some(Type::Member(MemberType::for_level(&gender_level))));
}

#[test]
fn test_members_of_different_dimensions_meet_at_unknown_member() {
    let common = member_type("[Gender].[F]")
        .compute_common_type(&member_type("[Store].[USA].[CA]"), None);

    assert_eq!(common, Some(Type::Member(MemberType::unknown())));
}

#[test]
fn test_members_of_one_hierarchy_keep_the_hierarchy() {
    let schema = sales_schema();
    let store = hierarchy(&schema, "[Store]");

    let common = member_type("[Store].[USA]")
        .compute_common_type(&member_type("[Store].[USA].[CA]"), None);

    assert_eq!(common, Some(Type::Member(MemberType::for_hierarchy(&store))));
}

#[test]
fn test_decimals_of_different_scale_widen_to_numeric() {
    let common = Type::decimal(5, 2).compute_common_type(&Type::decimal(5, -3), None);

    assert_eq!(common, Some(Type::numeric()));
}

#[test]
fn test_tuple_arity_mismatch_pads_with_scalar() {
    // GIVEN
    let female = member_type("[Gender].[F]");
    let california = member_type("[Store].[USA].[CA]");
    let short = Type::Tuple(vec![female.clone()]);
    let long = Type::Tuple(vec![female.clone(), california]);

    // WHEN
    let common = long.compute_common_type(&short, None).unwrap();

    // THEN
    assert_eq!(common, Type::Tuple(vec![female, Type::scalar()]));
}

#[test]
fn test_sets_of_one_dimension_are_union_compatible() {
    let females = Type::set(member_type("[Gender].[F]"));
    let males = Type::set(member_type("[Gender].[M]"));
    let pairs = Type::set(Type::Tuple(vec![
        member_type("[Gender].[F]"),
        member_type("[Store].[USA]"),
    ]));

    assert!(is_union_compatible(&females, &males));
    assert!(!is_union_compatible(&females, &pairs));
}

#[test]
fn test_common_type_of_expression_types() {
    // GIVEN the static types of a member, a hierarchy and a dimension
    let schema = sales_schema();
    let types = vec![
        Exp::Member(member(&schema, "[Gender].[F]")).ty(),
        Exp::Hierarchy(hierarchy(&schema, "[Gender]")).ty(),
        Exp::Dimension(dimension(&schema, "Gender")).ty(),
    ];

    // THEN they only unify through conversions, and meet at member
    assert_eq!(common_type(false, &types), None);
    let common = common_type(true, &types).unwrap();
    assert!(matches!(common, Type::Member(_)));
    assert_eq!(common.dimension_id(), Some(dimension(&schema, "Gender").id));
}

//! A small sales cube to compile against.

use mdx_core::{Dimension, DimensionKind, Hierarchy, Level, Member};
use mdx_schema::{HierarchyDef, Schema, SchemaBuilder, SchemaResult};
use std::sync::Arc;

/// Store, Gender, Time and Measures, joined in a `Sales` cube.
///
/// `Time` has two hierarchies, `Time` (the default) and `Weekly`, so it
/// cannot be resolved to a hierarchy without a runtime lookup. Every other
/// dimension has exactly one hierarchy.
pub fn sales_schema() -> Arc<Schema> {
    let mut builder = SchemaBuilder::new();
    let schema = declare_sales(&mut builder).and_then(|_| builder.build());
    match schema {
        Ok(schema) => Arc::new(schema),
        Err(e) => panic!("sales schema is invalid: {}", e),
    }
}

fn declare_sales(builder: &mut SchemaBuilder) -> SchemaResult<()> {
    builder
        .add_dimension("Store")
        .hierarchy(
            HierarchyDef::new("Store")
                .with_all("All Stores")
                .level("Country")
                .member("USA")
                .member("Mexico")
                .level("State")
                .member_of("CA", "USA")
                .member_of("OR", "USA")
                .member_of("Jalisco", "Mexico"),
        )
        .done()?;
    builder
        .add_dimension("Gender")
        .hierarchy(
            HierarchyDef::new("Gender")
                .with_all("All Gender")
                .level("Gender")
                .member("F")
                .member("M"),
        )
        .done()?;
    builder
        .add_dimension("Time")
        .kind(DimensionKind::Time)
        .hierarchy(
            HierarchyDef::new("Time")
                .level("Year")
                .member("1997")
                .member("1998")
                .level("Quarter")
                .member_of("Q1", "1997")
                .member_of("Q2", "1997")
                .default_member("1997"),
        )
        .hierarchy(HierarchyDef::new("Weekly").level("Year").member("1997"))
        .default_hierarchy("Time")
        .done()?;
    builder.add_measures(&["Unit Sales", "Store Sales"])?;
    builder
        .add_cube("Sales")
        .dimension("Store")
        .dimension("Gender")
        .dimension("Time")
        .dimension("Measures")
        .done()?;
    Ok(())
}

/// Look up a member by unique name, panicking if the fixture lacks it.
pub fn member(schema: &Schema, unique_name: &str) -> Arc<Member> {
    match schema.member_by_unique_name(unique_name) {
        Some(member) => member.clone(),
        None => panic!("no member {} in fixture", unique_name),
    }
}

pub fn hierarchy(schema: &Schema, unique_name: &str) -> Arc<Hierarchy> {
    match schema.hierarchy_by_unique_name(unique_name) {
        Some(hierarchy) => hierarchy.clone(),
        None => panic!("no hierarchy {} in fixture", unique_name),
    }
}

pub fn level(schema: &Schema, unique_name: &str) -> Arc<Level> {
    match schema.level_by_unique_name(unique_name) {
        Some(level) => level.clone(),
        None => panic!("no level {} in fixture", unique_name),
    }
}

pub fn dimension(schema: &Schema, name: &str) -> Arc<Dimension> {
    match schema.dimension_by_name(name) {
        Some(dimension) => dimension.clone(),
        None => panic!("no dimension {} in fixture", name),
    }
}

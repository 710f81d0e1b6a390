//! Value readers: bind dimensional context and read the current cell.
//!
//! Each reader evaluates its member (or tuple) first, then takes a context
//! guard, rebinds the context and asks the evaluator for the current cell.
//! The guard restores the context on every exit path.

use crate::{Calc, CalcKind, CalcRef, CalcResult, ContextGuard, Evaluator};
use mdx_core::{Hierarchy, Member, Value};
use mdx_types::Type;
use std::sync::Arc;

/// Read the cell at the given members, or null if any member is null.
fn read_cell(
    evaluator: &mut dyn Evaluator,
    members: &[Arc<Member>],
    null_check: bool,
) -> CalcResult<Value> {
    if members.iter().any(|m| m.is_null()) {
        return Ok(Value::Null);
    }
    let mut guard = ContextGuard::new(evaluator);
    guard.set_context_tuple(members);
    if null_check && guard.need_to_return_null_for_unrelated_dimension(members) {
        return Ok(Value::Null);
    }
    guard.evaluate_current()
}

/// A reader depends on a hierarchy unless its coordinates definitely set it.
fn reader_depends_on(children: &[&CalcRef], hierarchy: &Hierarchy) -> bool {
    if children.iter().any(|c| c.depends_on(hierarchy)) {
        return true;
    }
    !children
        .iter()
        .any(|c| c.ty().uses_hierarchy(hierarchy, true))
}

/// Reads the cell value at a member.
#[derive(Debug)]
pub struct MemberValueCalc {
    ty: Type,
    member: CalcRef,
    null_check: bool,
}

impl MemberValueCalc {
    pub fn new(member: CalcRef, null_check: bool) -> Self {
        Self {
            ty: member.ty().value_type(),
            member,
            null_check,
        }
    }
}

impl Calc for MemberValueCalc {
    fn name(&self) -> &str {
        "MemberValue"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::Generic
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        match self.member.evaluate_member(evaluator)? {
            Some(member) => read_cell(evaluator, std::slice::from_ref(&member), self.null_check),
            None => Ok(Value::Null),
        }
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.member]
    }

    fn depends_on(&self, hierarchy: &Hierarchy) -> bool {
        reader_depends_on(&[&self.member], hierarchy)
    }
}

/// Reads the cell value at a tuple.
#[derive(Debug)]
pub struct TupleValueCalc {
    ty: Type,
    tuple: CalcRef,
    null_check: bool,
}

impl TupleValueCalc {
    pub fn new(tuple: CalcRef, null_check: bool) -> Self {
        Self {
            ty: tuple.ty().value_type(),
            tuple,
            null_check,
        }
    }
}

impl Calc for TupleValueCalc {
    fn name(&self) -> &str {
        "TupleValue"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::Generic
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        match self.tuple.evaluate_tuple(evaluator)? {
            Some(tuple) => read_cell(evaluator, &tuple, self.null_check),
            None => Ok(Value::Null),
        }
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.tuple]
    }

    fn depends_on(&self, hierarchy: &Hierarchy) -> bool {
        reader_depends_on(&[&self.tuple], hierarchy)
    }
}

/// Reads the cell value at members computed by separate calculators.
#[derive(Debug)]
pub struct MemberArrayValueCalc {
    ty: Type,
    members: Vec<CalcRef>,
    null_check: bool,
}

impl MemberArrayValueCalc {
    pub fn new(members: Vec<CalcRef>, null_check: bool) -> Self {
        Self {
            ty: Type::scalar(),
            members,
            null_check,
        }
    }
}

impl Calc for MemberArrayValueCalc {
    fn name(&self) -> &str {
        "MemberArrayValue"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::Generic
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let mut members = Vec::with_capacity(self.members.len());
        for calc in &self.members {
            match calc.evaluate_member(evaluator)? {
                Some(member) => members.push(member),
                None => return Ok(Value::Null),
            }
        }
        read_cell(evaluator, &members, self.null_check)
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        self.members.iter().collect()
    }

    fn depends_on(&self, hierarchy: &Hierarchy) -> bool {
        reader_depends_on(&self.child_calcs(), hierarchy)
    }
}

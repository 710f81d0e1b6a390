//! Tuple and set constructors.

use crate::calc::describe;
use crate::{Calc, CalcError, CalcKind, CalcRef, CalcResult, Evaluator, ResultStyle};
use mdx_core::{TupleIter, TupleList, Value};
use mdx_types::Type;

/// Builds a tuple from member calculators. Null if any member is null.
#[derive(Debug)]
pub struct TupleCalc {
    ty: Type,
    members: Vec<CalcRef>,
}

impl TupleCalc {
    pub fn new(members: Vec<CalcRef>) -> Self {
        let ty = Type::Tuple(members.iter().map(|m| m.ty().clone()).collect());
        Self { ty, members }
    }
}

impl Calc for TupleCalc {
    fn name(&self) -> &str {
        "Tuple"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::Tuple
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let mut tuple = Vec::with_capacity(self.members.len());
        for calc in &self.members {
            match calc.evaluate_member(evaluator)? {
                Some(m) if !m.is_null() => tuple.push(m),
                _ => return Ok(Value::Null),
            }
        }
        Ok(Value::Tuple(tuple))
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        self.members.iter().collect()
    }
}

/// Builds a set from member, tuple and set calculators, in order.
///
/// Null members and tuples are skipped; nested sets are flattened. The list
/// is freshly allocated on every evaluation.
#[derive(Debug)]
pub struct SetListCalc {
    ty: Type,
    elements: Vec<CalcRef>,
}

impl SetListCalc {
    pub fn new(ty: Type, elements: Vec<CalcRef>) -> Self {
        Self { ty, elements }
    }
}

impl Calc for SetListCalc {
    fn name(&self) -> &str {
        "SetList"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::List
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let mut list = TupleList::empty(self.ty.arity());
        for calc in &self.elements {
            match calc.evaluate(evaluator)? {
                Value::Null => {}
                Value::Member(m) if !m.is_null() => list.push(vec![m]),
                Value::Member(_) => {}
                Value::Tuple(t) => list.push(t),
                Value::List(nested) => {
                    for tuple in nested.iter() {
                        list.push(tuple);
                    }
                }
                other => return Err(CalcError::unexpected_value("set element", describe(&other))),
            }
        }
        Ok(Value::List(list))
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        self.elements.iter().collect()
    }

    fn result_style(&self) -> ResultStyle {
        ResultStyle::MutableList
    }
}

/// The members of a level as a list sharing the level's storage.
#[derive(Debug)]
pub struct LevelMembersListCalc {
    ty: Type,
    level: CalcRef,
}

impl LevelMembersListCalc {
    pub fn new(ty: Type, level: CalcRef) -> Self {
        Self { ty, level }
    }
}

impl Calc for LevelMembersListCalc {
    fn name(&self) -> &str {
        "LevelMembersList"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::List
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        Ok(match self.level.evaluate_level(evaluator)? {
            Some(level) => Value::List(TupleList::shared_members(level.members.clone())),
            None => Value::List(TupleList::empty(1)),
        })
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.level]
    }

    fn result_style(&self) -> ResultStyle {
        ResultStyle::List
    }
}

/// The members of a level as a lazy iterator.
#[derive(Debug)]
pub struct LevelMembersIterCalc {
    ty: Type,
    level: CalcRef,
}

impl LevelMembersIterCalc {
    pub fn new(ty: Type, level: CalcRef) -> Self {
        Self { ty, level }
    }
}

impl Calc for LevelMembersIterCalc {
    fn name(&self) -> &str {
        "LevelMembersIter"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::Iter
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let tuples = self.evaluate_iterable(evaluator)?.collect();
        Ok(Value::List(TupleList::from_tuples(1, tuples)))
    }

    fn evaluate_iterable(&self, evaluator: &mut dyn Evaluator) -> CalcResult<TupleIter> {
        Ok(match self.level.evaluate_level(evaluator)? {
            Some(level) => TupleList::shared_members(level.members.clone()).into_tuple_iter(),
            None => Box::new(std::iter::empty()),
        })
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.level]
    }

    fn result_style(&self) -> ResultStyle {
        ResultStyle::Iterable
    }
}

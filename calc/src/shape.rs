//! Shape adapters: member to tuple, iterator to list, shared list to copy.

use crate::{Calc, CalcKind, CalcRef, CalcResult, Evaluator, ResultStyle};
use mdx_core::{TupleList, Value};
use mdx_types::Type;

/// Wraps a member as a one-member tuple.
#[derive(Debug)]
pub struct MemberToTupleCalc {
    ty: Type,
    child: CalcRef,
}

impl MemberToTupleCalc {
    pub fn new(child: CalcRef) -> Self {
        let ty = Type::Tuple(vec![child.ty().clone()]);
        Self { ty, child }
    }
}

impl Calc for MemberToTupleCalc {
    fn name(&self) -> &str {
        "MemberToTuple"
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        CalcKind::Tuple
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        Ok(match self.child.evaluate_member(evaluator)? {
            Some(m) if !m.is_null() => Value::Tuple(vec![m]),
            _ => Value::Null,
        })
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.child]
    }
}

/// Materializes a lazy set into a list.
///
/// The source iterator is drained once per evaluation and element order is
/// preserved. The list is freshly allocated, so callers may mutate it.
#[derive(Debug)]
pub struct IterableListCalc {
    child: CalcRef,
}

impl IterableListCalc {
    pub fn new(child: CalcRef) -> Self {
        Self { child }
    }
}

impl Calc for IterableListCalc {
    fn name(&self) -> &str {
        "IterableList"
    }

    fn ty(&self) -> &Type {
        self.child.ty()
    }

    fn kind(&self) -> CalcKind {
        CalcKind::List
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let arity = self.child.ty().arity();
        let tuples = self.child.evaluate_iterable(evaluator)?.collect();
        Ok(Value::List(TupleList::from_tuples(arity, tuples)))
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.child]
    }

    fn result_style(&self) -> ResultStyle {
        ResultStyle::MutableList
    }
}

/// Copies a list whose storage is shared with another value.
///
/// Inserted when a caller asked for a mutable list but the compiled
/// calculator returns an immutable one.
#[derive(Debug)]
pub struct CopyListCalc {
    child: CalcRef,
}

impl CopyListCalc {
    pub fn new(child: CalcRef) -> Self {
        Self { child }
    }
}

impl Calc for CopyListCalc {
    fn name(&self) -> &str {
        "CopyList"
    }

    fn ty(&self) -> &Type {
        self.child.ty()
    }

    fn kind(&self) -> CalcKind {
        CalcKind::List
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let list = self.child.evaluate_list(evaluator)?;
        if list.is_shared() {
            tracing::trace!(len = list.len(), "copying shared list");
            Ok(Value::List(list.deep_copy()))
        } else {
            Ok(Value::List(list))
        }
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.child]
    }

    fn result_style(&self) -> ResultStyle {
        ResultStyle::MutableList
    }
}

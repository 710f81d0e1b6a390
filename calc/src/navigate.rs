//! Runtime navigation between dimensional objects.

use crate::{Calc, CalcError, CalcKind, CalcRef, CalcResult, Evaluator};
use mdx_core::{Hierarchy, Value};
use mdx_schema::Schema;
use mdx_types::Type;
use std::fmt;
use std::sync::Arc;

/// One navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Hierarchy to the member the context binds for it.
    CurrentMember,
    /// Hierarchy to its default member.
    DefaultMember,
    /// Dimension to its default hierarchy.
    DefaultHierarchy,
    /// Member or level to its hierarchy.
    Hierarchy,
    /// Hierarchy, level or member to its dimension.
    Dimension,
    /// Member to its level.
    Level,
}

impl Navigation {
    fn kind(self) -> CalcKind {
        match self {
            Navigation::CurrentMember | Navigation::DefaultMember => CalcKind::Member,
            Navigation::DefaultHierarchy | Navigation::Hierarchy => CalcKind::Hierarchy,
            Navigation::Dimension => CalcKind::Dimension,
            Navigation::Level => CalcKind::Level,
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Navigation::CurrentMember => "CurrentMember",
            Navigation::DefaultMember => "DefaultMember",
            Navigation::DefaultHierarchy => "DefaultHierarchy",
            Navigation::Hierarchy => "Hierarchy",
            Navigation::Dimension => "Dimension",
            Navigation::Level => "Level",
        };
        write!(f, "{}", s)
    }
}

/// Applies a navigation step to the value of its child.
///
/// Used whenever the compiler cannot resolve the step statically. A null
/// input navigates to null.
pub struct NavigationCalc {
    ty: Type,
    step: Navigation,
    child: CalcRef,
    schema: Arc<Schema>,
}

impl NavigationCalc {
    pub fn new(ty: Type, step: Navigation, child: CalcRef, schema: Arc<Schema>) -> Self {
        Self {
            ty,
            step,
            child,
            schema,
        }
    }

    pub fn step(&self) -> Navigation {
        self.step
    }

    fn navigate(&self, input: Value, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let schema = &self.schema;
        let result = match (self.step, input) {
            (_, Value::Null) => Value::Null,

            (Navigation::CurrentMember, Value::Hierarchy(h)) => {
                match evaluator.context_member(h.id).or_else(|| h.default_member.clone()) {
                    Some(m) => Value::Member(m),
                    None => return Err(CalcError::NoCurrentMember(h.unique_name.clone())),
                }
            }
            (Navigation::DefaultMember, Value::Hierarchy(h)) => match &h.default_member {
                Some(m) => Value::Member(m.clone()),
                None => return Err(CalcError::NoDefaultMember(h.unique_name.clone())),
            },
            (Navigation::DefaultHierarchy, Value::Dimension(d)) => match d.default_hierarchy() {
                Some(h) => Value::Hierarchy(h.clone()),
                None => return Err(CalcError::NoDefaultHierarchy(d.unique_name.clone())),
            },

            (Navigation::Hierarchy, Value::Member(m)) => lookup(schema.hierarchy(m.hierarchy))
                .map(Value::Hierarchy)?,
            (Navigation::Hierarchy, Value::Level(l)) => lookup(schema.hierarchy(l.hierarchy))
                .map(Value::Hierarchy)?,
            (Navigation::Hierarchy, v @ Value::Hierarchy(_)) => v,

            (Navigation::Dimension, Value::Member(m)) => lookup(schema.dimension(m.dimension))
                .map(Value::Dimension)?,
            (Navigation::Dimension, Value::Level(l)) => lookup(schema.dimension(l.dimension))
                .map(Value::Dimension)?,
            (Navigation::Dimension, Value::Hierarchy(h)) => lookup(schema.dimension(h.dimension))
                .map(Value::Dimension)?,
            (Navigation::Dimension, v @ Value::Dimension(_)) => v,

            (Navigation::Level, Value::Member(m)) => {
                lookup(schema.level(m.level)).map(Value::Level)?
            }

            (step, other) => {
                return Err(CalcError::evaluation(format!(
                    "cannot apply .{} to {}",
                    step,
                    other.type_name()
                )))
            }
        };
        Ok(result)
    }
}

fn lookup<T>(found: Option<&Arc<T>>) -> CalcResult<Arc<T>> {
    found
        .cloned()
        .ok_or_else(|| CalcError::evaluation("object not found in schema"))
}

impl fmt::Debug for NavigationCalc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationCalc")
            .field("step", &self.step)
            .field("ty", &self.ty)
            .field("child", &self.child)
            .finish()
    }
}

impl Calc for NavigationCalc {
    fn name(&self) -> &str {
        match self.step {
            Navigation::CurrentMember => "CurrentMember",
            Navigation::DefaultMember => "DefaultMember",
            Navigation::DefaultHierarchy => "DefaultHierarchy",
            Navigation::Hierarchy => "Hierarchy",
            Navigation::Dimension => "Dimension",
            Navigation::Level => "Level",
        }
    }

    fn ty(&self) -> &Type {
        &self.ty
    }

    fn kind(&self) -> CalcKind {
        self.step.kind()
    }

    fn evaluate(&self, evaluator: &mut dyn Evaluator) -> CalcResult<Value> {
        let input = self.child.evaluate(evaluator)?;
        self.navigate(input, evaluator)
    }

    fn child_calcs(&self) -> Vec<&CalcRef> {
        vec![&self.child]
    }

    /// The current member changes with the context of every hierarchy the
    /// input may denote.
    fn depends_on(&self, hierarchy: &Hierarchy) -> bool {
        if self.child.depends_on(hierarchy) {
            return true;
        }
        self.step == Navigation::CurrentMember && self.child.ty().uses_hierarchy(hierarchy, false)
    }
}

//! Runtime values.
//!
//! Values are what calculators produce. Scalars carry cell data; the
//! dimensional variants carry shared references to schema objects; sets are
//! carried as a `TupleList`.

use crate::{Dimension, Hierarchy, Level, Member};
use std::fmt;
use std::sync::Arc;

/// An ordered combination of members, at most one per hierarchy.
pub type Tuple = Vec<Arc<Member>>;

/// A lazily produced sequence of tuples.
pub type TupleIter = Box<dyn Iterator<Item = Tuple> + Send>;

/// A materialized set of tuples.
///
/// A list of arity 1 built from a level keeps the level's member vector
/// itself, so the backing storage may be shared with the schema or with other
/// values. Use [`TupleList::is_shared`] before handing a list to a caller that
/// wants to mutate it, or just call [`TupleList::push`], which copies on write.
#[derive(Debug, Clone)]
pub enum TupleList {
    /// Arity-1 list backed by a member vector.
    Members(Arc<Vec<Arc<Member>>>),
    /// List of tuples of a fixed arity.
    Tuples { arity: usize, tuples: Arc<Vec<Tuple>> },
}

impl TupleList {
    /// Create an empty list of the given arity.
    pub fn empty(arity: usize) -> Self {
        if arity == 1 {
            TupleList::Members(Arc::new(Vec::new()))
        } else {
            TupleList::Tuples {
                arity,
                tuples: Arc::new(Vec::new()),
            }
        }
    }

    /// Create a list that owns the given members.
    pub fn from_members(members: Vec<Arc<Member>>) -> Self {
        TupleList::Members(Arc::new(members))
    }

    /// Create a list that shares an existing member vector.
    pub fn shared_members(members: Arc<Vec<Arc<Member>>>) -> Self {
        TupleList::Members(members)
    }

    /// Create a list of tuples. Arity-1 tuples collapse to a member list.
    pub fn from_tuples(arity: usize, tuples: Vec<Tuple>) -> Self {
        if arity == 1 {
            let members = tuples
                .into_iter()
                .filter_map(|mut t| t.pop())
                .collect();
            TupleList::Members(Arc::new(members))
        } else {
            TupleList::Tuples {
                arity,
                tuples: Arc::new(tuples),
            }
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            TupleList::Members(_) => 1,
            TupleList::Tuples { arity, .. } => *arity,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TupleList::Members(members) => members.len(),
            TupleList::Tuples { tuples, .. } => tuples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the tuple at a position.
    pub fn get(&self, index: usize) -> Option<Tuple> {
        match self {
            TupleList::Members(members) => members.get(index).map(|m| vec![m.clone()]),
            TupleList::Tuples { tuples, .. } => tuples.get(index).cloned(),
        }
    }

    /// Iterate over the tuples in order.
    pub fn iter(&self) -> impl Iterator<Item = Tuple> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Returns true if another value holds the same backing storage.
    pub fn is_shared(&self) -> bool {
        match self {
            TupleList::Members(members) => Arc::strong_count(members) > 1,
            TupleList::Tuples { tuples, .. } => Arc::strong_count(tuples) > 1,
        }
    }

    /// Copy the list into fresh backing storage.
    pub fn deep_copy(&self) -> Self {
        match self {
            TupleList::Members(members) => TupleList::Members(Arc::new(members.as_ref().clone())),
            TupleList::Tuples { arity, tuples } => TupleList::Tuples {
                arity: *arity,
                tuples: Arc::new(tuples.as_ref().clone()),
            },
        }
    }

    /// Append a tuple, copying the backing storage first if it is shared.
    ///
    /// The tuple's length must equal the list's arity.
    pub fn push(&mut self, mut tuple: Tuple) {
        debug_assert_eq!(tuple.len(), self.arity());
        match self {
            TupleList::Members(members) => {
                if let Some(member) = tuple.pop() {
                    Arc::make_mut(members).push(member);
                }
            }
            TupleList::Tuples { tuples, .. } => Arc::make_mut(tuples).push(tuple),
        }
    }

    /// Convert into a lazy iterator that owns the backing storage.
    pub fn into_tuple_iter(self) -> TupleIter {
        match self {
            TupleList::Members(members) => {
                Box::new((0..members.len()).map(move |i| vec![members[i].clone()]))
            }
            TupleList::Tuples { tuples, .. } => {
                Box::new((0..tuples.len()).map(move |i| tuples[i].clone()))
            }
        }
    }
}

impl PartialEq for TupleList {
    fn eq(&self, other: &Self) -> bool {
        self.arity() == other.arity() && self.len() == other.len() && self.iter().eq(other.iter())
    }
}

/// A runtime value produced by a calculator.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null/empty value.
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    Member(Arc<Member>),
    Level(Arc<Level>),
    Hierarchy(Arc<Hierarchy>),
    Dimension(Arc<Dimension>),
    Tuple(Tuple),
    List(TupleList),
}

impl Value {
    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for cell-level values (including null).
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Bool(_)
                | Value::Int(_)
                | Value::Double(_)
                | Value::String(_)
                | Value::DateTime(_)
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Get either numeric variant widened to f64.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            Value::DateTime(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_member(&self) -> Option<&Arc<Member>> {
        match self {
            Value::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_level(&self) -> Option<&Arc<Level>> {
        match self {
            Value::Level(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_hierarchy(&self) -> Option<&Arc<Hierarchy>> {
        match self {
            Value::Hierarchy(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_dimension(&self) -> Option<&Arc<Dimension>> {
        match self {
            Value::Dimension(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&Tuple> {
        match self {
            Value::Tuple(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&TupleList> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Int(_) => "Integer",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::DateTime(_) => "DateTime",
            Value::Member(_) => "Member",
            Value::Level(_) => "Level",
            Value::Hierarchy(_) => "Hierarchy",
            Value::Dimension(_) => "Dimension",
            Value::Tuple(_) => "Tuple",
            Value::List(_) => "Set",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::DateTime(t) => write!(f, "dt:{}", t),
            Value::Member(m) => write!(f, "{}", m),
            Value::Level(l) => write!(f, "{}", l),
            Value::Hierarchy(h) => write!(f, "{}", h),
            Value::Dimension(d) => write!(f, "{}", d),
            Value::Tuple(members) => {
                write!(f, "(")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", m)?;
                }
                write!(f, ")")
            }
            Value::List(list) => {
                write!(f, "{{")?;
                for (i, tuple) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if let [member] = tuple.as_slice() {
                        write!(f, "{}", member)?;
                    } else {
                        write!(f, "{}", Value::Tuple(tuple))?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Arc<Member>> for Value {
    fn from(m: Arc<Member>) -> Self {
        Value::Member(m)
    }
}

impl From<TupleList> for Value {
    fn from(list: TupleList) -> Self {
        Value::List(list)
    }
}

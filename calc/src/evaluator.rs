//! The evaluator contract and the scoped context guard.

use crate::CalcResult;
use mdx_core::{HierarchyId, Member, Value};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Opaque checkpoint of an evaluator's dimensional context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Savepoint(usize);

impl Savepoint {
    pub fn new(depth: usize) -> Self {
        Self(depth)
    }

    pub fn depth(&self) -> usize {
        self.0
    }
}

/// The runtime that calculators evaluate against.
///
/// An evaluator holds the dimensional context: one current member per
/// hierarchy. Calculators that rebind the context must do so through a
/// [`ContextGuard`] so the previous context is restored on every exit path.
pub trait Evaluator {
    /// Checkpoint the current context.
    fn savepoint(&mut self) -> Savepoint;

    /// Return to a checkpoint taken by [`Evaluator::savepoint`].
    fn restore(&mut self, savepoint: Savepoint);

    /// Make a member the current member of its hierarchy.
    fn set_context_member(&mut self, member: &Arc<Member>);

    /// Make every member of a tuple current.
    fn set_context_tuple(&mut self, members: &[Arc<Member>]) {
        for member in members {
            self.set_context_member(member);
        }
    }

    /// The current member of a hierarchy, if the context binds one.
    fn context_member(&self, hierarchy: HierarchyId) -> Option<Arc<Member>>;

    /// Evaluate the cell addressed by the current context.
    fn evaluate_current(&mut self) -> CalcResult<Value>;

    /// Whether value readers should ask
    /// [`Evaluator::need_to_return_null_for_unrelated_dimension`].
    fn might_return_null_for_unrelated_dimension(&self) -> bool {
        false
    }

    /// Whether a cell addressed by these members is null because a member
    /// lies in a dimension unrelated to the current measure's cube.
    fn need_to_return_null_for_unrelated_dimension(&self, _members: &[Arc<Member>]) -> bool {
        false
    }
}

/// Restores the evaluator context when dropped.
///
/// ```ignore
/// let mut guard = ContextGuard::new(evaluator);
/// guard.set_context_member(&member);
/// guard.evaluate_current()
/// // context restored here, also on the error path
/// ```
pub struct ContextGuard<'e> {
    evaluator: &'e mut dyn Evaluator,
    savepoint: Savepoint,
}

impl<'e> ContextGuard<'e> {
    pub fn new(evaluator: &'e mut dyn Evaluator) -> Self {
        let savepoint = evaluator.savepoint();
        Self {
            evaluator,
            savepoint,
        }
    }
}

impl<'e> Deref for ContextGuard<'e> {
    type Target = dyn Evaluator + 'e;

    fn deref(&self) -> &Self::Target {
        &*self.evaluator
    }
}

impl<'e> DerefMut for ContextGuard<'e> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.evaluator
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.evaluator.restore(self.savepoint);
    }
}

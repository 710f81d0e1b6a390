//! An in-memory evaluator over a fixed set of cells.

use mdx_calc::{CalcError, CalcResult, Evaluator, Savepoint};
use mdx_core::{DimensionId, HierarchyId, Member, Value};
use mdx_schema::Schema;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

type Context = HashMap<HierarchyId, Arc<Member>>;

/// Evaluates cells from a table keyed by member coordinates.
///
/// The context starts at every hierarchy's default member. A cell matches
/// when each of its members is current in its hierarchy; among matching
/// cells the one with the most coordinates wins. Unmatched reads are null.
#[derive(Debug, Clone)]
pub struct CellEvaluator {
    context: Context,
    saved: Vec<Context>,
    cells: Vec<(Vec<Arc<Member>>, Value)>,
    unrelated: HashSet<DimensionId>,
    failing: bool,
    reads: usize,
}

impl CellEvaluator {
    pub fn new(schema: &Schema) -> Self {
        let context = schema
            .hierarchies()
            .filter_map(|h| h.default_member.clone().map(|m| (h.id, m)))
            .collect();
        Self {
            context,
            saved: Vec::new(),
            cells: Vec::new(),
            unrelated: HashSet::new(),
            failing: false,
            reads: 0,
        }
    }

    /// Add a cell at the given coordinates.
    pub fn with_cell(mut self, coordinates: &[Arc<Member>], value: impl Into<Value>) -> Self {
        self.cells.push((coordinates.to_vec(), value.into()));
        self
    }

    /// Treat a dimension as unrelated to the cube being read, so value
    /// readers that touch it return null.
    pub fn with_unrelated_dimension(mut self, dimension: DimensionId) -> Self {
        self.unrelated.insert(dimension);
        self
    }

    /// Fail every cell read.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Number of cell reads so far.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Number of open savepoints.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn current(&self, hierarchy: HierarchyId) -> Option<&Arc<Member>> {
        self.context.get(&hierarchy)
    }

    fn matches(&self, coordinates: &[Arc<Member>]) -> bool {
        coordinates
            .iter()
            .all(|m| self.context.get(&m.hierarchy).is_some_and(|c| c.id == m.id))
    }
}

impl Evaluator for CellEvaluator {
    fn savepoint(&mut self) -> Savepoint {
        self.saved.push(self.context.clone());
        Savepoint::new(self.saved.len() - 1)
    }

    fn restore(&mut self, savepoint: Savepoint) {
        self.saved.truncate(savepoint.depth() + 1);
        if let Some(context) = self.saved.pop() {
            self.context = context;
        }
    }

    fn set_context_member(&mut self, member: &Arc<Member>) {
        self.context.insert(member.hierarchy, member.clone());
    }

    fn context_member(&self, hierarchy: HierarchyId) -> Option<Arc<Member>> {
        self.context.get(&hierarchy).cloned()
    }

    fn evaluate_current(&mut self) -> CalcResult<Value> {
        self.reads += 1;
        if self.failing {
            return Err(CalcError::evaluation("cell store unavailable"));
        }
        let value = self
            .cells
            .iter()
            .filter(|(coordinates, _)| self.matches(coordinates))
            .max_by_key(|(coordinates, _)| coordinates.len())
            .map(|(_, value)| value.clone())
            .unwrap_or(Value::Null);
        Ok(value)
    }

    fn might_return_null_for_unrelated_dimension(&self) -> bool {
        !self.unrelated.is_empty()
    }

    fn need_to_return_null_for_unrelated_dimension(&self, members: &[Arc<Member>]) -> bool {
        members.iter().any(|m| self.unrelated.contains(&m.dimension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{member, sales_schema};

    #[test]
    fn test_most_specific_cell_wins() {
        // GIVEN
        let schema = sales_schema();
        let usa = member(&schema, "[Store].[USA]");
        let female = member(&schema, "[Gender].[F]");
        let mut evaluator = CellEvaluator::new(&schema)
            .with_cell(&[usa.clone()], 10i64)
            .with_cell(&[usa.clone(), female.clone()], 4i64);

        // WHEN
        evaluator.set_context_member(&usa);
        let store_total = evaluator.evaluate_current().unwrap();
        evaluator.set_context_member(&female);
        let female_only = evaluator.evaluate_current().unwrap();

        // THEN
        assert_eq!(store_total, Value::Int(10));
        assert_eq!(female_only, Value::Int(4));
        assert_eq!(evaluator.reads(), 2);
    }

    #[test]
    fn test_restore_returns_to_savepoint() {
        let schema = sales_schema();
        let usa = member(&schema, "[Store].[USA]");
        let mut evaluator = CellEvaluator::new(&schema);
        let before = evaluator.context_member(usa.hierarchy);

        let savepoint = evaluator.savepoint();
        evaluator.set_context_member(&usa);
        evaluator.restore(savepoint);

        assert_eq!(evaluator.context_member(usa.hierarchy), before);
        assert_eq!(evaluator.depth(), 0);
    }
}

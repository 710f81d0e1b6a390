//! Plain-text rendering of calculator trees.

use crate::Calc;
use std::fmt::Write;

/// Renders a calculator tree as indented text, one node per line.
///
/// ```text
/// MemberValue(kind=Generic, type=SCALAR, style=VALUE)
///   CurrentMember(kind=Member, type=MemberType<hierarchy=h0>, style=VALUE)
///     Constant(kind=Hierarchy, type=HierarchyType<hierarchy=h0>, style=VALUE, value=[Gender])
/// ```
#[derive(Debug, Default)]
pub struct CalcWriter {
    out: String,
    indent: usize,
}

impl CalcWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one tree.
    pub fn explain(calc: &dyn Calc) -> String {
        let mut writer = Self::new();
        writer.visit(calc);
        writer.finish()
    }

    pub fn visit(&mut self, calc: &dyn Calc) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        // Writing to a String cannot fail.
        let _ = write!(
            self.out,
            "{}(kind={}, type={}, style={}",
            calc.name(),
            calc.kind(),
            calc.ty(),
            calc.result_style()
        );
        if let Some(value) = calc.constant_value() {
            let _ = write!(self.out, ", value={}", value);
        }
        self.out.push_str(")\n");

        self.indent += 1;
        for child in calc.child_calcs() {
            self.visit(&**child);
        }
        self.indent -= 1;
    }

    pub fn finish(self) -> String {
        self.out
    }
}

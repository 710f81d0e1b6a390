//! Scenario runner.

use mdx_calc::CalcRef;
use mdx_compiler::{BaseCompiler, BuiltinValidator, CompileContext, EnhancedCompiler, ExpCompiler};
use std::sync::Once;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::assertion::StepOutcome;
use crate::error::ScenarioResult;
use crate::evaluator::CellEvaluator;
use crate::scenario::{Scenario, Step};

/// Install a test-writer subscriber filtered by `RUST_LOG`, once per process.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Runs a scenario against the compiler.
pub struct Runner<'s> {
    scenario: &'s Scenario,
}

impl<'s> Runner<'s> {
    pub fn new(scenario: &'s Scenario) -> Self {
        Self { scenario }
    }

    /// Run every step and verify its assertion.
    pub fn run(&self) -> ScenarioResult<()> {
        init_tracing();
        let compiler: Box<dyn ExpCompiler> = if self.scenario.is_enhanced() {
            Box::new(EnhancedCompiler::new(BaseCompiler))
        } else {
            Box::new(BaseCompiler)
        };
        let validator = BuiltinValidator;

        for step in self.scenario.steps() {
            debug!(scenario = self.scenario.name(), step = %step.name, exp = %step.exp, "running step");
            let mut evaluator = self.scenario.evaluator();
            let mut cx = CompileContext::new(compiler.as_ref(), &validator, self.scenario.schema().clone())
                .with_options(self.scenario.compiler_options().clone())
                .with_evaluator(&evaluator);
            let result = cx
                .compile_as(&step.exp, &step.target, step.styles)
                .map_err(|e| e.to_string())
                .and_then(|calc| execute(step, calc, &mut evaluator));
            step.assertion.verify(&step.name, &result)?;
        }

        Ok(())
    }
}

fn execute(step: &Step, calc: CalcRef, evaluator: &mut CellEvaluator) -> Result<StepOutcome, String> {
    let before = evaluator.reads();
    let value = calc.evaluate(evaluator);
    // Every calculator must leave the context as it found it, on errors too.
    if evaluator.depth() != 0 {
        return Err(format!(
            "step '{}' left {} savepoints open",
            step.name,
            evaluator.depth()
        ));
    }
    let value = value.map_err(|e| e.to_string())?;
    Ok(StepOutcome {
        calc,
        value,
        reads: evaluator.reads() - before,
    })
}

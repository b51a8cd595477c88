use crate::compiler::ir::Requirement;
use std::ops::BitOr;

/// Workflow features a compiled step or output relies on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureUsage {
    pub inline_javascript: bool,
    pub scatter: bool,
    pub multiple_input: bool,
    pub step_input_expression: bool,
}

impl BitOr for FeatureUsage {
    type Output = Self;

    fn bitor(self, other: Self) -> Self {
        Self {
            inline_javascript: self.inline_javascript || other.inline_javascript,
            scatter: self.scatter || other.scatter,
            multiple_input: self.multiple_input || other.multiple_input,
            step_input_expression: self.step_input_expression || other.step_input_expression,
        }
    }
}

pub fn aggregate_requirements(usage: FeatureUsage) -> Vec<Requirement> {
    [
        (usage.inline_javascript, Requirement::InlineJavascript),
        (usage.scatter, Requirement::ScatterFeature),
        (usage.multiple_input, Requirement::MultipleInputFeature),
        (usage.step_input_expression, Requirement::StepInputExpression),
    ]
    .into_iter()
    .filter_map(|(used, requirement)| used.then_some(requirement))
    .collect()
}

#[cfg(test)]
#[path = "requirements_test.rs"]
mod tests;

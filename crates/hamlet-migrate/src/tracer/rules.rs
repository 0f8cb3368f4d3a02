/*!
# Transformation Rules

Core trait and utilities for defining transformation rules.
*/

use serde::Serialize;

use super::{Rewrite, TransformResult, TransformationContext};
use crate::grammar::TemplateGrammar;
use crate::kind::FileKind;

/// Core trait for transformation rules
///
/// A rule takes the full text of one file and returns the rewritten text.
/// Rules never perform I/O, so a failing rule leaves nothing half written.
pub trait TransformationRule: Send + Sync {
    /// Human-readable name for this rule
    fn name(&self) -> &'static str;

    /// Detailed description of what this rule does
    fn description(&self) -> &'static str;

    /// Priority for rule ordering (higher priority runs first)
    fn priority(&self) -> u32 {
        100
    }

    /// Which kinds of file this rule runs on
    fn applies_to(&self, kind: FileKind) -> bool;

    /// Cheap pre-check; `transform` is skipped when this is false
    fn matches(&self, source: &str, context: &TransformationContext) -> bool;

    /// Apply the transformation to the whole file content
    fn transform(&self, source: &str, context: &TransformationContext) -> TransformResult<Rewrite>;
}

/// Whole-content grammar rewrite for a standalone template file
pub struct TemplateGrammarRule {
    grammar: TemplateGrammar,
}

impl TemplateGrammarRule {
    pub fn new(grammar: TemplateGrammar) -> Self {
        Self { grammar }
    }
}

impl TransformationRule for TemplateGrammarRule {
    fn name(&self) -> &'static str {
        match self.grammar {
            TemplateGrammar::Hamlet => "HamletGrammar",
            TemplateGrammar::Cassius => "CassiusGrammar",
            TemplateGrammar::Julius => "JuliusGrammar",
        }
    }

    fn description(&self) -> &'static str {
        match self.grammar {
            TemplateGrammar::Hamlet => "Rewrites Hamlet interpolations and $forall/$maybe bindings",
            TemplateGrammar::Cassius => "Rewrites Cassius variable and url interpolations",
            TemplateGrammar::Julius => "Rewrites Julius variable, url and embed interpolations",
        }
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind.template_grammar() == Some(self.grammar)
    }

    fn matches(&self, source: &str, _context: &TransformationContext) -> bool {
        let sigils = self.grammar.sigils();
        source.contains(|c| sigils.is_sigil(c))
    }

    fn transform(&self, source: &str, _context: &TransformationContext) -> TransformResult<Rewrite> {
        Ok(self.grammar.migrate(source))
    }
}

/// Rule execution statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct RuleStats {
    pub rule_name: String,
    /// Files the rule matched
    pub applications: u64,
    /// Files the rule actually changed
    pub transformations: u64,
    /// Individual spots rewritten across all files
    pub occurrences: u64,
    pub errors: u64,
}

impl RuleStats {
    pub fn new(rule_name: String) -> Self {
        Self {
            rule_name,
            ..Default::default()
        }
    }

    pub fn record(&mut self, rewrite: &Rewrite) {
        self.applications += 1;
        if rewrite.changed() {
            self.transformations += 1;
            self.occurrences += rewrite.occurrences as u64;
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.applications == 0 {
            0.0
        } else {
            (self.transformations as f64) / (self.applications as f64)
        }
    }
}

/*!
# Quoted Block Migrator

Migrates the template inside each quasi-quoted block with the grammar of
its quoter. The opener itself is left as written.
*/

use crate::kind::FileKind;
use crate::tracer::patterns::{rewrite_quasi_quotes, QuasiQuote};
use crate::tracer::rules::TransformationRule;
use crate::tracer::{Rewrite, TransformResult, TransformationContext};

pub struct QuotedBlockMigrator {
    priority: u32,
}

impl QuotedBlockMigrator {
    pub fn new() -> Self {
        Self { priority: 100 }
    }
}

impl Default for QuotedBlockMigrator {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationRule for QuotedBlockMigrator {
    fn name(&self) -> &'static str {
        "QuotedBlockMigrator"
    }

    fn description(&self) -> &'static str {
        "Migrates hamlet, cassius and julius quasi-quote bodies to the new interpolation syntax"
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::HaskellSource
    }

    fn matches(&self, source: &str, _context: &TransformationContext) -> bool {
        source.contains('|')
    }

    fn transform(&self, source: &str, context: &TransformationContext) -> TransformResult<Rewrite> {
        rewrite_quasi_quotes(source, context, |block| {
            let grammar = block.opener.grammar()?;
            let body = grammar.migrate(block.body);
            tracing::trace!(
                grammar = %grammar,
                rewrites = body.occurrences,
                "migrated quoted block"
            );
            Some(Rewrite {
                text: QuasiQuote::render(block.opener.text(source), &body.text),
                occurrences: body.occurrences,
            })
        })
    }
}

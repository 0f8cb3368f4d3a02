/*!
# Quoter Macro Expander

Code that had to build on both GHC 6 and GHC 7 hid the quoter behind a CPP
macro (`#define HAMLET hamlet` or `#define HAMLET $hamlet`) and wrote
`[HAMLET|...|]`. Hamlet 7 code names the quoter directly.
*/

use crate::kind::FileKind;
use crate::tracer::patterns::{rewrite_quasi_quotes, QuasiQuote};
use crate::tracer::rules::TransformationRule;
use crate::tracer::{Rewrite, TransformResult, TransformationContext};

pub struct QuoterMacroExpander {
    priority: u32,
}

impl QuoterMacroExpander {
    pub fn new() -> Self {
        Self { priority: 300 }
    }
}

impl Default for QuoterMacroExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationRule for QuoterMacroExpander {
    fn name(&self) -> &'static str {
        "QuoterMacroExpander"
    }

    fn description(&self) -> &'static str {
        "Replaces CPP quoter macros such as [HAMLET| with the quoter they stand for"
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::HaskellSource
    }

    fn matches(&self, source: &str, _context: &TransformationContext) -> bool {
        ["HAMLET|", "CASSIUS|", "JULIUS|", "LUCIUS|"]
            .iter()
            .any(|needle| source.contains(needle))
    }

    fn transform(&self, source: &str, context: &TransformationContext) -> TransformResult<Rewrite> {
        rewrite_quasi_quotes(source, context, |block| {
            block.opener.macro_target()?;
            Some(Rewrite {
                text: QuasiQuote::render(&block.opener.normalized(), block.body),
                occurrences: 1,
            })
        })
    }
}

/*!
# Dollar Opener Rewriter

GHC 6 required quasi-quotes to be written `[$hamlet|...|]`; GHC 7 dropped
the dollar. Only the opener changes, the body is left to
`QuotedBlockMigrator`.
*/

use crate::kind::FileKind;
use crate::tracer::patterns::{rewrite_quasi_quotes, QuasiQuote};
use crate::tracer::rules::TransformationRule;
use crate::tracer::{Rewrite, TransformResult, TransformationContext};

pub struct DollarOpenerRewriter {
    priority: u32,
}

impl DollarOpenerRewriter {
    pub fn new() -> Self {
        Self { priority: 200 }
    }
}

impl Default for DollarOpenerRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationRule for DollarOpenerRewriter {
    fn name(&self) -> &'static str {
        "DollarOpenerRewriter"
    }

    fn description(&self) -> &'static str {
        "Rewrites GHC 6 style [$quoter| openers to [quoter|"
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::HaskellSource
    }

    fn matches(&self, source: &str, _context: &TransformationContext) -> bool {
        source.contains("[$")
    }

    fn transform(&self, source: &str, context: &TransformationContext) -> TransformResult<Rewrite> {
        rewrite_quasi_quotes(source, context, |block| {
            if !block.opener.dollar {
                return None;
            }
            let opener = format!("[{}{}|", block.opener.qualifier, block.opener.quoter);
            Some(Rewrite {
                text: QuasiQuote::render(&opener, block.body),
                occurrences: 1,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rewrite(source: &str) -> Rewrite {
        DollarOpenerRewriter::new()
            .transform(source, &TransformationContext::new())
            .unwrap()
    }

    #[test]
    fn test_single_opener_keeps_position() {
        let source = "getRootR = defaultLayout $ addHamlet [$hamlet|<h1>$title$|]\n-- done\n";
        let result = rewrite(source);
        assert_eq!(
            result.text,
            "getRootR = defaultLayout $ addHamlet [hamlet|<h1>$title$|]\n-- done\n"
        );
        assert_eq!(result.occurrences, 1);
        assert_eq!(result.text.find("[hamlet|"), source.find("[$hamlet|"));
    }

    #[test]
    fn test_any_quoter_loses_its_dollar() {
        let source = "share [mkPersist] [$persist|\nPerson\n    name String\n|]\n";
        assert_eq!(rewrite(source).text, "share [mkPersist] [persist|\nPerson\n    name String\n|]\n");
    }

    #[test]
    fn test_qualified_quoter() {
        assert_eq!(rewrite("[$H.hamlet|x|]").text, "[H.hamlet|x|]");
    }

    #[test]
    fn test_new_openers_untouched() {
        let source = "[hamlet|<p>|] [CASSIUS|a|]";
        let result = rewrite(source);
        assert_eq!(result.text, source);
        assert!(!result.changed());
    }
}

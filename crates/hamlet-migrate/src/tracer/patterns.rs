/*!
# Quasi-Quote Pattern Matching

Scanning utilities for quasi-quoted blocks in Haskell source, shared by the
marker rules. A block is `[quoter|` followed by a body and the first `|]`.
*/

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Rewrite, TransformResult, TransformationContext};
use crate::error::MigrateError;
use crate::grammar::TemplateGrammar;

/// `[`, optional legacy `$`, optional module qualifier, quoter name, `|`
static OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\$)?((?:[A-Z][A-Za-z0-9_']*\.)*)([A-Za-z_][A-Za-z0-9_']*)\|")
        .expect("opener pattern is valid")
});

pub const TERMINATOR: &str = "|]";

/// Quoters produced by the template libraries
pub const TEMPLATE_QUOTERS: &[&str] = &["hamlet", "xhamlet", "shamlet", "ihamlet", "cassius", "julius", "lucius"];

/// A quasi-quote opener such as `[$hamlet|` or `[Text.Hamlet.hamlet|`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opener<'a> {
    /// Byte offset of `[`
    pub start: usize,
    /// Byte offset just past `|`
    pub end: usize,
    pub dollar: bool,
    pub qualifier: &'a str,
    pub quoter: &'a str,
}

impl<'a> Opener<'a> {
    /// The opener exactly as written in the source
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }

    /// Lowercase quoter named by a CPP macro like `HAMLET`
    pub fn macro_target(&self) -> Option<&'static str> {
        if self.quoter.chars().any(|c| c.is_ascii_lowercase()) {
            return None;
        }
        TEMPLATE_QUOTERS
            .iter()
            .copied()
            .find(|quoter| quoter.eq_ignore_ascii_case(self.quoter))
    }

    /// Quoter with any CPP macro spelling resolved
    pub fn resolved_quoter(&self) -> &'a str {
        self.macro_target().unwrap_or(self.quoter)
    }

    pub fn grammar(&self) -> Option<TemplateGrammar> {
        TemplateGrammar::from_quoter(self.resolved_quoter())
    }

    /// Whether this is certainly a quasi-quote rather than, say, a list
    /// comprehension written without spaces.
    pub fn is_recognized(&self) -> bool {
        self.dollar || self.macro_target().is_some() || TEMPLATE_QUOTERS.contains(&self.quoter)
    }

    /// The Hamlet 7 spelling of this opener
    pub fn normalized(&self) -> String {
        format!("[{}{}|", self.qualifier, self.resolved_quoter())
    }
}

/// A complete quasi-quoted block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuasiQuote<'a> {
    pub opener: Opener<'a>,
    pub body: &'a str,
    /// Byte offset just past `|]`
    pub end: usize,
}

impl<'a> QuasiQuote<'a> {
    pub fn start(&self) -> usize {
        self.opener.start
    }

    /// Reassemble the block around a new opener and body
    pub fn render(opener: &str, body: &str) -> String {
        let mut out = String::with_capacity(opener.len() + body.len() + TERMINATOR.len());
        out.push_str(opener);
        out.push_str(body);
        out.push_str(TERMINATOR);
        out
    }
}

/// Next quasi-quote opener at or after `from`
pub fn next_opener(source: &str, from: usize) -> Option<Opener<'_>> {
    let caps = OPENER.captures_at(source, from)?;
    let whole = caps.get(0)?;

    Some(Opener {
        start: whole.start(),
        end: whole.end(),
        dollar: caps.get(1).is_some(),
        qualifier: caps.get(2).map_or("", |m| m.as_str()),
        quoter: caps.get(3).map_or("", |m| m.as_str()),
    })
}

/// Byte offset of the first `|]` at or after `from`
pub fn find_terminator(source: &str, from: usize) -> Option<usize> {
    source[from..].find(TERMINATOR).map(|i| from + i)
}

/// 1-based line number of a byte offset
pub fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

/// Walk every recognized quasi-quoted block in `source`.
///
/// `rewrite` may return a replacement for a whole block; everything else,
/// including the text between blocks, is copied byte for byte. Bodies are
/// skipped over, so an opener-like token inside a body is never visited.
pub fn rewrite_quasi_quotes<F>(
    source: &str,
    context: &TransformationContext,
    mut rewrite: F,
) -> TransformResult<Rewrite>
where
    F: FnMut(&QuasiQuote<'_>) -> Option<Rewrite>,
{
    let mut out = String::with_capacity(source.len());
    let mut occurrences = 0;
    let mut copied = 0;
    let mut pos = 0;

    while let Some(opener) = next_opener(source, pos) {
        if !opener.is_recognized() {
            pos = opener.end;
            continue;
        }

        let body_end = find_terminator(source, opener.end).ok_or_else(|| MigrateError::UnterminatedBlock {
            file: context.file_label(),
            line: line_of(source, opener.start),
            opener: opener.text(source).to_string(),
        })?;

        let block = QuasiQuote {
            body: &source[opener.end..body_end],
            end: body_end + TERMINATOR.len(),
            opener,
        };

        if let Some(replacement) = rewrite(&block).filter(Rewrite::changed) {
            out.push_str(&source[copied..block.start()]);
            out.push_str(&replacement.text);
            occurrences += replacement.occurrences;
            copied = block.end;
        }
        pos = block.end;
    }

    out.push_str(&source[copied..]);
    Ok(Rewrite { text: out, occurrences })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opener_forms() {
        let src = "x = [$hamlet|<p>|]";
        let opener = next_opener(src, 0).unwrap();
        assert!(opener.dollar);
        assert_eq!(opener.quoter, "hamlet");
        assert_eq!(opener.text(src), "[$hamlet|");
        assert_eq!(opener.normalized(), "[hamlet|");

        let src = "[$Text.Hamlet.xhamlet|";
        let opener = next_opener(src, 0).unwrap();
        assert_eq!(opener.qualifier, "Text.Hamlet.");
        assert_eq!(opener.quoter, "xhamlet");
        assert_eq!(opener.normalized(), "[Text.Hamlet.xhamlet|");
    }

    #[test]
    fn test_macro_openers() {
        let opener = next_opener("[CASSIUS|", 0).unwrap();
        assert_eq!(opener.macro_target(), Some("cassius"));
        assert_eq!(opener.grammar(), Some(TemplateGrammar::Cassius));
        assert_eq!(opener.normalized(), "[cassius|");

        let opener = next_opener("[PERSIST|", 0).unwrap();
        assert_eq!(opener.macro_target(), None);
        assert!(!opener.is_recognized());
    }

    #[test]
    fn test_list_comprehension_is_not_recognized() {
        let opener = next_opener("evens = [x|x<-xs, even x]", 0).unwrap();
        assert!(!opener.is_recognized());
    }

    #[test]
    fn test_line_numbers() {
        let src = "a\nb\nc[$hamlet|";
        assert_eq!(line_of(src, src.find('[').unwrap()), 3);
        assert_eq!(line_of(src, 0), 1);
    }

    #[test]
    fn test_unterminated_block_is_an_error() {
        let src = "main = do\n  print 1\n  [$hamlet|<p>oops\n";
        let context = TransformationContext::new();
        let err = rewrite_quasi_quotes(src, &context, |_| None).unwrap_err();
        match err {
            MigrateError::UnterminatedBlock { line, opener, .. } => {
                assert_eq!(line, 3);
                assert_eq!(opener, "[$hamlet|");
            }
            other => panic!("Expected UnterminatedBlock, got {other:?}"),
        }
    }

    #[test]
    fn test_walk_skips_bodies() {
        let src = "[hamlet|[$hamlet|]|] [julius|x|]";
        let context = TransformationContext::new();
        let mut seen = Vec::new();
        rewrite_quasi_quotes(src, &context, |block| {
            seen.push((block.opener.quoter.to_string(), block.body.to_string()));
            None
        })
        .unwrap();

        assert_eq!(
            seen,
            vec![
                ("hamlet".to_string(), "[$hamlet".to_string()),
                ("julius".to_string(), "x".to_string()),
            ]
        );
    }
}

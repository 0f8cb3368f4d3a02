/*!
# Template Grammars

Whole-content rewrites from the Hamlet 6 family of template syntaxes to
their Hamlet 7 equivalents. The same rewrites run on standalone template
files and on the bodies of quasi-quoted blocks inside Haskell source.

Every rewrite is idempotent: new-style syntax is never touched, so running
the migrator over already migrated templates is a no-op.
*/

pub mod hamlet;
pub mod interpolation;

use std::fmt;

use serde::Serialize;

use crate::tracer::Rewrite;

pub use hamlet::ControlLine;
pub use interpolation::{rewrite_interpolations, SigilSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateGrammar {
    Hamlet,
    Cassius,
    Julius,
}

impl TemplateGrammar {
    /// Grammar used by a quasi-quoter, if it is a template quoter
    pub fn from_quoter(quoter: &str) -> Option<Self> {
        match quoter {
            "hamlet" | "xhamlet" | "shamlet" | "ihamlet" => Some(Self::Hamlet),
            "cassius" => Some(Self::Cassius),
            "julius" => Some(Self::Julius),
            _ => None,
        }
    }

    pub fn sigils(self) -> &'static SigilSet {
        match self {
            Self::Hamlet => &SigilSet::HAMLET,
            Self::Cassius => &SigilSet::CASSIUS,
            Self::Julius => &SigilSet::JULIUS,
        }
    }

    /// Migrate a complete template body
    pub fn migrate(self, text: &str) -> Rewrite {
        match self {
            Self::Hamlet => migrate_hamlet(text),
            Self::Cassius | Self::Julius => {
                let (text, occurrences) = rewrite_interpolations(text, self.sigils());
                Rewrite { text, occurrences }
            }
        }
    }
}

impl fmt::Display for TemplateGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hamlet => "hamlet",
            Self::Cassius => "cassius",
            Self::Julius => "julius",
        };
        f.write_str(name)
    }
}

/// Hamlet is line oriented: control lines get their bindings reordered,
/// every other line gets its interpolations rewritten.
fn migrate_hamlet(text: &str) -> Rewrite {
    let mut out = String::with_capacity(text.len() + 32);
    let mut occurrences = 0;

    for line in text.split_inclusive('\n') {
        let (content, newline) = match line.strip_suffix('\n') {
            Some(content) => (content, "\n"),
            None => (line, ""),
        };

        if let Some(control) = ControlLine::parse(content) {
            match control.migrate() {
                Some(migrated) => {
                    out.push_str(&migrated);
                    occurrences += 1;
                }
                None => out.push_str(content),
            }
        } else {
            let (migrated, count) = rewrite_interpolations(content, &SigilSet::HAMLET);
            out.push_str(&migrated);
            occurrences += count;
        }
        out.push_str(newline);
    }

    Rewrite { text: out, occurrences }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_hamlet_document() {
        let old = "\
!!!
<html>
    <head>
        <title>$pageTitle$
        ^pageHead^
    <body>
        $maybe mmsg msg
            <p.message>$msg$
        $forall posts post
            <a href=@(PostR (postSlug post))@>$postTitle.post$
";
        let new = "\
!!!
<html>
    <head>
        <title>#{pageTitle}
        ^{pageHead}
    <body>
        $maybe msg <- mmsg
            <p.message>#{msg}
        $forall post <- posts
            <a href=@{(PostR (postSlug post))}>#{postTitle.post}
";
        let rewrite = TemplateGrammar::Hamlet.migrate(old);
        assert_eq!(rewrite.text, new);
        assert_eq!(rewrite.occurrences, 7);
    }

    #[test]
    fn test_hamlet_control_lines_are_not_interpolated() {
        let text = "$if $weird$\n";
        assert_eq!(TemplateGrammar::Hamlet.migrate(text).text, text);
    }

    #[test]
    fn test_hamlet_without_trailing_newline() {
        assert_eq!(TemplateGrammar::Hamlet.migrate("<b>$x$").text, "<b>#{x}");
    }

    #[test]
    fn test_julius_document() {
        let old = "$(function(){ $(\"#%formId%\").load(\"@?SearchR@\"); });\n";
        let new = "$(function(){ $(\"##{formId}\").load(\"@?{SearchR}\"); });\n";
        assert_eq!(TemplateGrammar::Julius.migrate(old).text, new);
    }

    #[test]
    fn test_quoter_lookup() {
        assert_eq!(TemplateGrammar::from_quoter("xhamlet"), Some(TemplateGrammar::Hamlet));
        assert_eq!(TemplateGrammar::from_quoter("cassius"), Some(TemplateGrammar::Cassius));
        assert_eq!(TemplateGrammar::from_quoter("lucius"), None);
        assert_eq!(TemplateGrammar::from_quoter("persist"), None);
    }

    proptest! {
        #[test]
        fn prop_hamlet_is_idempotent(text in "[a-z$@^?(). \n]{0,64}") {
            let once = TemplateGrammar::Hamlet.migrate(&text).text;
            let twice = TemplateGrammar::Hamlet.migrate(&once);
            prop_assert_eq!(&twice.text, &once);
            prop_assert_eq!(twice.occurrences, 0);
        }

        #[test]
        fn prop_julius_is_idempotent(text in "[a-z%@^?(). \n]{0,64}") {
            let once = TemplateGrammar::Julius.migrate(&text).text;
            prop_assert_eq!(TemplateGrammar::Julius.migrate(&once).text, once);
        }

        #[test]
        fn prop_text_without_sigils_is_identity(text in "[a-zA-Z0-9 <>=\"/.\n]{0,64}") {
            prop_assert_eq!(TemplateGrammar::Hamlet.migrate(&text).text, text.clone());
            prop_assert_eq!(TemplateGrammar::Cassius.migrate(&text).text, text);
        }
    }
}

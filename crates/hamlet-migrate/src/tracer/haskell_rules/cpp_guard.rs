/*!
# CPP Guard Resolver

Scaffolded sites that built with both GHC 6 and GHC 7 chose the opener at
preprocessing time:

```text
#if GHC7
    [hamlet|
#else
    [$hamlet|
#endif
<h1>$title$
|]
```

Hamlet 7 only supports GHC 7, so the guard is resolved: the GHC 7 branch is
kept and the directives and the other branch are dropped. Guards on any
other condition pass through untouched.
*/

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MigrateError;
use crate::kind::FileKind;
use crate::tracer::rules::TransformationRule;
use crate::tracer::{Rewrite, TransformResult, TransformationContext};

static IF_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*#[ \t]*(if|ifdef|ifndef)\b[ \t]*(.*?)\s*$").expect("if pattern is valid")
});
static ELIF_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*#[ \t]*elif\b").expect("elif pattern is valid"));
static ELSE_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*#[ \t]*else\b").expect("else pattern is valid"));
static ENDIF_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*#[ \t]*endif\b").expect("endif pattern is valid"));

/// Which branch of a guard survives the migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeptBranch {
    Then,
    Else,
}

/// Decide whether an `#if`-family directive tests for GHC 7
pub fn classify_guard(directive: &str, condition: &str) -> Option<KeptBranch> {
    let condition: String = condition.chars().filter(|c| !c.is_whitespace()).collect();

    match directive {
        "ifdef" if condition == "GHC7" => Some(KeptBranch::Then),
        "ifndef" if condition == "GHC7" => Some(KeptBranch::Else),
        "if" => match condition.as_str() {
            "GHC7" | "defined(GHC7)" | "definedGHC7" | "__GLASGOW_HASKELL__>=700" => Some(KeptBranch::Then),
            "!GHC7" | "!defined(GHC7)" | "!definedGHC7" | "__GLASGOW_HASKELL__<700" => Some(KeptBranch::Else),
            _ => None,
        },
        _ => None,
    }
}

/// Shape of the directive group following a recognized `#if`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupShape {
    /// Indexes are relative to the first line after the `#if`
    Complete { else_at: Option<usize>, endif_at: usize },
    /// `#elif` chains are left for a human
    HasElif,
    Unterminated,
}

fn group_shape(lines: &[&str]) -> GroupShape {
    let mut depth = 0usize;
    let mut else_at = None;

    for (i, line) in lines.iter().enumerate() {
        if IF_DIRECTIVE.is_match(line) {
            depth += 1;
        } else if ENDIF_DIRECTIVE.is_match(line) {
            if depth == 0 {
                return GroupShape::Complete { else_at, endif_at: i };
            }
            depth -= 1;
        } else if depth == 0 && ELIF_DIRECTIVE.is_match(line) {
            return GroupShape::HasElif;
        } else if depth == 0 && else_at.is_none() && ELSE_DIRECTIVE.is_match(line) {
            else_at = Some(i);
        }
    }

    GroupShape::Unterminated
}

pub struct CppGuardResolver {
    priority: u32,
}

impl CppGuardResolver {
    pub fn new() -> Self {
        Self { priority: 400 }
    }

    /// Copy `lines` to `out`, resolving every GHC 7 guard. `first_line` is
    /// the 1-based line number of `lines[0]` in the file.
    fn resolve(
        &self,
        lines: &[&str],
        first_line: usize,
        context: &TransformationContext,
        out: &mut String,
    ) -> TransformResult<usize> {
        let mut resolved = 0;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let kept = IF_DIRECTIVE
                .captures(line)
                .and_then(|caps| classify_guard(&caps[1], &caps[2]));

            if let Some(kept) = kept {
                let body = &lines[i + 1..];
                let body_line = first_line + i + 1;

                match group_shape(body) {
                    GroupShape::Complete { else_at, endif_at } => {
                        let (branch, branch_line) = match (kept, else_at) {
                            (KeptBranch::Then, Some(else_at)) => (&body[..else_at], body_line),
                            (KeptBranch::Then, None) => (&body[..endif_at], body_line),
                            (KeptBranch::Else, Some(else_at)) => (&body[else_at + 1..endif_at], body_line + else_at + 1),
                            (KeptBranch::Else, None) => (&body[..0], body_line),
                        };

                        tracing::debug!(
                            file = %context.file_label(),
                            line = first_line + i,
                            branch = ?kept,
                            "resolving GHC 7 guard"
                        );
                        let inner = context.descend();
                        if inner.exceeds_max_depth() {
                            return Err(inner.depth_exceeded());
                        }
                        resolved += 1 + self.resolve(branch, branch_line, &inner, out)?;
                        i += endif_at + 2;
                        continue;
                    }
                    GroupShape::HasElif => {
                        tracing::warn!(
                            file = %context.file_label(),
                            line = first_line + i,
                            "leaving GHC 7 guard with #elif untouched"
                        );
                    }
                    GroupShape::Unterminated => {
                        return Err(MigrateError::UnterminatedGuard {
                            file: context.file_label(),
                            line: first_line + i,
                            directive: line.trim().to_string(),
                        });
                    }
                }
            }

            out.push_str(line);
            i += 1;
        }

        Ok(resolved)
    }
}

impl Default for CppGuardResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationRule for CppGuardResolver {
    fn name(&self) -> &'static str {
        "CppGuardResolver"
    }

    fn description(&self) -> &'static str {
        "Resolves GHC 6/7 CPP guards in favour of the GHC 7 branch"
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn applies_to(&self, kind: FileKind) -> bool {
        kind == FileKind::HaskellSource
    }

    fn matches(&self, source: &str, _context: &TransformationContext) -> bool {
        source.contains("GHC7") || source.contains("__GLASGOW_HASKELL__")
    }

    fn transform(&self, source: &str, context: &TransformationContext) -> TransformResult<Rewrite> {
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        let mut out = String::with_capacity(source.len());
        let occurrences = self.resolve(&lines, 1, context, &mut out)?;
        Ok(Rewrite { text: out, occurrences })
    }
}

/*!
# Interpolation Rewriting

Hamlet 6 delimited every interpolation with the same sigil on both sides
(`$name$`, `@HomeR@`, `^footer^`). Hamlet 7 keeps the leading sigil and
wraps the body in braces (`#{name}`, `@{HomeR}`, `^{footer}`).
*/

/// Which old-style interpolations a grammar understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigilSet {
    /// Sigil delimiting variable interpolation (`$` or `%`)
    pub variable: char,
    /// `@url@` and `@?url@`
    pub url: bool,
    /// `^template^`
    pub embed: bool,
}

/// A single old-style interpolation found at the start of some text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation<'a> {
    /// Replacement opener, e.g. `#{` or `@?{`
    pub open: &'static str,
    pub body: &'a str,
    /// Bytes consumed from the input, both sigils included
    pub len: usize,
}

/// Characters that may never appear inside a parenthesised body
const FORBIDDEN_IN_GROUP: &[char] = &['$', '@', '^', '%', '#', '{', '}', '\n'];

impl SigilSet {
    pub const HAMLET: SigilSet = SigilSet {
        variable: '$',
        url: true,
        embed: true,
    };

    pub const CASSIUS: SigilSet = SigilSet {
        variable: '$',
        url: true,
        embed: false,
    };

    pub const JULIUS: SigilSet = SigilSet {
        variable: '%',
        url: true,
        embed: true,
    };

    pub fn is_sigil(&self, c: char) -> bool {
        c == self.variable || (self.url && c == '@') || (self.embed && c == '^')
    }

    /// Try to read a complete `sigil body sigil` at the start of `text`
    pub fn match_at<'a>(&self, text: &'a str) -> Option<Interpolation<'a>> {
        let sigil = text.chars().next()?;

        let (open, prefix_len) = if sigil == self.variable {
            ("#{", 1)
        } else if self.url && sigil == '@' {
            if text[1..].starts_with('?') {
                ("@?{", 2)
            } else {
                ("@{", 1)
            }
        } else if self.embed && sigil == '^' {
            ("^{", 1)
        } else {
            return None;
        };

        let after = &text[prefix_len..];
        let body_len = body_len(after)?;
        if !after[body_len..].starts_with(sigil) {
            return None;
        }

        Some(Interpolation {
            open,
            body: &after[..body_len],
            len: prefix_len + body_len + sigil.len_utf8(),
        })
    }
}

/// Length of a valid interpolation body at the start of `text`
fn body_len(text: &str) -> Option<usize> {
    let first = text.chars().next()?;

    if first.is_ascii_alphabetic() || first == '_' {
        let len = text
            .char_indices()
            .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '_' || c == '\'' || c == '.'))
            .map_or(text.len(), |(i, _)| i);
        if text[..len].ends_with('.') {
            return None;
        }
        return Some(len);
    }

    if first == '(' {
        let mut depth = 0usize;
        let mut has_content = false;
        for (i, c) in text.char_indices() {
            if FORBIDDEN_IN_GROUP.contains(&c) {
                return None;
            }
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return has_content.then_some(i + 1);
                    }
                }
                c if !c.is_whitespace() => has_content = true,
                _ => {}
            }
        }
    }

    None
}

/// Rewrite every old-style interpolation in `text`, returning the new text
/// and how many interpolations were rewritten.
///
/// Anything that is not a complete interpolation is copied unchanged,
/// including new-style `#{...}` forms.
pub fn rewrite_interpolations(text: &str, sigils: &SigilSet) -> (String, usize) {
    let mut out = String::with_capacity(text.len() + 16);
    let mut count = 0;
    let mut rest = text;

    while let Some(pos) = rest.find(|c| sigils.is_sigil(c)) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        match sigils.match_at(tail) {
            Some(interp) => {
                out.push_str(interp.open);
                out.push_str(interp.body);
                out.push('}');
                count += 1;
                rest = &tail[interp.len..];
            }
            None => {
                // Sigils are ASCII
                out.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    (out, count)
}

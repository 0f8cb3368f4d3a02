/*!
# Hamlet Control Statements

Hamlet 6 wrote loop and maybe bindings as `$forall people person`; Hamlet 7
reads them as `$forall person <- people`.
*/

use once_cell::sync::Lazy;
use regex::Regex;

/// `indent $keyword separator arguments trailing-whitespace`
static CONTROL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ \t]*)\$(if|elseif|else|forall|maybe|nothing)(?:([ \t]+)(.*?))?([ \t\r]*)$")
        .expect("control line pattern is valid")
});

/// A parsed Hamlet control line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlLine<'a> {
    pub indent: &'a str,
    pub keyword: &'a str,
    pub separator: &'a str,
    pub arguments: &'a str,
    pub trailing: &'a str,
}

impl<'a> ControlLine<'a> {
    /// Parse a line without its terminating `\n`
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = CONTROL_LINE.captures(line)?;
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        Some(Self {
            indent: group(1),
            keyword: group(2),
            separator: group(3),
            arguments: group(4),
            trailing: group(5),
        })
    }

    /// Whether this statement introduces a binding that changed shape
    pub fn binds(&self) -> bool {
        matches!(self.keyword, "forall" | "maybe")
    }

    /// The Hamlet 7 form of this line, if it differs
    pub fn migrate(&self) -> Option<String> {
        if !self.binds() || self.arguments.contains("<-") {
            return None;
        }

        let (source, binding) = split_binding(self.arguments)?;
        Some(format!(
            "{}${}{}{} <- {}{}",
            self.indent, self.keyword, self.separator, binding, source, self.trailing
        ))
    }
}

/// Split `expr binding` into its two halves.
///
/// The binding is a trailing parenthesised pattern when the arguments end
/// in `)`, otherwise the last whitespace separated token.
fn split_binding(arguments: &str) -> Option<(&str, &str)> {
    let arguments = arguments.trim_end();

    let split_at = if arguments.ends_with(')') {
        let mut depth = 0usize;
        let mut open = None;
        for (i, c) in arguments.char_indices().rev() {
            match c {
                ')' => depth += 1,
                '(' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        open = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        open?
    } else {
        arguments.rfind([' ', '\t']).map(|i| i + 1)?
    };

    let source = arguments[..split_at].trim_end();
    let binding = &arguments[split_at..];
    if source.is_empty() || binding.is_empty() {
        return None;
    }
    Some((source, binding))
}

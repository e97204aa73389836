//! Argument shape classification for exception-stubbing calls.
//!
//! `*Throw()` calls accept either class literals (`IOException.class`) or
//! constructed throwables (`new IOException("boom")`). The merge planner
//! needs to know which shapes a run mixes; everything it cannot positively
//! identify degrades to [`ArgumentShape::Other`] and is simply excluded
//! from the strategy decision. Classification never fails and never aborts
//! detection.

/// Shape of a single argument expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentShape {
    /// A bare type reference: `IOException.class`.
    TypeLiteral,
    /// An inline object construction: `new IOException(...)`.
    ConstructedInstance {
        /// True when the constructor call passes arguments. Only a
        /// conversion that keeps the constructed form preserves them.
        has_ctor_args: bool,
    },
    /// Anything else: variables, method calls, unresolved text.
    Other,
}

/// Classifies one argument expression by its text.
pub fn classify(text: &str) -> ArgumentShape {
    let text = text.trim();
    if let Some(interior) = constructor_interior(text) {
        return ArgumentShape::ConstructedInstance {
            has_ctor_args: !interior.trim().is_empty(),
        };
    }
    if type_literal_operand(text).is_some() {
        return ArgumentShape::TypeLiteral;
    }
    ArgumentShape::Other
}

/// Returns the operand of a class literal: `IOException.class` →
/// `IOException`, `java.io.IOException.class` → `java.io.IOException`.
pub(crate) fn type_literal_operand(text: &str) -> Option<&str> {
    let operand = text.trim().strip_suffix(".class")?;
    is_dotted_identifier(operand).then_some(operand)
}

/// Returns the constructed type of `new Type(...)`: the dotted type path.
pub(crate) fn constructed_type_name(text: &str) -> Option<&str> {
    let rest = text.trim().strip_prefix("new")?;
    // `new` must be a whole word, not a prefix of an identifier.
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let paren = rest.find('(')?;
    let name = rest[..paren].trim_end();
    is_dotted_identifier(name).then_some(name)
}

/// Returns the text between the constructor parentheses of `new Type(...)`,
/// or `None` when the expression is not exactly one constructor call
/// (trailing method calls, arrays, generics all disqualify it).
fn constructor_interior(text: &str) -> Option<&str> {
    constructed_type_name(text)?;
    let open = text.find('(')?;
    let close = matching_paren(text, open)?;
    // The matching close must end the expression; `new Ex().fillInStackTrace()`
    // is a method call, not a plain construction.
    if !text[close + 1..].trim().is_empty() {
        return None;
    }
    Some(&text[open + 1..close])
}

/// Finds the parenthesis matching `text[open]`, skipping string and
/// character literals (including escapes).
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_dotted_identifier(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars.next().is_some_and(|c| {
                c.is_alphabetic() || c == '_' || c == '$'
            }) && chars.all(|c| {
                c.is_alphanumeric() || c == '_' || c == '$'
            })
        })
}

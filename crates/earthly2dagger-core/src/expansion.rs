//! Lexical detection of variable references in command and value text.
//!
//! A reference is an unescaped `$` followed either by a bare name
//! (`$NAME`) or by a brace-delimited name (`${NAME}`). Names start with an
//! ASCII letter or underscore and continue with ASCII alphanumerics or
//! underscores. A backslash directly before `$` escapes it.
//!
//! Detection is purely textual. Whether a name is actually declared is
//! decided by the resolver, and substitution happens at build time inside
//! the container runtime, never here.

use std::ops::Range;

/// A single `$NAME` or `${NAME}` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    name: &'a str,
    range: Range<usize>,
}

impl<'a> Reference<'a> {
    /// The referenced variable name, without `$` or braces.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Byte range of the whole reference (including `$` and braces) in the scanned text.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }
}

/// Iterator over the references of a text, see [`references`].
#[derive(Debug, Clone)]
pub struct References<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for References<'a> {
    type Item = Reference<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() {
            let start = self.pos;
            match bytes[start] {
                b'\\' => {
                    // Skip the escaped character, whatever it is.
                    self.pos = (start + 2).min(bytes.len());
                }
                b'$' => {
                    self.pos = start + 1;
                    if let Some(reference) = self.reference_at(start) {
                        self.pos = reference.range.end;
                        return Some(reference);
                    }
                }
                _ => self.pos = start + 1,
            }
        }

        None
    }
}

impl<'a> References<'a> {
    /// Try to read a reference whose `$` sits at `dollar`.
    fn reference_at(&self, dollar: usize) -> Option<Reference<'a>> {
        let rest = &self.text[dollar + 1..];

        if let Some(braced) = rest.strip_prefix('{') {
            let len = name_len(braced);
            if len == 0 || !braced[len..].starts_with('}') {
                return None;
            }
            let name_start = dollar + 2;
            return Some(Reference {
                name: &self.text[name_start..name_start + len],
                range: dollar..name_start + len + 1,
            });
        }

        let len = name_len(rest);
        if len == 0 {
            return None;
        }
        Some(Reference {
            name: &self.text[dollar + 1..dollar + 1 + len],
            range: dollar..dollar + 1 + len,
        })
    }
}

/// Length in bytes of the variable name at the start of `text`, or 0.
fn name_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map_or(text.len(), |(idx, _)| idx)
}

/// Returns `true` if `text` is a valid variable name on its own.
pub fn is_variable_name(text: &str) -> bool {
    !text.is_empty() && name_len(text) == text.len()
}

/// Iterate over every `$NAME` / `${NAME}` reference in `text`, left to right.
///
/// # Examples
///
/// ```
/// use earthly2dagger_core::expansion::references;
///
/// let names: Vec<_> = references("echo ${GREETING} $name \\$HOME")
///     .map(|r| r.name())
///     .collect();
/// assert_eq!(names, ["GREETING", "name"]);
/// ```
pub fn references(text: &str) -> References<'_> {
    References { text, pos: 0 }
}

/// Returns `true` if `text` contains at least one reference.
pub fn has_references(text: &str) -> bool {
    references(text).next().is_some()
}

/// Returns the referenced name when `text` consists of exactly one reference
/// and nothing else, such as `$name` or `${name}`.
pub fn sole_reference(text: &str) -> Option<&str> {
    let mut refs = references(text);
    let first = refs.next()?;
    (first.range == (0..text.len()) && refs.next().is_none()).then_some(first.name)
}

/// Remove the backslash of every `\$` escape in text that is used as is.
///
/// Other backslash pairs are kept unchanged, matching how [`references`]
/// skips them.
///
/// ```
/// use earthly2dagger_core::expansion::unescape;
///
/// assert_eq!(unescape("\\$HOME"), "$HOME");
/// assert_eq!(unescape("a\\nb"), "a\\nb");
/// ```
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('$') => out.push('$'),
            Some(next) => {
                out.push(c);
                out.push(next);
            }
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn names(text: &str) -> Vec<&str> {
        references(text).map(|r| r.name()).collect()
    }

    #[test]
    fn test_bare_and_braced() {
        assert_eq!(names("echo $NAME"), ["NAME"]);
        assert_eq!(names("echo \"Hello, World ${NAME}\""), ["NAME"]);
        assert_eq!(names("alpine:${TAG}"), ["TAG"]);
        assert_eq!(names("$a$b"), ["a", "b"]);
        assert_eq!(names("${a}_${b_2}"), ["a", "b_2"]);
    }

    #[test]
    fn test_not_references() {
        assert!(names("echo 'hello, world'").is_empty());
        assert!(names("price: 5$").is_empty());
        assert!(names("$1 $@ $$").is_empty());
        assert!(names("${}").is_empty());
        assert!(names("${NAME").is_empty());
        assert!(names("${NAME:-x}").is_empty());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("\\$HOME"), "$HOME");
        assert_eq!(unescape("cost: \\$5 and \\${X}"), "cost: $5 and ${X}");
        assert_eq!(unescape("\\\\$USER"), "\\\\$USER");
        assert_eq!(unescape("trailing\\"), "trailing\\");
        assert_eq!(unescape("plain"), "plain");
    }

    #[test]
    fn test_escaped_dollar() {
        assert!(names("echo \\$HOME").is_empty());
        assert_eq!(names("\\$HOME $USER"), ["USER"]);
        assert_eq!(names("\\\\$USER"), ["USER"]);
    }

    #[test]
    fn test_ranges() {
        let refs: Vec<_> = references("a ${B} $c").collect();
        assert_eq!(refs[0].range(), 2..6);
        assert_eq!(refs[1].range(), 7..9);
    }

    #[test]
    fn test_sole_reference() {
        assert_eq!(sole_reference("$name"), Some("name"));
        assert_eq!(sole_reference("${name}"), Some("name"));
        assert_eq!(sole_reference("x$name"), None);
        assert_eq!(sole_reference("$a$b"), None);
        assert_eq!(sole_reference("plain"), None);
        assert_eq!(sole_reference(""), None);
    }

    #[test]
    fn test_is_variable_name() {
        assert!(is_variable_name("MULTI_WORD"));
        assert!(is_variable_name("_x1"));
        assert!(!is_variable_name(""));
        assert!(!is_variable_name("1x"));
        assert!(!is_variable_name("a-b"));
        assert!(!is_variable_name("$a"));
    }

    #[test]
    fn test_non_ascii_text() {
        assert_eq!(names("héllo ${NAME} wörld"), ["NAME"]);
        assert!(!has_references("naïve"));
    }

    proptest! {
        #[test]
        fn prop_text_without_dollar_has_no_references(text in "[^$]*") {
            prop_assert!(!has_references(&text));
        }

        #[test]
        fn prop_braced_reference_round_trips(name in "[A-Za-z_][A-Za-z0-9_]{0,12}") {
            let text = format!("${{{name}}}");
            prop_assert_eq!(sole_reference(&text), Some(name.as_str()));
        }
    }
}

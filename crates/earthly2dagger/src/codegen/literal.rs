//! Go literal syntax.

use std::fmt::Write;

/// Interpreted Go string literal: `"..."` with escapes.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Raw Go string literal when `text` can be one, otherwise [`quote`].
///
/// Raw strings cannot contain a backquote, and Go drops carriage returns
/// from them.
pub fn raw(text: &str) -> String {
    if text.contains('`') || text.contains('\r') {
        quote(text)
    } else {
        format!("`{text}`")
    }
}

/// `[]string{...}` from already rendered elements.
pub fn string_slice<I>(elements: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let elements: Vec<String> = elements.into_iter().collect();
    format!("[]string{{{}}}", elements.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(quote("alpine"), r#""alpine""#);
        assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(quote("a\\b"), r#""a\\b""#);
        assert_eq!(quote("line\nnext\ttab"), r#""line\nnext\ttab""#);
        assert_eq!(quote("\u{1b}[0m"), r#""\x1b[0m""#);
        assert_eq!(quote("héllo ${NAME}"), r#""héllo ${NAME}""#);
    }

    #[test]
    fn test_raw() {
        assert_eq!(raw("echo 'hello, world'"), "`echo 'hello, world'`");
        assert_eq!(raw(r#"echo "${NAME}""#), r#"`echo "${NAME}"`"#);
        assert_eq!(raw("echo `date`"), r#""echo `date`""#);
        assert_eq!(raw("a\rb"), r#""a\rb""#);
    }

    #[test]
    fn test_string_slice() {
        assert_eq!(
            string_slice(["sh", "-c"].map(quote)),
            r#"[]string{"sh", "-c"}"#
        );
        assert_eq!(string_slice(Vec::new()), "[]string{}");
    }
}

//! Template formatting against a note's own metadata.
//!
//! `{key}` placeholders are replaced by the note's value for `key`; list
//! values are joined with `, `. `{{` and `}}` produce literal braces.

use notekeep_core::{Error, Metadata, Result};

/// Fill `template` from `metadata`.
///
/// Fails with [`Error::MissingKey`] naming the first placeholder the
/// metadata cannot satisfy, and with [`Error::ParseError`] on unbalanced
/// braces.
pub fn format_template(template: &str, metadata: &Metadata) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if chars.next_if(|&(_, n)| n == '{').is_some() => out.push('{'),
            '{' => {
                let mut key = String::new();
                let mut closed = false;
                for (_, n) in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    key.push(n);
                }
                if !closed {
                    return Err(Error::parse_error(format!(
                        "Unterminated placeholder at byte {} in template",
                        pos
                    )));
                }
                let key = key.trim();
                let value = metadata.get(key).ok_or_else(|| Error::missing_key(key))?;
                out.push_str(&value.to_string());
            }
            '}' if chars.next_if(|&(_, n)| n == '}').is_some() => out.push('}'),
            '}' => {
                return Err(Error::parse_error(format!(
                    "Unmatched '}}' at byte {} in template",
                    pos
                )));
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notekeep_core::Value;

    fn meta() -> Metadata {
        let mut meta = Metadata::new();
        meta.insert("link", "Alice Smith");
        meta.insert("attendees", Value::list(["Alice", "Bob"]));
        meta
    }

    #[test]
    fn test_format_scalar_and_list() {
        let out = format_template("{link} met {attendees}", &meta()).unwrap();
        assert_eq!(out, "Alice Smith met Alice, Bob");
    }

    #[test]
    fn test_format_escaped_braces() {
        let out = format_template("{{literal}} {link}", &meta()).unwrap();
        assert_eq!(out, "{literal} Alice Smith");
    }

    #[test]
    fn test_format_missing_key() {
        let err = format_template("WHERE a = {title}", &meta()).unwrap_err();
        assert!(matches!(err, Error::MissingKey { ref key } if key == "title"));
    }

    #[test]
    fn test_format_unbalanced() {
        assert!(matches!(
            format_template("{link", &meta()),
            Err(Error::ParseError { .. })
        ));
        assert!(matches!(
            format_template("link}", &meta()),
            Err(Error::ParseError { .. })
        ));
    }
}

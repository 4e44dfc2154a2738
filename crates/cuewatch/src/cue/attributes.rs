use serde::Serialize;
use std::fmt;

/// An attribute value after quote stripping.
///
/// Values made only of ASCII digits become numbers; anything else, including
/// `30.5` or `-1`, is kept as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

impl AttrValue {
    pub fn coerce(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
            && let Ok(n) = raw.parse::<f64>()
        {
            return AttrValue::Number(n);
        }
        AttrValue::Text(raw.to_string())
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

/// One token of a tag's attribute list.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Upper-cased key, `None` for a bare token.
    pub key: Option<String>,
    /// Value text with quotes removed.
    pub raw: String,
    pub value: AttrValue,
}

impl Attribute {
    pub fn key_is(&self, name: &str) -> bool {
        self.key.as_deref() == Some(name)
    }
}

fn is_attribute_name(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Split on commas, but keep quoted values intact.
fn split_unquoted_commas(rest: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0usize;
    for (idx, ch) in rest.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(rest[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(rest[start..].trim());
    parts
}

fn parse_token(token: &str) -> Attribute {
    let token = token.replace('"', "");
    let token = token.trim();

    // A trailing run of '=' is base64 padding, not a separator.
    if let Some((key, value)) = token.split_once('=')
        && is_attribute_name(key.trim())
        && !(!value.is_empty() && value.bytes().all(|b| b == b'='))
    {
        let raw = value.trim().to_string();
        return Attribute {
            key: Some(key.trim().to_ascii_uppercase()),
            value: AttrValue::coerce(&raw),
            raw,
        };
    }

    Attribute {
        key: None,
        value: AttrValue::coerce(token),
        raw: token.to_string(),
    }
}

/// Tokenize the attribute list following a tag's colon.
///
/// Empty tokens (`A=1,,B=2` or a trailing comma) are dropped.
pub fn split_attributes(rest: &str) -> Vec<Attribute> {
    split_unquoted_commas(rest)
        .into_iter()
        .filter(|token| !token.is_empty())
        .map(parse_token)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_become_numbers() {
        assert_eq!(AttrValue::coerce("30"), AttrValue::Number(30.0));
        assert_eq!(AttrValue::coerce("30.5"), AttrValue::Text("30.5".into()));
        assert_eq!(AttrValue::coerce("-1"), AttrValue::Text("-1".into()));
        assert_eq!(AttrValue::coerce(""), AttrValue::Text(String::new()));
    }

    #[test]
    fn numbers_render_without_fraction() {
        assert_eq!(AttrValue::Number(10.0).to_string(), "10");
        assert_eq!(AttrValue::Text("30.5".into()).to_string(), "30.5");
    }

    #[test]
    fn keyed_and_bare_tokens() {
        let attrs = split_attributes("DURATION=10, breakid=\"5\",  42");
        assert_eq!(attrs.len(), 3);
        assert!(attrs[0].key_is("DURATION"));
        assert_eq!(attrs[0].value, AttrValue::Number(10.0));
        assert!(attrs[1].key_is("BREAKID"));
        assert_eq!(attrs[1].raw, "5");
        assert_eq!(attrs[2].key, None);
        assert_eq!(attrs[2].value, AttrValue::Number(42.0));
    }

    #[test]
    fn quoted_commas_do_not_split() {
        let attrs = split_attributes("ID=\"a,b\",CLASS=\"x\"");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].raw, "a,b");
    }

    #[test]
    fn value_keeps_base64_padding() {
        let attrs = split_attributes("SCTE35=/DAlAAAA==");
        assert!(attrs[0].key_is("SCTE35"));
        assert_eq!(attrs[0].raw, "/DAlAAAA==");
    }

    #[test]
    fn bare_base64_is_not_a_key() {
        let attrs = split_attributes("/DA0AAAAAAAA///wBQb+AAAAAA==");
        assert_eq!(attrs[0].key, None);
        assert_eq!(attrs[0].raw, "/DA0AAAAAAAA///wBQb+AAAAAA==");

        let attrs = split_attributes("ABCD==");
        assert_eq!(attrs[0].key, None);
    }

    #[test]
    fn empty_tokens_are_dropped() {
        let attrs = split_attributes("A=1,,B=2,");
        assert_eq!(attrs.len(), 2);
    }
}

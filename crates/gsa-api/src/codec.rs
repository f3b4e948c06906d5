// Extension codec
//
// A single named property lives in one `<gsa:content name="...">` element
// whose text is stored in escaped form. `escape` and `unescape` are the only
// places where raw and escaped text cross.

/// Escape the five XML metacharacters in one left-to-right pass.
///
/// Absent input stays absent: `None` is not turned into an empty string.
pub fn escape(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    Some(out)
}

/// Decode the five named entities produced by [`escape`].
///
/// Unknown or unterminated entities are copied through literally instead of
/// failing. An absent value reads back as the empty string.
pub fn unescape(escaped: Option<&str>) -> String {
    let Some(escaped) = escaped else {
        return String::new();
    };
    let Some(first) = escaped.find('&') else {
        return escaped.to_owned();
    };

    let mut out = String::with_capacity(escaped.len());
    out.push_str(&escaped[..first]);

    let mut rest = &escaped[first..];
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let name_len = tail
            .char_indices()
            .find(|(_, c)| !c.is_alphabetic())
            .map_or(tail.len(), |(i, _)| i);
        let name = &tail[..name_len];
        let after = &tail[name_len..];

        if let Some(after_semi) = after.strip_prefix(';') {
            match entity_char(name) {
                Some(ch) => out.push(ch),
                None => {
                    out.push('&');
                    out.push_str(name);
                    out.push(';');
                }
            }
            rest = after_semi;
        } else {
            out.push('&');
            out.push_str(name);
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

fn entity_char(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => None,
    }
}

/// One named property of an entry, holding its value in escaped form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    name: String,
    escaped: Option<String>,
}

impl Extension {
    /// Create an extension from a raw (unescaped) value.
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            escaped: escape(value),
        }
    }

    /// Create an extension from text that is already escaped, as read off
    /// the wire.
    pub fn from_escaped(name: impl Into<String>, escaped: Option<String>) -> Self {
        Self {
            name: name.into(),
            escaped,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The escaped text, exactly as it is written to the wire.
    pub fn escaped(&self) -> Option<&str> {
        self.escaped.as_deref()
    }

    /// The decoded value. Missing content reads as `""`.
    pub fn value(&self) -> String {
        unescape(self.escaped.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_replaces_all_five_metacharacters() {
        assert_eq!(
            escape(Some(r#"a&b<c>d'e"f"#)).as_deref(),
            Some("a&amp;b&lt;c&gt;d&apos;e&quot;f")
        );
    }

    #[test]
    fn escape_absent_stays_absent() {
        assert_eq!(escape(None), None);
        assert_eq!(escape(Some("")).as_deref(), Some(""));
    }

    #[test]
    fn unescape_absent_reads_as_empty() {
        assert_eq!(unescape(None), "");
    }

    #[test]
    fn unescape_without_ampersand_is_identity() {
        assert_eq!(unescape(Some("plain text")), "plain text");
    }

    #[test]
    fn unescape_decodes_known_entities() {
        assert_eq!(
            unescape(Some("&lt;a href=&quot;x&quot;&gt;&amp;&apos;")),
            "<a href=\"x\">&'"
        );
    }

    #[test]
    fn unescape_leaves_unknown_entity_in_place() {
        assert_eq!(unescape(Some("a &notareal; b")), "a &notareal; b");
    }

    #[test]
    fn unescape_leaves_unterminated_entity_in_place() {
        assert_eq!(unescape(Some("fish &amp chips")), "fish &amp chips");
        assert_eq!(unescape(Some("trailing &")), "trailing &");
        assert_eq!(unescape(Some("&&amp;")), "&&");
    }

    #[test]
    fn unescape_handles_numeric_references_literally() {
        assert_eq!(unescape(Some("&#38;")), "&#38;");
    }

    #[test]
    fn round_trip_preserves_text() {
        for s in [
            "",
            "no specials",
            "<tag attr='1'>&\"quoted\"</tag>",
            "unicode ✓ & ümlaut",
            "&amp; literally",
            "a;b&c;d",
        ] {
            assert_eq!(unescape(escape(Some(s)).as_deref()), s, "round trip of {s:?}");
        }
    }

    #[test]
    fn extension_stores_escaped_and_reads_raw() {
        let ext = Extension::new("urlPattern", Some("http://a/?x=1&y=2"));
        assert_eq!(ext.escaped(), Some("http://a/?x=1&amp;y=2"));
        assert_eq!(ext.value(), "http://a/?x=1&y=2");

        let empty = Extension::new("urlPattern", None);
        assert_eq!(empty.escaped(), None);
        assert_eq!(empty.value(), "");
    }
}

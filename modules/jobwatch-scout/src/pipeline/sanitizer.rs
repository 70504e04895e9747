// Repairs feed bytes before they reach feed-rs. Job boards regularly ship
// stray control bytes, broken UTF-8, legacy single-byte encodings and
// unescaped ampersands, any of which makes a strict XML reader reject the
// whole document or lose characters.

use std::borrow::Cow;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use regex::Regex;
use tracing::debug;

static ENCODING_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(<\?xml[^>]*?\bencoding\s*=\s*)["'][^"']*["']"#).expect("valid regex")
});

/// Encoding label in an XML declaration, read from the raw (still undecoded) prolog.
static DECLARED_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*<\?xml[^>]*?\bencoding\s*=\s*["']([^"']*)["']"#).expect("valid regex")
});

/// A character or entity reference body following `&`.
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#[0-9]+|#x[0-9A-Fa-f]+|[A-Za-z_][A-Za-z0-9._-]*);").expect("valid regex")
});

/// How far into the document to look for an XML declaration.
const PROLOG_SCAN_LEN: usize = 512;

/// Return a UTF-8 copy of `raw` that a strict XML parser will accept.
/// Bytes are decoded with the BOM or declared encoding (UTF-8 otherwise).
/// Never fails; whatever cannot be repaired is dropped.
pub fn sanitize_feed(raw: &[u8]) -> Vec<u8> {
    let (encoding, body) = detect_encoding(raw);
    let mut text = String::with_capacity(body.len());
    let mut dropped = 0usize;

    if encoding == UTF_8 {
        for chunk in body.utf8_chunks() {
            dropped += push_xml_chars(chunk.valid(), &mut text);
            dropped += chunk.invalid().len();
        }
    } else {
        let (decoded, had_errors) = encoding.decode_without_bom_handling(body);
        if had_errors {
            debug!(encoding = encoding.name(), "Feed bytes did not match the declared encoding");
        }
        dropped += push_xml_chars(&decoded, &mut text);
    }

    if dropped > 0 {
        debug!(dropped, "Sanitizer removed characters not allowed in XML");
    }

    let trimmed = text.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let escaped = escape_bare_ampersands(trimmed);
    // The bytes are UTF-8 now, whatever the prolog originally claimed.
    let declared = ENCODING_DECL_RE.replace(&escaped, "${1}\"UTF-8\"");

    declared.into_owned().into_bytes()
}

/// Byte order mark first, then the XML declaration, then UTF-8.
/// Returns the encoding and the bytes after any BOM.
fn detect_encoding(raw: &[u8]) -> (&'static Encoding, &[u8]) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(raw) {
        return (encoding, &raw[bom_len..]);
    }

    let head = String::from_utf8_lossy(&raw[..raw.len().min(PROLOG_SCAN_LEN)]);
    let declared = DECLARED_LABEL_RE
        .captures(&head)
        .and_then(|c| Encoding::for_label(c[1].trim().as_bytes()))
        // A prolog readable as ASCII cannot be UTF-16.
        .filter(|e| *e != UTF_16LE && *e != UTF_16BE);

    (declared.unwrap_or(UTF_8), raw)
}

/// Append the characters of `s` that XML allows; returns how many were dropped.
fn push_xml_chars(s: &str, out: &mut String) -> usize {
    let mut dropped = 0;
    for c in s.chars() {
        if is_xml_char(c) {
            out.push(c);
        } else {
            dropped += 1;
        }
    }
    dropped
}

/// The XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn escape_bare_ampersands(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;

    while let Some(pos) = rest.find(&['&', '<'][..]) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if rest.starts_with('&') {
            if REFERENCE_RE.is_match(&rest[1..]) {
                out.push('&');
            } else {
                out.push_str("&amp;");
            }
            rest = &rest[1..];
        } else if let Some(end) = verbatim_section_end(rest) {
            out.push_str(&rest[..end]);
            rest = &rest[end..];
        } else {
            out.push('<');
            rest = &rest[1..];
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

/// Length of a CDATA section or comment starting at `s`; their content is copied untouched.
fn verbatim_section_end(s: &str) -> Option<usize> {
    for (open, close) in [("<![CDATA[", "]]>"), ("<!--", "-->")] {
        if let Some(body) = s.strip_prefix(open) {
            let end = body
                .find(close)
                .map(|i| open.len() + i + close.len())
                .unwrap_or(s.len());
            return Some(end);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize_str(input: &[u8]) -> String {
        String::from_utf8(sanitize_feed(input)).unwrap()
    }

    #[test]
    fn clean_input_is_unchanged() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?><rss><channel><title>Jobs &amp; more</title></channel></rss>"#;
        assert_eq!(sanitize_str(xml.as_bytes()), xml);
    }

    #[test]
    fn drops_control_characters() {
        let input = b"<title>FY1\x0b Post\x01</title>";
        assert_eq!(sanitize_str(input), "<title>FY1 Post</title>");
    }

    #[test]
    fn drops_invalid_utf8_bytes() {
        let input = b"<title>SHO \xff\xfeRota</title>";
        assert_eq!(sanitize_str(input), "<title>SHO Rota</title>");
    }

    #[test]
    fn keeps_multibyte_characters() {
        let input = "<description>Salary: £40,000 — Leeds</description>";
        assert_eq!(sanitize_str(input.as_bytes()), input);
    }

    #[test]
    fn escapes_bare_ampersands_only() {
        let input = b"<title>A&E Doctor &amp; Trust &#163; &#x00A3; &pound; R&D;</title>";
        assert_eq!(
            sanitize_str(input),
            "<title>A&amp;E Doctor &amp; Trust &#163; &#x00A3; &pound; R&D;</title>"
        );
    }

    #[test]
    fn cdata_and_comments_are_untouched() {
        let input = b"<d><![CDATA[A&E <b>now</b>]]><!-- R&D --> &</d>";
        assert_eq!(
            sanitize_str(input),
            "<d><![CDATA[A&E <b>now</b>]]><!-- R&D --> &amp;</d>"
        );
    }

    #[test]
    fn unterminated_cdata_runs_to_end() {
        let input = b"<d><![CDATA[A&E";
        assert_eq!(sanitize_str(input), "<d><![CDATA[A&E");
    }

    #[test]
    fn rewrites_declared_encoding() {
        let input = b"<?xml version=\"1.0\" encoding='ISO-8859-1'?><rss/>";
        assert_eq!(
            sanitize_str(input),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><rss/>"
        );
    }

    #[test]
    fn decodes_declared_latin1() {
        let input = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><d>Salary: \xa340,000 \xe9t\xe9</d>";
        assert_eq!(
            sanitize_str(input),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><d>Salary: £40,000 été</d>"
        );
    }

    #[test]
    fn decodes_windows_1252_smart_quotes() {
        let input = b"<?xml version='1.0' encoding='windows-1252'?><d>\x93Trust\x94 \x96 A&E</d>";
        assert_eq!(
            sanitize_str(input),
            "<?xml version='1.0' encoding=\"UTF-8\"?><d>\u{201c}Trust\u{201d} \u{2013} A&amp;E</d>"
        );
    }

    #[test]
    fn decodes_utf16_with_bom() {
        let mut input = vec![0xff, 0xfe];
        for unit in "<title>Caf\u{e9} SHO</title>".encode_utf16() {
            input.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(sanitize_str(&input), "<title>Caf\u{e9} SHO</title>");
    }

    #[test]
    fn utf16_label_without_bom_is_read_as_utf8() {
        let input = b"<?xml version=\"1.0\" encoding=\"UTF-16\"?><rss/>";
        assert_eq!(
            sanitize_str(input),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><rss/>"
        );
    }

    #[test]
    fn unknown_label_falls_back_to_utf8() {
        let input = "<?xml version=\"1.0\" encoding=\"x-made-up\"?><d>£5</d>";
        assert_eq!(
            sanitize_str(input.as_bytes()),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><d>£5</d>"
        );
    }

    #[test]
    fn strips_leading_bom_and_whitespace() {
        let input = "\u{feff}\n  <?xml version=\"1.0\"?><rss/>";
        assert_eq!(sanitize_str(input.as_bytes()), "<?xml version=\"1.0\"?><rss/>");
    }

    #[test]
    fn empty_input() {
        assert!(sanitize_feed(b"").is_empty());
    }
}

/// Named HTML5 entities written in place of their non-ASCII characters.
const NAMED: &[(char, &str)] = &[
    ('\u{a0}', "&nbsp;"),
    ('¡', "&iexcl;"),
    ('¢', "&cent;"),
    ('£', "&pound;"),
    ('¥', "&yen;"),
    ('§', "&sect;"),
    ('©', "&copy;"),
    ('«', "&laquo;"),
    ('®', "&reg;"),
    ('°', "&deg;"),
    ('±', "&plusmn;"),
    ('²', "&sup2;"),
    ('³', "&sup3;"),
    ('µ', "&micro;"),
    ('¶', "&para;"),
    ('·', "&middot;"),
    ('»', "&raquo;"),
    ('¼', "&frac14;"),
    ('½', "&frac12;"),
    ('¾', "&frac34;"),
    ('¿', "&iquest;"),
    ('À', "&Agrave;"),
    ('Á', "&Aacute;"),
    ('Ä', "&Auml;"),
    ('Ç', "&Ccedil;"),
    ('È', "&Egrave;"),
    ('É', "&Eacute;"),
    ('Ñ', "&Ntilde;"),
    ('Ö', "&Ouml;"),
    ('×', "&times;"),
    ('Ü', "&Uuml;"),
    ('ß', "&szlig;"),
    ('à', "&agrave;"),
    ('á', "&aacute;"),
    ('â', "&acirc;"),
    ('ä', "&auml;"),
    ('ç', "&ccedil;"),
    ('è', "&egrave;"),
    ('é', "&eacute;"),
    ('ê', "&ecirc;"),
    ('ë', "&euml;"),
    ('í', "&iacute;"),
    ('ï', "&iuml;"),
    ('ñ', "&ntilde;"),
    ('ó', "&oacute;"),
    ('ô', "&ocirc;"),
    ('ö', "&ouml;"),
    ('÷', "&divide;"),
    ('ú', "&uacute;"),
    ('ü', "&uuml;"),
    ('–', "&ndash;"),
    ('—', "&mdash;"),
    ('‘', "&lsquo;"),
    ('’', "&rsquo;"),
    ('‚', "&sbquo;"),
    ('“', "&ldquo;"),
    ('”', "&rdquo;"),
    ('„', "&bdquo;"),
    ('†', "&dagger;"),
    ('•', "&bull;"),
    ('…', "&hellip;"),
    ('′', "&prime;"),
    ('€', "&euro;"),
    ('™', "&trade;"),
    ('←', "&larr;"),
    ('→', "&rarr;"),
    ('✓', "&check;"),
];

/// Escapes markup characters and swaps known non-ASCII characters for their
/// entity. Characters without an entry are written unchanged.
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c if c.is_ascii() => out.push(c),
            c => match NAMED.iter().find(|(named, _)| *named == c) {
                Some((_, entity)) => out.push_str(entity),
                None => out.push(c),
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(encode_text("café — “quoted”"), "caf&eacute; &mdash; &ldquo;quoted&rdquo;");
        assert_eq!(encode_text("नमस्ते"), "नमस्ते");
    }
}

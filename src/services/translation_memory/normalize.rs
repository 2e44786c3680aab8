/// Matching key for the translation memory. Case, spacing, quotes, ellipses
/// and Qt mnemonic markers (`&File`) do not count; placeholders do.
pub fn normalize(text: &str) -> String {
    let mut s = text.trim().to_lowercase();

    // collapse runs of spaces, tabs and newlines
    s = s.split_whitespace().collect::<Vec<_>>().join(" ");

    s = strip_mnemonics(&s);
    // "Loading..." and "Loading" are the same string to a translator
    s = s.replace("...", "");

    for ch in ['“', '”', '’', '‘', '…', '"', '\'', '(', ')'] {
        s = s.replace(ch, "");
    }

    s.trim().to_string()
}

// "&&" is a literal ampersand, a lone "&" marks the accelerator key
fn strip_mnemonics(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '&' {
            if chars.peek() == Some(&'&') {
                chars.next();
                out.push('&');
            } else if chars.peek().map_or(true, |n| n.is_whitespace()) {
                // "Tom & Jerry": not a mnemonic
                out.push('&');
            }
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_case_spacing_and_decoration() {
        assert_eq!(normalize("  Downloading   new version... "), "downloading new version");
        assert_eq!(normalize("Downloading new version…"), "downloading new version");
        assert_eq!(normalize("\"Check me\""), "check me");
    }

    #[test]
    fn mnemonics_are_dropped_but_literal_ampersands_stay() {
        assert_eq!(normalize("&File"), "file");
        assert_eq!(normalize("Save && Quit"), "save & quit");
        assert_eq!(normalize("Tom & Jerry"), "tom & jerry");
    }

    #[test]
    fn placeholders_are_kept() {
        assert_eq!(normalize("Found new version: {}"), "found new version: {}");
    }
}

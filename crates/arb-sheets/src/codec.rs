//! Conversion between ARB string literals and the text shown in the sheet.
//!
//! The stored form is the body of a JSON string literal exactly as it appears
//! in an ARB file. The raw form is what translators see and edit. Escape pairs
//! such as `\n` or `\u00e9` stay literal in both forms: a translator sees the
//! two characters `\n`, and they are written back to the file as the same two
//! characters.

/// Characters that complete an escape pair kept verbatim, besides `\uXXXX`.
const PAIR_LETTERS: [char; 6] = ['/', 'n', 't', 'r', 'b', 'f'];

/// Turn raw sheet text into the body of an ARB string literal.
///
/// Backslashes are handled as runs. A run that ends in an escape pair is
/// copied as-is; any other run is doubled. Bare quotes are escaped and raw
/// control characters are written as their escape pair.
pub fn encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    let mut rest = raw;

    while let Some(ch) = rest.chars().next() {
        if ch == '\\' {
            let run = backslash_run(rest);
            rest = &rest[run..];
            let stored = if completes_pair(rest) { run } else { run * 2 };
            push_backslashes(&mut out, stored);
            continue;
        }

        match ch {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// Turn the body of an ARB string literal into raw sheet text.
///
/// A backslash run that ends in an escape pair is kept literally. Before a
/// quote the odd backslash is the quote's escape, and every other run is
/// halved.
pub fn decode(stored: &str) -> String {
    let mut out = String::with_capacity(stored.len());
    let mut rest = stored;

    while let Some(ch) = rest.chars().next() {
        if ch != '\\' {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
            continue;
        }

        let run = backslash_run(rest);
        rest = &rest[run..];
        if completes_pair(rest) {
            push_backslashes(&mut out, run);
        } else if run % 2 == 1 && rest.starts_with('"') {
            push_backslashes(&mut out, run / 2);
            out.push('"');
            rest = &rest[1..];
        } else {
            // An odd run here is not valid JSON; keep its lone backslash
            push_backslashes(&mut out, run.div_ceil(2));
        }
    }

    out
}

/// Number of backslashes at the start of `text`.
fn backslash_run(text: &str) -> usize {
    text.len() - text.trim_start_matches('\\').len()
}

fn push_backslashes(out: &mut String, count: usize) {
    out.extend(std::iter::repeat_n('\\', count));
}

/// Whether `text`, found right after a backslash run, turns the run's last
/// backslash into an escape pair.
fn completes_pair(text: &str) -> bool {
    match text.chars().next() {
        Some('u') => text
            .get(1..5)
            .is_some_and(|hex| hex.chars().all(|c| c.is_ascii_hexdigit())),
        Some(c) => PAIR_LETTERS.contains(&c),
        None => false,
    }
}

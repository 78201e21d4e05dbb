// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Whitespace cleanup for extracted text.

/// Trim every line, drop lines that end up empty, and rejoin with `\n`.
///
/// Any Unicode line break counts as a line boundary, including a lone `\r`.
/// Idempotent. Applied to each page on its own, never across page boundaries.
pub fn normalize(text: &str) -> String {
    text.split(is_line_break)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

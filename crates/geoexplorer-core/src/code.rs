//! DANE administrative code helpers.
//!
//! The code length encodes the administrative level: one or two characters
//! for a department, five for a municipality whose first two characters are
//! the parent department code. The prefix rule is a property of the dataset,
//! not something the codes themselves can prove.

/// Administrative level implied by a DANE code's length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaneLevel {
    Department,
    Municipality,
    Other,
}

/// Returns the administrative level for `code` (surrounding whitespace ignored).
#[must_use]
pub fn level(code: &str) -> DaneLevel {
    match code.trim().chars().count() {
        1 | 2 => DaneLevel::Department,
        5 => DaneLevel::Municipality,
        _ => DaneLevel::Other,
    }
}

/// Returns the parent department code of a municipality code.
///
/// `None` for anything that is not a five-character municipality code.
#[must_use]
pub fn parent_department(code: &str) -> Option<&str> {
    let code = code.trim();
    if level(code) != DaneLevel::Municipality {
        return None;
    }
    // Byte offset of the third char; input is not guaranteed ASCII.
    code.char_indices().nth(2).map(|(idx, _)| &code[..idx])
}

/// True when `code` is non-empty and made only of ASCII digits.
#[must_use]
pub fn is_numeric(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())
}

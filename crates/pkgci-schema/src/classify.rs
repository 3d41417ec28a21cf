use crate::types::{ArrayField, ScalarField};

/// What a normalized line outside an array turns out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment<'a> {
    /// `ident=value`. `field` is `None` for identifiers the record does not track.
    Scalar {
        field: Option<ScalarField>,
        value: &'a str,
    },
    /// `ident=(...`. `fragment` is whatever follows the opening parenthesis
    /// on this line, possibly including the closing one.
    ArrayOpen {
        target: Option<ArrayField>,
        fragment: &'a str,
    },
}

/// Classify a normalized line. Returns `None` when the line has no `=`.
///
/// The identifier is everything left of the first `=`. A trailing `+` (the
/// shell append operator) is dropped and the assignment is treated like a
/// plain one.
pub fn classify(line: &str) -> Option<Assignment<'_>> {
    let (lhs, rhs) = line.split_once('=')?;
    let ident = lhs.trim();
    let ident = ident.strip_suffix('+').unwrap_or(ident).trim_end();
    let value = rhs.trim();

    if let Some(fragment) = value.strip_prefix('(') {
        return Some(Assignment::ArrayOpen {
            target: ArrayField::from_identifier(ident),
            fragment,
        });
    }

    Some(Assignment::Scalar {
        field: ScalarField::from_identifier(ident),
        value: strip_quotes(value),
    })
}

/// Remove exactly one layer of matching `"` or `'` quotes.
pub fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

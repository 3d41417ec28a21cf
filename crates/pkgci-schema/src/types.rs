//! Recognized PKGBUILD identifiers and the record slots they populate.
//!
//! Matching is exact and case-sensitive; any other identifier is parsed but
//! its value is discarded.

use std::fmt;

/// Single-valued manifest fields. The first assignment wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    Name,
    Version,
    Release,
}

impl ScalarField {
    pub const ALL: [ScalarField; 3] = [
        ScalarField::Name,
        ScalarField::Version,
        ScalarField::Release,
    ];

    pub fn from_identifier(ident: &str) -> Option<Self> {
        match ident {
            "pkgname" => Some(ScalarField::Name),
            "pkgver" => Some(ScalarField::Version),
            "pkgrel" => Some(ScalarField::Release),
            _ => None,
        }
    }

    /// The shell variable name this field is read from.
    pub fn identifier(self) -> &'static str {
        match self {
            ScalarField::Name => "pkgname",
            ScalarField::Version => "pkgver",
            ScalarField::Release => "pkgrel",
        }
    }
}

impl fmt::Display for ScalarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Multi-valued manifest fields. Every assignment appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayField {
    Architectures,
    RuntimeDeps,
    BuildDeps,
    CheckDeps,
}

impl ArrayField {
    pub const ALL: [ArrayField; 4] = [
        ArrayField::Architectures,
        ArrayField::RuntimeDeps,
        ArrayField::BuildDeps,
        ArrayField::CheckDeps,
    ];

    pub fn from_identifier(ident: &str) -> Option<Self> {
        match ident {
            "arch" => Some(ArrayField::Architectures),
            "depends" => Some(ArrayField::RuntimeDeps),
            "makedepends" => Some(ArrayField::BuildDeps),
            "checkdepends" => Some(ArrayField::CheckDeps),
            _ => None,
        }
    }

    pub fn identifier(self) -> &'static str {
        match self {
            ArrayField::Architectures => "arch",
            ArrayField::RuntimeDeps => "depends",
            ArrayField::BuildDeps => "makedepends",
            ArrayField::CheckDeps => "checkdepends",
        }
    }
}

impl fmt::Display for ArrayField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

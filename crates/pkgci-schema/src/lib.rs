//! Non-executing PKGBUILD parser for pkgci.
//!
//! A PKGBUILD is a bash script, but running it to learn a package's name or
//! dependencies would run arbitrary code. This crate reads the file as text
//! instead, understanding only literal scalar and array assignments to a fixed
//! set of identifiers (`pkgname`, `pkgver`, `pkgrel`, `arch`, `depends`,
//! `makedepends`, `checkdepends`), and produces a validated [`PackageManifest`].

pub mod accumulate;
pub mod classify;
pub mod manifest;
pub mod normalize;
pub mod observer;
pub mod parser;
pub mod types;

pub use accumulate::{tokenize, ArrayAccumulator};
pub use classify::{classify, strip_quotes, Assignment};
pub use manifest::{
    parse_manifest_file, parse_manifest_file_observed, parse_manifest_str,
    parse_manifest_str_observed, read_manifest, ManifestError, PackageManifest,
    MAX_MANIFEST_BYTES,
};
pub use normalize::normalize_line;
pub use observer::{NoopObserver, ParseObserver, TracingObserver};
pub use parser::ManifestParser;
pub use types::{ArrayField, ScalarField};

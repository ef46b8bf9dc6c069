#![doc(hidden)]
//! Readers for tally documents and the parsers behind them

// internal modules
use crate::error::Result;
use crate::registry::Registry;
use crate::tally::Tallies;

// standard library
use std::path::Path;

// files under the readers module
pub mod parsers;
mod tallies_file;

#[doc(inline)]
pub use crate::readers::tallies_file::TalliesReader;

/// Read every mesh and tally in a tally document
///
/// Returns a result containing the [Tallies] described by the file at `path`,
/// with all ids reserved in `registry`.
///
/// - `path` - Path to the document, can be [&str], [String], [Path], etc...
/// - `registry` - Id registry shared with any objects created afterwards
///
/// Example
/// ```ignore
/// let registry = Registry::new();
/// let tallies: Tallies = meshtally::read_tallies("path/to/tallies.xml", &registry)?;
/// ```
pub fn read_tallies<P: AsRef<Path>>(path: P, registry: &Registry) -> Result<Tallies> {
    TalliesReader::new().parse(path.as_ref(), registry)
}

// internal modules
use crate::error::{Error, Result};
use crate::readers::parsers;
use crate::registry::Registry;
use crate::tally::Tallies;
use crate::utils::f;

// standard library
use std::path::Path;

// external crates
use log::{debug, trace};

/// Reader for tally documents
///
/// The document is parsed into an element tree first, and only then turned
/// into meshes and tallies. Ids found in the document are reserved in the
/// registry passed to [TalliesReader::parse].
///
/// Example:
/// ```rust
/// # use meshtally::{Registry, readers::TalliesReader};
/// let text = "<tallies><tally id=\"4\"><scores>flux</scores></tally></tallies>";
///
/// let registry = Registry::new();
/// let tallies = TalliesReader::new().parse_str(text, &registry).unwrap();
/// assert_eq!(tallies[0].id(), 4);
/// assert!(registry.tallies.contains(4));
/// ```
#[derive(Debug)]
pub struct TalliesReader {
    /// Skip a leading UTF-8 byte order mark
    strip_bom: bool,
}

impl Default for TalliesReader {
    fn default() -> Self {
        Self { strip_bom: true }
    }
}

impl TalliesReader {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Keep a leading byte order mark, which is then a parse error
    pub fn keep_bom(&mut self) {
        self.strip_bom = false;
    }

    /// Read and convert the document at `path`
    pub fn parse(&self, path: &Path, registry: &Registry) -> Result<Tallies> {
        debug!("Reading tallies from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        self.parse_str(&text, registry)
    }

    /// Convert a document held in memory
    pub fn parse_str(&self, text: &str, registry: &Registry) -> Result<Tallies> {
        let text = match self.strip_bom {
            true => text.trim_start_matches('\u{feff}'),
            false => text,
        };

        let (rest, root) = parsers::document(text).map_err(|e| malformed(text, e))?;
        if !rest.is_empty() {
            return Err(Error::Parse(f!(
                "Unexpected content after the root element on line {}",
                line_of(text, rest)
            )));
        }
        trace!("Parsed <{}> with {} children", root.name, root.children.len());

        Tallies::from_element(&root, registry)
    }
}

/// Turn a nom failure into a parse error with a line number
fn malformed(text: &str, error: nom::Err<nom::error::Error<&str>>) -> Error {
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            Error::Parse(f!("Malformed XML on line {}", line_of(text, e.input)))
        }
        nom::Err::Incomplete(_) => Error::Parse("Unexpected end of document".into()),
    }
}

/// 1-based line on which the `rest` slice of `text` starts
fn line_of(text: &str, rest: &str) -> usize {
    let offset = text.len().saturating_sub(rest.len());
    text[..offset].matches('\n').count() + 1
}

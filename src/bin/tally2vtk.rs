//! Command line preview of tally meshes as vtk grids
//!
//! Reads a tally document and writes the mesh of every tally with a mesh
//! filter to a visual toolkit file, so the binning can be checked against the
//! model geometry before anything is run.
//!
//! # Usage
//!
//! ```text
//! Usage: tally2vtk <tallies> [ids...] [options]
//! ```
//!
//! Help is printed with the `-h` flag, and `--help` will show examples, default
//! values, examples, and any important behaviour.
//!
//! ## Tally options
//!
//! By default every tally with a mesh filter is converted
//!
//! ### > How to choose tallies
//!
//! Any number of tally ids may follow the document path.
//!
//! ```bash
//! # Only convert tallies 1 and 4
//! tally2vtk tallies.xml 1 4
//! ```
//!
//! ### > How to inspect a document
//!
//! A JSON summary of the selected tallies is printed to stdout with
//! `--summary`. Logging goes to stderr so the two never mix.
//!
//! ```bash
//! tally2vtk tallies.xml --summary > summary.json
//! ```
//!
//! ## Vtk options
//!
//! ### > How to change the output file names
//!
//! Files are named `tally_<id>.<ext>` by default. The prefix may be changed
//! with `--output`.
//!
//! ```bash
//! # Change the output names to `preview_<id>.vts` etc...
//! tally2vtk tallies.xml --output preview
//! ```
//!
//! ### > How to choose a Vtk format
//!
//! XML formats are written by default, with the extension matching the grid
//! type (`.vts`, `.vtr`, or `.vtu`). Legacy formats always use `.vtk`.
//!
//! ```bash
//! # Output as a binary vtk with legacy formatting
//! tally2vtk tallies.xml --format legacy-binary
//! ```

// standard library
use std::path::Path;

// crate modules
use meshtally::mesh::{Geometry, Mesh};
use meshtally::tally::{Estimator, Tally};
use meshtally::utils::*;
use meshtally::vtk::{extension, voxels_to_vtk, write_vtk, VtkFormat};
use meshtally::{ErrorKind, Registry, Tallies};

// external crates
use anyhow::{Context, Result};
use clap::{arg, Parser, ValueEnum};
use log::*;
use serde::Serialize;
use vtkio::model::ByteOrder;

#[doc(hidden)]
fn main() -> Result<()> {
    // set up the command line interface and match arguments
    let cli: Cli = Cli::parse();

    // set up logging (+2 to make Info the default)
    let verbosity = cli.verbose as usize + 2;
    logging_init(verbosity, cli.quiet);

    // Read the full document, ids are only unique within it
    info!("Reading {}", &cli.tallies);
    let registry = Registry::new();
    let tallies = Tallies::from_xml(Some(&cli.tallies), &registry)
        .with_context(|| f!("Unable to read tallies from \"{}\"", cli.tallies))?;

    let selected = select_tallies(&tallies, &cli.ids);
    debug!("Selected {} of {} tallies", selected.len(), tallies.len());

    if cli.summary {
        let summary: Vec<TallySummary> = selected.iter().map(|t| TallySummary::new(t)).collect();
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    for tally in selected {
        try_write_preview(tally, &cli)?;
    }

    Ok(())
}

#[allow(rustdoc::invalid_rust_codeblocks)]
/// Preview the meshes of a tally document as visual toolkit grids
///
/// Examples
/// --------
///
///  Typical use:
///     $ tally2vtk tallies.xml
///
///  Convert only tallies 1 and 4:
///     $ tally2vtk tallies.xml 1 4
///
///  Print a JSON summary of every tally:
///     $ tally2vtk tallies.xml --summary
///
///  Output legacy in ascii format with a custom name:
///     $ tally2vtk tallies.xml           \
///               --format legacy-ascii   \
///               --output preview
///
/// Notes
/// -----
///
/// Only the first mesh filter of a tally is used. Tallies without a mesh
/// filter are skipped, as are spherical meshes which have no grid mapping.
///
/// A cylindrical mesh covering the full 2pi with at least 3 phi bins is
/// written as an unstructured grid so that the points on the phi = 0 plane
/// are not repeated.
#[doc(hidden)]
#[derive(Parser)]
#[command(
    verbatim_doc_comment,
    arg_required_else_help(true),
    before_help(banner()),
    after_help("Typical use: tally2vtk tallies.xml 1 4 -o preview \n\nNOTE: --help shows more detail and examples"),
    term_width(70),
    hide_possible_values(true),
    override_usage("tally2vtk <tallies> [ids...] [options]")
)]
struct Cli {
    // * Positional
    /// Path to input tally document
    #[arg(name = "tallies")]
    tallies: String,

    /// Tally identifiers to convert
    ///
    /// Defaults to every tally in the document.
    #[arg(name = "ids")]
    ids: Vec<u32>,

    // * Optional
    /// Print a JSON summary of the selected tallies
    #[arg(help_heading("Tally options"))]
    #[arg(short, long)]
    summary: bool,

    /// Prefix of output files (excl. extension)
    ///
    /// Defaults to `tally`, and will automatically append the tally id
    /// and correct extension.
    #[arg(help_heading("Vtk options"))]
    #[arg(short, long)]
    #[arg(value_name = "path")]
    output: Option<String>,

    /// VTK output format
    ///
    /// Available visual toolkit file formats:
    ///     > xml (default)
    ///     > legacy-ascii
    ///     > legacy-binary
    #[arg(help_heading("Vtk options"))]
    #[arg(short, long, value_enum)]
    #[arg(hide_default_value(true))]
    #[arg(default_value_t = VtkFormat::Xml)]
    #[arg(verbatim_doc_comment)]
    #[arg(value_name = "format")]
    format: VtkFormat,

    /// Byte ordering
    ///
    /// Visit only reads big endian, most sytems are little endian.
    /// Defaults to big endian for convenience over performance.
    ///     > big-endian (default)
    ///     > little-endian
    #[arg(help_heading("Vtk options"))]
    #[arg(long, value_enum)]
    #[arg(hide_default_value(true))]
    #[arg(default_value_t = CliByteOrder::BigEndian)]
    #[arg(verbatim_doc_comment)]
    #[arg(value_name = "endian")]
    endian: CliByteOrder,

    // * Flags
    /// Verbose logging (-v, -vv)
    ///
    /// If specified, the default log level of INFO is increased to DEBUG (-v)
    /// or TRACE (-vv). Errors and Warnings are always logged unless in quiet
    /// (-q) mode.
    #[arg(short, long)]
    #[arg(action = clap::ArgAction::Count)]
    verbose: u8,

    /// Supress all log output (overrules --verbose)
    #[arg(short, long)]
    quiet: bool,
}

// Wrapper for byte order used by vtkio
#[doc(hidden)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CliByteOrder {
    BigEndian,
    LittleEndian,
}

/// Serialisable overview of a single tally
#[doc(hidden)]
#[derive(Debug, Serialize)]
struct TallySummary<'a> {
    id: u32,
    name: Option<&'a str>,
    estimator: Option<Estimator>,
    filters: Vec<&'static str>,
    mesh: Option<MeshSummary>,
    nuclides: &'a [String],
    scores: &'a [String],
    triggers: usize,
}

#[doc(hidden)]
#[derive(Debug, Serialize)]
struct MeshSummary {
    id: u32,
    geometry: Geometry,
    shape: [usize; 3],
    voxels: usize,
}

impl<'a> TallySummary<'a> {
    fn new(tally: &'a Tally) -> Self {
        Self {
            id: tally.id(),
            name: tally.name(),
            estimator: tally.estimator(),
            filters: tally.filters().iter().map(|f| f.type_name()).collect(),
            mesh: tally.find_mesh_filter().ok().map(|m| MeshSummary::new(m)),
            nuclides: tally.nuclides(),
            scores: tally.scores(),
            triggers: tally.triggers().len(),
        }
    }
}

impl MeshSummary {
    fn new(mesh: &Mesh) -> Self {
        Self {
            id: mesh.id(),
            geometry: mesh.geometry(),
            shape: mesh.shape(),
            voxels: mesh.n_voxels(),
        }
    }
}

#[doc(hidden)]
fn banner() -> String {
    let mut s = f!("{:-<1$}\n", "", 70);
    s += &f!("{:^70}\n", "Meshtally :: TallyToVtk");
    s += &f!("{:-<1$}", "", 70);
    s
}

#[doc(hidden)]
fn logging_init(verbosity: usize, quiet: bool) {
    stderrlog::new()
        .modules(vec![
            module_path!(),
            "meshtally::readers",
            "meshtally::tally",
            "meshtally::vtk",
        ])
        .quiet(quiet)
        .verbosity(verbosity)
        .show_level(false)
        .color(stderrlog::ColorChoice::Never)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .unwrap();
}

#[doc(hidden)]
/// Tallies matching the requested ids, or all of them
fn select_tallies<'a>(tallies: &'a Tallies, ids: &[u32]) -> Vec<&'a Tally> {
    if ids.is_empty() {
        return tallies.iter().collect();
    }

    ids.iter()
        .filter_map(|id| {
            let tally = tallies.get_by_id(*id);
            if tally.is_none() {
                warn!("Warning: Tally {id} not found in the document");
            }
            tally
        })
        .collect()
}

#[doc(hidden)]
/// Geometry-only grid for the first mesh filter of a tally
fn try_write_preview(tally: &Tally, cli: &Cli) -> Result<()> {
    let mesh = match tally.find_mesh_filter() {
        Ok(mesh) => mesh,
        Err(_) => {
            info!("Skipping tally {}, no mesh filter", tally.id());
            return Ok(());
        }
    };

    let mut vtk = match voxels_to_vtk(mesh, None, None) {
        Ok(vtk) => vtk,
        Err(e) if e.kind() == ErrorKind::Value => {
            warn!("Warning: Skipping tally {}, {e}", tally.id());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    vtk.byte_order = match cli.endian {
        CliByteOrder::LittleEndian => ByteOrder::LittleEndian,
        CliByteOrder::BigEndian => ByteOrder::BigEndian,
    };

    let prefix = cli.output.as_deref().unwrap_or("tally");
    let path = f!("{prefix}_{}.{}", tally.id(), extension(&vtk, cli.format));

    info!("Writing {} mesh {} to {path}", mesh.geometry(), mesh.id());
    write_vtk(vtk, Path::new(&path), cli.format)
        .with_context(|| f!("Unable to write \"{path}\""))?;

    Ok(())
}

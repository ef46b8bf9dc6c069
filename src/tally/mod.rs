//! Tally configuration
//!
//! # Overview
//!
//! A [Tally] aggregates an ordered list of [Filter]s, nuclides, scores, an
//! optional [TallyDerivative] and any number of [Trigger]s. Tallies are
//! collected in [Tallies], which reads and writes the tally documents.
//!
//! ```rust
//! use meshtally::Registry;
//! use meshtally::mesh::RegularMesh;
//! use meshtally::tally::*;
//!
//! let registry = Registry::new();
//! let mesh = RegularMesh::new(&registry, [-10.0; 3], [10.0; 3], [5, 5, 5]).unwrap();
//!
//! let mut tally = Tally::new(&registry);
//! tally.add_filter(MeshFilter::new(mesh));
//! tally.set_nuclides(vec!["U235".into(), "Li6".into()]).unwrap();
//! tally.set_scores(vec!["total".into(), "fission".into()]).unwrap();
//! tally.set_derivative(
//!     TallyDerivative::new(DerivativeVariable::NuclideDensity, 1, Some("Li6".into())).unwrap(),
//! );
//!
//! let mut trigger = Trigger::new(TriggerType::RelErr, 0.025).unwrap();
//! trigger.set_scores(vec!["total".into()]);
//! tally.add_trigger(trigger).unwrap();
//!
//! let tallies = Tallies::from_vec(vec![tally]).unwrap();
//! assert!(tallies.to_xml_string().unwrap().contains("<scores>total fission</scores>"));
//! ```

// Split into subfiles for development, but anything important is re-exported
mod collection;
mod core;
mod derivative;
mod filter;
mod trigger;

#[doc(inline)]
pub use crate::tally::core::{Estimator, Tally, TallyResults};

#[doc(inline)]
pub use crate::tally::collection::{Tallies, DEFAULT_PATH};

#[doc(inline)]
pub use crate::tally::filter::{CellFilter, EnergyFilter, Filter, MaterialFilter, MeshFilter};

#[doc(inline)]
pub use crate::tally::derivative::{DerivativeVariable, TallyDerivative};

#[doc(inline)]
pub use crate::tally::trigger::{Trigger, TriggerType};

// standard library
use std::path::Path;
use std::sync::Arc;

// internal modules
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::registry::Registry;
use crate::tally::{Filter, TallyDerivative, Trigger};
use crate::utils::*;
use crate::vtk::{voxels_to_vtk, write_vtk, VtkFormat};
use crate::xml::Element;

// external crates
use itertools::Itertools;
use log::{debug, trace};
use serde::Serialize;

/// Estimator used to score a tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Estimator {
    Analog,
    Tracklength,
    Collision,
}

impl Estimator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analog => "analog",
            Self::Tracklength => "tracklength",
            Self::Collision => "collision",
        }
    }
}

impl std::str::FromStr for Estimator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "analog" => Ok(Self::Analog),
            "tracklength" => Ok(Self::Tracklength),
            "collision" => Ok(Self::Collision),
            _ => Err(Error::Parse(f!("Unknown estimator \"{s}\""))),
        }
    }
}

impl std::fmt::Display for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-voxel results computed by the transport engine
///
/// Both arrays are optional and independent, and are never written to tally
/// documents. Values are in global voxel order (see [Mesh]).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TallyResults {
    pub mean: Option<Vec<f64>>,
    pub std_dev: Option<Vec<f64>>,
}

/// Configured accumulator over filters, nuclides and scores
///
/// Tallies are created empty and configured through the setters. Nuclide and
/// score lists keep their insertion order, and names are written to documents
/// as space separated lists, so they may not contain whitespace.
///
/// ```rust
/// use meshtally::{Registry, tally::{Tally, Trigger, TriggerType}};
///
/// let registry = Registry::new();
/// let mut tally = Tally::new(&registry);
/// tally.set_scores(vec!["total".into(), "fission".into()]).unwrap();
///
/// // triggers may only refer to scores of the tally
/// let mut trigger = Trigger::new(TriggerType::RelErr, 0.05).unwrap();
/// trigger.set_scores(vec!["heating".into()]);
/// assert!(tally.add_trigger(trigger).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    id: u32,
    name: Option<String>,
    estimator: Option<Estimator>,
    filters: Vec<Filter>,
    nuclides: Vec<String>,
    scores: Vec<String>,
    derivative: Option<TallyDerivative>,
    triggers: Vec<Trigger>,
    results: TallyResults,
}

/// Construction and identity
impl Tally {
    /// Empty tally with the next free id
    pub fn new(registry: &Registry) -> Self {
        Self::empty(registry.tallies.next_id())
    }

    /// Empty tally with an explicit id
    pub fn with_id(registry: &Registry, id: u32) -> Self {
        registry.tallies.reserve(id);
        Self::empty(id)
    }

    fn empty(id: u32) -> Self {
        Self {
            id,
            name: None,
            estimator: None,
            filters: Vec::new(),
            nuclides: Vec::new(),
            scores: Vec::new(),
            derivative: None,
            triggers: Vec::new(),
            results: TallyResults::default(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Attribute access and mutation
impl Tally {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    pub fn estimator(&self) -> Option<Estimator> {
        self.estimator
    }

    pub fn set_estimator(&mut self, estimator: Estimator) {
        self.estimator = Some(estimator);
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Append a filter, more than one mesh filter is structurally allowed
    pub fn add_filter(&mut self, filter: impl Into<Filter>) {
        self.filters.push(filter.into());
    }

    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        self.filters = filters;
    }

    pub fn nuclides(&self) -> &[String] {
        &self.nuclides
    }

    /// Replace the nuclides, `total` being the usual sentinel
    pub fn set_nuclides(&mut self, nuclides: Vec<String>) -> Result<()> {
        check_names("nuclide", &nuclides)?;
        self.nuclides = nuclides;
        Ok(())
    }

    pub fn scores(&self) -> &[String] {
        &self.scores
    }

    /// Replace the scores
    ///
    /// Triggers are not re-checked here, so scores can be replaced before the
    /// triggers are. [validate()](Tally::validate) catches anything left
    /// inconsistent before export.
    pub fn set_scores(&mut self, scores: Vec<String>) -> Result<()> {
        check_names("score", &scores)?;
        self.scores = scores;
        Ok(())
    }

    pub fn derivative(&self) -> Option<&TallyDerivative> {
        self.derivative.as_ref()
    }

    /// Attach a derivative, replacing any previous one
    pub fn set_derivative(&mut self, derivative: TallyDerivative) {
        self.derivative = Some(derivative);
    }

    pub fn clear_derivative(&mut self) {
        self.derivative = None;
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Append a trigger whose scores are all scores of this tally
    pub fn add_trigger(&mut self, trigger: Trigger) -> Result<()> {
        self.check_trigger(&trigger)?;
        self.triggers.push(trigger);
        Ok(())
    }

    /// Replace every trigger, all or nothing
    pub fn set_triggers(&mut self, triggers: Vec<Trigger>) -> Result<()> {
        for trigger in &triggers {
            self.check_trigger(trigger)?;
        }
        self.triggers = triggers;
        Ok(())
    }

    pub fn results(&self) -> &TallyResults {
        &self.results
    }

    /// Hand over results computed externally for export
    pub fn set_results(&mut self, mean: Option<Vec<f64>>, std_dev: Option<Vec<f64>>) {
        self.results = TallyResults { mean, std_dev };
    }
}

/// Validation and mesh lookups
impl Tally {
    /// Cross-check every attribute, run again before anything is exported
    pub fn validate(&self) -> Result<()> {
        check_names("nuclide", &self.nuclides)?;
        check_names("score", &self.scores)?;
        for trigger in &self.triggers {
            self.check_trigger(trigger)?;
        }
        Ok(())
    }

    fn check_trigger(&self, trigger: &Trigger) -> Result<()> {
        if let Some(missing) = trigger.scores().iter().find(|s| !self.scores.contains(s)) {
            return Err(Error::Validation(f!(
                "Trigger score \"{missing}\" is not one of the scores of tally {} ({})",
                self.id,
                self.scores.iter().join(", ")
            )));
        }
        Ok(())
    }

    /// Mesh of the first mesh filter, in filter order
    pub fn find_mesh_filter(&self) -> Result<&Arc<Mesh>> {
        self.filters
            .iter()
            .find_map(|filter| match filter {
                Filter::Mesh(f) => Some(f.mesh()),
                _ => None,
            })
            .ok_or(Error::MissingMeshFilter)
    }

    /// Write the tally mesh and any attached results to a VTK file
    ///
    /// The grid is built completely before the file is created, so a tally
    /// without a usable mesh never leaves a file behind. Files ending in
    /// `.vtr`, `.vts` or `.vtu` are written as XML, anything else as a legacy
    /// ASCII file.
    pub fn write_to_vtk<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mesh = self.find_mesh_filter()?;
        debug!("Tally {} uses mesh {} for VTK output", self.id, mesh.id());

        let vtk = voxels_to_vtk(
            mesh,
            self.results.mean.as_deref(),
            self.results.std_dev.as_deref(),
        )?;

        let format = VtkFormat::from_path(path);
        trace!("Writing {} as {:?}", path.display(), format);
        write_vtk(vtk, path, format)
    }
}

/// Conversion to and from `<tally>` elements
impl Tally {
    pub fn to_element(&self) -> Element {
        let mut element = Element::new("tally").with_attribute("id", self.id);

        if let Some(name) = &self.name {
            element = element.with_attribute("name", name);
        }
        if let Some(estimator) = self.estimator {
            element = element.with_attribute("estimator", estimator);
        }

        if !self.filters.is_empty() {
            let filters = self
                .filters
                .iter()
                .fold(Element::new("filters"), |e, f| e.with_child(f.to_element()));
            element = element.with_child(filters);
        }
        if !self.nuclides.is_empty() {
            element = element.with_text_child("nuclides", self.nuclides.iter().join(" "));
        }
        if !self.scores.is_empty() {
            element = element.with_text_child("scores", self.scores.iter().join(" "));
        }
        if let Some(derivative) = &self.derivative {
            element = element.with_child(derivative.to_element());
        }
        for trigger in &self.triggers {
            element = element.with_child(trigger.to_element());
        }
        element
    }

    /// Rebuild a tally, resolving mesh filters against the loaded meshes
    pub fn from_element(
        element: &Element,
        registry: &Registry,
        meshes: &std::collections::BTreeMap<u32, Arc<Mesh>>,
    ) -> Result<Self> {
        let id: u32 = element.parse_required_attribute("id")?;
        let mut tally = Self::with_id(registry, id);
        let invalid = |e: Error| Error::Parse(f!("Invalid <tally> {id}: {e}"));

        if let Some(name) = element.attribute("name") {
            tally.set_name(name);
        }
        if let Some(estimator) = element.attribute("estimator") {
            tally.set_estimator(estimator.parse()?);
        }

        if let Some(filters) = element.child("filters") {
            tally.filters = filters
                .children_named("filter")
                .map(|f| Filter::from_element(f, meshes))
                .collect::<Result<Vec<Filter>>>()?;
        }
        if let Some(nuclides) = element.child("nuclides") {
            tally.set_nuclides(nuclides.words()).map_err(invalid)?;
        }
        if let Some(scores) = element.child("scores") {
            tally.set_scores(scores.words()).map_err(invalid)?;
        }
        if let Some(derivative) = element.child("derivative") {
            tally.set_derivative(TallyDerivative::from_element(derivative)?);
        }

        let triggers = element
            .children_named("trigger")
            .map(Trigger::from_element)
            .collect::<Result<Vec<Trigger>>>()?;
        tally.set_triggers(triggers).map_err(invalid)?;

        Ok(tally)
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = f!("Tally {}", self.id);
        if let Some(name) = &self.name {
            s += &f!(" ({name})");
        }
        s += &f!(
            "\n  filters:  {}",
            self.filters.iter().map(|f| f.type_name()).join(", ")
        );
        s += &f!("\n  nuclides: {}", self.nuclides.iter().join(" "));
        s += &f!("\n  scores:   {}", self.scores.iter().join(" "));
        if let Some(d) = &self.derivative {
            s += &f!("\n  derivative: d/d({}) in material {}", d.variable(), d.material());
        }
        for trigger in &self.triggers {
            s += &f!(
                "\n  trigger:  {} < {}",
                trigger.trigger_type(),
                trigger.threshold().sci(5, 2)
            );
        }
        write!(f, "{s}")
    }
}

/// Names must be non-empty, whitespace free and unique
fn check_names(kind: &str, names: &[String]) -> Result<()> {
    if let Some(bad) = names
        .iter()
        .find(|n| n.is_empty() || n.chars().any(char::is_whitespace))
    {
        return Err(Error::Validation(f!(
            "Invalid {kind} name \"{bad}\", names may not be empty or contain whitespace"
        )));
    }

    if let Some(duplicate) = names.iter().duplicates().next() {
        return Err(Error::Validation(f!("Duplicate {kind} \"{duplicate}\"")));
    }
    Ok(())
}

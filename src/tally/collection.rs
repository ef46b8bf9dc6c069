// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

// internal modules
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::readers::TalliesReader;
use crate::registry::Registry;
use crate::tally::{Filter, Tally};
use crate::utils::f;
use crate::xml::Element;

// external crates
use log::{debug, trace};

/// Default file name for tally documents
pub const DEFAULT_PATH: &str = "tallies.xml";

/// Ordered collection of tallies with unique ids
///
/// Owns serialisation to and from tally documents. Exporting and importing
/// again gives back tallies equal to the originals, and exporting that result
/// reproduces the first file byte for byte.
///
/// ```rust
/// use meshtally::{Registry, tally::{Tallies, Tally}};
///
/// let registry = Registry::new();
/// let mut tally = Tally::new(&registry);
/// tally.set_scores(vec!["flux".into()]).unwrap();
///
/// let tallies = Tallies::from_vec(vec![tally]).unwrap();
/// let text = tallies.to_xml_string().unwrap();
///
/// let reloaded = Tallies::from_xml_str(&text, &Registry::new()).unwrap();
/// assert_eq!(reloaded[0].scores(), tallies[0].scores());
/// assert_eq!(reloaded.to_xml_string().unwrap(), text);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tallies {
    tallies: Vec<Tally>,
}

/// Collection management
impl Tallies {
    pub fn new() -> Self {
        Default::default()
    }

    /// Collect tallies, failing on the first duplicate id
    pub fn from_vec(tallies: Vec<Tally>) -> Result<Self> {
        let mut collection = Self::new();
        for tally in tallies {
            collection.push(tally)?;
        }
        Ok(collection)
    }

    /// Append a tally, ids must be unique within the collection
    pub fn push(&mut self, tally: Tally) -> Result<()> {
        if self.get_by_id(tally.id()).is_some() {
            return Err(Error::Validation(f!(
                "A tally with id {} is already in the collection",
                tally.id()
            )));
        }
        self.tallies.push(tally);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tally> {
        self.tallies.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tally> {
        self.tallies.get_mut(index)
    }

    pub fn get_by_id(&self, id: u32) -> Option<&Tally> {
        self.tallies.iter().find(|t| t.id() == id)
    }

    /// Take a tally out of the collection
    pub fn remove_by_id(&mut self, id: u32) -> Option<Tally> {
        let position = self.tallies.iter().position(|t| t.id() == id)?;
        Some(self.tallies.remove(position))
    }

    /// Take a tally out of the collection and hand its id back
    ///
    /// Use this when the tally is discarded, so the id can be taken again
    /// without a duplicate warning. Mesh ids are left alone as meshes may
    /// still be shared with other tallies.
    pub fn release_by_id(&mut self, id: u32, registry: &Registry) -> Option<Tally> {
        let tally = self.remove_by_id(id)?;
        registry.tallies.release(id);
        Some(tally)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tally> {
        self.tallies.iter()
    }

    /// Distinct meshes used by mesh filters, in order of first reference
    ///
    /// Two different meshes sharing an id cannot be told apart once written,
    /// so this is an error.
    pub fn meshes(&self) -> Result<Vec<Arc<Mesh>>> {
        let mut meshes: Vec<Arc<Mesh>> = Vec::new();

        let mesh_filters = self.tallies.iter().flat_map(|t| t.filters()).filter_map(|f| match f {
            Filter::Mesh(f) => Some(f.mesh()),
            _ => None,
        });

        for mesh in mesh_filters {
            match meshes.iter().find(|m| m.id() == mesh.id()) {
                Some(existing) if existing != mesh => {
                    return Err(Error::Validation(f!(
                        "Different meshes share the id {}",
                        mesh.id()
                    )))
                }
                Some(_) => (),
                None => meshes.push(mesh.clone()),
            }
        }
        Ok(meshes)
    }
}

/// Tally documents
impl Tallies {
    /// Validate everything and build the `<tallies>` root element
    pub fn to_element(&self) -> Result<Element> {
        for tally in &self.tallies {
            tally.validate()?;
        }

        let mut root = Element::new("tallies");
        for mesh in self.meshes()? {
            root = root.with_child(mesh.to_element());
        }
        for tally in &self.tallies {
            root = root.with_child(tally.to_element());
        }
        Ok(root)
    }

    /// Full document as a string
    pub fn to_xml_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.to_element()?.write_document(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| Error::Parse(f!("Document is not UTF-8: {e}")))
    }

    /// Write the document to `path`, [DEFAULT_PATH] if not given
    ///
    /// Nothing is created or truncated unless every tally validates.
    pub fn export_to_xml<P: AsRef<Path>>(&self, path: Option<P>) -> Result<()> {
        let root = self.to_element()?;

        let path = path
            .as_ref()
            .map(|p| p.as_ref())
            .unwrap_or(Path::new(DEFAULT_PATH));
        debug!("Writing {} tallies to {}", self.len(), path.display());

        let mut writer = BufWriter::new(File::create(path)?);
        root.write_document(&mut writer)?;
        writer.flush()?;
        trace!("Finished writing {}", path.display());
        Ok(())
    }

    /// Read a document from `path`, [DEFAULT_PATH] if not given
    ///
    /// Ids are taken from the document and reserved in `registry`.
    pub fn from_xml<P: AsRef<Path>>(path: Option<P>, registry: &Registry) -> Result<Self> {
        let path = path
            .as_ref()
            .map(|p| p.as_ref())
            .unwrap_or(Path::new(DEFAULT_PATH));
        TalliesReader::new().parse(path, registry)
    }

    /// Read a document held in memory
    pub fn from_xml_str(text: &str, registry: &Registry) -> Result<Self> {
        TalliesReader::new().parse_str(text, registry)
    }

    /// Rebuild the collection from a `<tallies>` root element
    pub fn from_element(root: &Element, registry: &Registry) -> Result<Self> {
        if root.name != "tallies" {
            return Err(Error::Parse(f!(
                "Expected a <tallies> root element, found <{}>",
                root.name
            )));
        }

        let mut meshes: BTreeMap<u32, Arc<Mesh>> = BTreeMap::new();
        for element in root.children_named("mesh") {
            let mesh = Mesh::from_element(element, registry)
                .map_err(|e| Error::Parse(f!("Invalid <mesh>: {e}")))?;
            let id = mesh.id();
            trace!("Loaded mesh {id} ({})", mesh.geometry());
            if meshes.insert(id, Arc::new(mesh)).is_some() {
                return Err(Error::Parse(f!("Mesh id {id} is defined twice")));
            }
        }

        let mut collection = Self::new();
        for element in root.children_named("tally") {
            let tally = Tally::from_element(element, registry, &meshes)?;
            let id = tally.id();
            collection
                .push(tally)
                .map_err(|_| Error::Parse(f!("Tally id {id} is defined twice")))?;
        }

        debug!(
            "Loaded {} tallies and {} meshes",
            collection.len(),
            meshes.len()
        );
        Ok(collection)
    }
}

impl std::ops::Index<usize> for Tallies {
    type Output = Tally;

    fn index(&self, index: usize) -> &Tally {
        &self.tallies[index]
    }
}

impl IntoIterator for Tallies {
    type Item = Tally;
    type IntoIter = std::vec::IntoIter<Tally>;

    fn into_iter(self) -> Self::IntoIter {
        self.tallies.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tallies {
    type Item = &'a Tally;
    type IntoIter = std::slice::Iter<'a, Tally>;

    fn into_iter(self) -> Self::IntoIter {
        self.tallies.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::RegularMesh;
    use crate::tally::MeshFilter;

    #[test]
    fn duplicate_ids_rejected() {
        let registry = Registry::new();
        let a = Tally::with_id(&registry, 3);
        let b = Tally::with_id(&registry, 3);
        assert!(Tallies::from_vec(vec![a, b]).is_err());
    }

    #[test]
    fn shared_mesh_written_once() {
        let registry = Registry::new();
        let mesh: Arc<Mesh> = Arc::new(
            RegularMesh::new(&registry, [0.0; 3], [1.0; 3], [2, 2, 2])
                .unwrap()
                .into(),
        );

        let mut a = Tally::new(&registry);
        a.add_filter(MeshFilter::shared(mesh.clone()));
        let mut b = Tally::new(&registry);
        b.add_filter(MeshFilter::shared(mesh));

        let tallies = Tallies::from_vec(vec![a, b]).unwrap();
        assert_eq!(tallies.meshes().unwrap().len(), 1);
        assert_eq!(tallies.to_xml_string().unwrap().matches("<mesh ").count(), 1);
    }

    #[test]
    fn conflicting_mesh_ids() {
        let registry = Registry::new();
        let a: Mesh = RegularMesh::with_id(&registry, 1, [0.0; 3], [1.0; 3], [2, 2, 2])
            .unwrap()
            .into();
        let b: Mesh = RegularMesh::with_id(&registry, 1, [0.0; 3], [2.0; 3], [2, 2, 2])
            .unwrap()
            .into();

        let mut tally = Tally::new(&registry);
        tally.add_filter(MeshFilter::new(a));
        tally.add_filter(MeshFilter::new(b));

        let tallies = Tallies::from_vec(vec![tally]).unwrap();
        assert!(tallies.meshes().is_err());
    }

    #[test]
    fn remove_and_lookup() {
        let registry = Registry::new();
        let mut tallies =
            Tallies::from_vec(vec![Tally::new(&registry), Tally::new(&registry)]).unwrap();

        assert!(tallies.get_by_id(2).is_some());
        let removed = tallies.remove_by_id(1).unwrap();
        assert_eq!(removed.id(), 1);
        assert_eq!(tallies.len(), 1);
        assert_eq!(tallies[0].id(), 2);
    }

    #[test]
    fn released_tally_id_is_free() {
        let registry = Registry::new();
        let mut tallies =
            Tallies::from_vec(vec![Tally::new(&registry), Tally::new(&registry)]).unwrap();

        assert!(tallies.release_by_id(3, &registry).is_none());
        assert_eq!(tallies.release_by_id(1, &registry).unwrap().id(), 1);
        assert!(!registry.tallies.contains(1));
        assert!(registry.tallies.contains(2));

        // the id can be given to a replacement tally
        let replacement = Tally::with_id(&registry, 1);
        assert!(registry.tallies.contains(1));
        tallies.push(replacement).unwrap();
        assert_eq!(tallies.len(), 2);
    }

    #[test]
    fn wrong_root_element() {
        let registry = Registry::new();
        let error = Tallies::from_element(&Element::new("materials"), &registry).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Parse);
    }
}

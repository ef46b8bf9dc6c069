//! Id allocation for meshes and tallies
//!
//! Meshes and tallies carry an integer identity that must be unique for the
//! lifetime of a model. Rather than hiding the counters in global state, an
//! explicit [Registry] is handed to every constructor.
//!
//! ```rust
//! # use meshtally::Registry;
//! let registry = Registry::new();
//! assert_eq!(registry.meshes.next_id(), 1);
//! assert_eq!(registry.meshes.next_id(), 2);
//!
//! // the two kinds of object are counted independently
//! assert_eq!(registry.tallies.next_id(), 1);
//! ```

// standard library
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

// external crates
use log::{trace, warn};

/// Registries for every kind of identified object in a model
///
/// A fresh registry per model (or per test) keeps ids hermetic.
#[derive(Debug)]
pub struct Registry {
    /// Ids of every [Mesh](crate::mesh::Mesh)
    pub meshes: IdRegistry,
    /// Ids of every [Tally](crate::tally::Tally)
    pub tallies: IdRegistry,
}

impl Registry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Forget every id issued so far
    pub fn reset(&self) {
        self.meshes.reset();
        self.tallies.reset();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            meshes: IdRegistry::new("mesh"),
            tallies: IdRegistry::new("tally"),
        }
    }
}

/// Auto-incrementing id counter for one kind of object
///
/// Allocation is serialised behind a mutex so that construction from several
/// threads never hands out the same id twice.
#[derive(Debug)]
pub struct IdRegistry {
    /// Object kind, only used for log messages
    kind: &'static str,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    /// Last id handed out by [IdRegistry::next_id]
    last: u32,
    /// Every id in use, automatic or explicit
    used: BTreeSet<u32>,
}

impl IdRegistry {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            state: Mutex::new(State::default()),
        }
    }

    /// Next free id above the last one issued
    ///
    /// Explicitly reserved ids are skipped over.
    pub fn next_id(&self) -> u32 {
        let mut state = self.lock();
        let mut id = state.last + 1;
        while state.used.contains(&id) {
            id += 1;
        }
        state.last = id;
        state.used.insert(id);
        trace!("Assigned {} id {id}", self.kind);
        id
    }

    /// Mark an explicitly chosen id as used
    ///
    /// Ids are allowed to clash, as when a document is loaded twice, but this
    /// is almost always a mistake so it is logged.
    ///
    /// ```rust
    /// # use meshtally::registry::IdRegistry;
    /// let registry = IdRegistry::new("mesh");
    /// registry.reserve(1);
    /// registry.reserve(3);
    /// assert_eq!(registry.next_id(), 2);
    /// assert_eq!(registry.next_id(), 4);
    /// ```
    pub fn reserve(&self, id: u32) {
        let mut state = self.lock();
        if !state.used.insert(id) {
            warn!("Another {} instance already uses id {id}", self.kind);
        }
    }

    /// Give an id back once its object is discarded
    ///
    /// A released id can be reserved again without a warning. The counter is
    /// not rewound, so [IdRegistry::next_id] only reuses it after a reset.
    /// Returns `false` if the id was not in use.
    ///
    /// ```rust
    /// # use meshtally::registry::IdRegistry;
    /// let registry = IdRegistry::new("tally");
    /// let id = registry.next_id();
    /// assert!(registry.release(id));
    /// assert!(!registry.contains(id));
    /// ```
    pub fn release(&self, id: u32) -> bool {
        let released = self.lock().used.remove(&id);
        if released {
            trace!("Released {} id {id}", self.kind);
        }
        released
    }

    pub fn contains(&self, id: u32) -> bool {
        self.lock().used.contains(&id)
    }

    /// Forget every id and restart the counter from 1
    pub fn reset(&self) {
        let mut state = self.lock();
        state.last = 0;
        state.used.clear();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // ids stay consistent even if a holder panicked, nothing to repair
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

//! Catalog snapshots.
//!
//! A [`Catalog`] is an immutable, ordered table of [`Course`] rows with unique
//! guids. Requests read a snapshot through a [`CatalogHandle`]; reloading
//! swaps the whole snapshot so in-flight requests keep the one they started
//! with.

mod course;
mod loader;

pub use course::{Course, CourseRecord, Enrollment, TARGET_GENDER_SHARE};
pub use loader::load_catalog;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Error type for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Two rows share the same guid
    #[error("Duplicate course guid '{0}' in catalog snapshot")]
    DuplicateGuid(String),

    /// A row has an empty guid
    #[error("Course at row {0} has an empty guid")]
    EmptyGuid(usize),

    /// Snapshot file could not be read
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file could not be parsed
    #[error("Failed to parse catalog file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// An immutable catalog snapshot.
#[derive(Debug, Default)]
pub struct Catalog {
    courses: Vec<Arc<Course>>,
    index: HashMap<String, usize>,
    target_group_columns: BTreeSet<String>,
}

impl Catalog {
    /// Build a snapshot from derived courses, rejecting duplicate or empty guids.
    pub fn new(courses: Vec<Course>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(courses.len());
        let mut target_group_columns = BTreeSet::new();

        for (row, course) in courses.iter().enumerate() {
            if course.guid.trim().is_empty() {
                return Err(CatalogError::EmptyGuid(row));
            }
            if index.insert(course.guid.clone(), row).is_some() {
                return Err(CatalogError::DuplicateGuid(course.guid.clone()));
            }
            target_group_columns.extend(course.target_groups.iter().cloned());
        }

        Ok(Self {
            courses: courses.into_iter().map(Arc::new).collect(),
            index,
            target_group_columns,
        })
    }

    /// Build a snapshot from raw records.
    pub fn from_records(records: Vec<CourseRecord>) -> Result<Self, CatalogError> {
        Self::new(records.into_iter().map(Course::from_record).collect())
    }

    /// Rows in catalog order.
    pub fn courses(&self) -> &[Arc<Course>] {
        &self.courses
    }

    /// Look up a course by guid.
    pub fn get(&self, guid: &str) -> Option<&Arc<Course>> {
        self.index.get(guid).map(|&row| &self.courses[row])
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Whether any row carries the given target group column.
    pub fn has_target_group_column(&self, column: &str) -> bool {
        self.target_group_columns.contains(column)
    }

    /// All target group columns present in this snapshot.
    pub fn target_group_columns(&self) -> &BTreeSet<String> {
        &self.target_group_columns
    }
}

/// Reloadable holder for the current catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogHandle {
    current: Arc<RwLock<Arc<Catalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// The snapshot to use for one request.
    pub fn snapshot(&self) -> Arc<Catalog> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Atomically replace the snapshot, returning the previous one.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }

    /// Load a snapshot from disk and swap it in. On failure the current
    /// snapshot stays in place.
    pub fn reload_from(&self, path: impl AsRef<Path>) -> Result<Arc<Catalog>, CatalogError> {
        let catalog = load_catalog(path)?;
        tracing::info!(courses = catalog.len(), "Catalog snapshot reloaded");
        Ok(self.replace(catalog))
    }
}

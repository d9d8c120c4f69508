//! Loading catalog snapshots from JSON files.

use super::{Catalog, CatalogError, CourseRecord};
use serde::Deserialize;
use std::path::Path;

/// Accepted top-level shapes of a snapshot file.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Rows(Vec<CourseRecord>),
    Wrapped { courses: Vec<CourseRecord> },
}

/// Load a catalog snapshot from a JSON file.
///
/// The file holds either an array of course records or an object with a
/// `courses` array.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: shown.clone(),
        source,
    })?;

    let records = match serde_json::from_str::<SnapshotFile>(&raw).map_err(|source| {
        CatalogError::Parse {
            path: shown.clone(),
            source,
        }
    })? {
        SnapshotFile::Rows(rows) => rows,
        SnapshotFile::Wrapped { courses } => courses,
    };

    let catalog = Catalog::from_records(records)?;
    tracing::debug!(path = %shown, courses = catalog.len(), "Loaded catalog snapshot");
    Ok(catalog)
}

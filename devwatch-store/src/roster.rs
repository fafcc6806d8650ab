//! Device roster loading.
//!
//! The roster is a CSV file with a header row whose first column holds the
//! device id:
//!
//! ```text
//! device_id
//! 60-6b-44-84-dc-64
//! b4-45-52-a2-f1-3c
//! ```
//!
//! Rows with an empty first field are skipped. Extra columns are allowed
//! as long as every row has the same number of fields.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while loading a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The roster file could not be opened.
    #[error("failed to open roster {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The roster file is not valid CSV.
    #[error("failed to parse roster {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Read device ids from a CSV roster file.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<String>, RosterError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    read_ids(file).map_err(|source| RosterError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Read device ids from any CSV source, skipping the header row.
pub fn read_ids<R: io::Read>(reader: R) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(id) = record.get(0).filter(|id| !id.is_empty()) {
            ids.push(id.to_string());
        }
    }

    Ok(ids)
}

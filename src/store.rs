//! Persisted record set keyed by company name.
//!
//! The whole set is rewritten after every append, so the file on disk always
//! holds every record scraped so far. A crash between two detail pages loses
//! nothing but the page in flight.

use crate::StoreError;
use crate::results::{NAME_FIELD, Record, RecordSet};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Record set backed by a CSV file
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    records: RecordSet,
}

impl DedupStore {
    /// Load the record set persisted at `path`.
    ///
    /// A missing file starts an empty set. A file that is not a CSV table with
    /// a `Name` column, or that has a row with a blank name, is moved aside to
    /// `<path>.unreadable` and the crawl starts empty rather than failing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            ::log::info!("No existing file found at {}. Starting fresh.", path.display());
            return Ok(Self {
                path,
                records: RecordSet::new(),
            });
        }

        let records = match read_records(&path) {
            Ok(records) => {
                ::log::info!(
                    "Loaded {} existing records from {}",
                    records.len(),
                    path.display()
                );
                records
            }
            Err(reason) => {
                let aside = sibling_path(&path, ".unreadable");
                ::log::warn!(
                    "Could not read {} ({}). Moving it to {} and starting fresh.",
                    path.display(),
                    reason,
                    aside.display()
                );
                fs::rename(&path, &aside).map_err(|source| StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                RecordSet::new()
            }
        };

        Ok(Self { path, records })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains(name)
    }

    /// Add a record and rewrite the persisted file.
    ///
    /// Returns `Ok(false)` without touching the file when the record has no
    /// name or the name is already stored. When the rewrite fails the record
    /// is dropped again, so its name stays unknown and a later pass retries it.
    pub fn append(&mut self, record: Record) -> Result<bool, StoreError> {
        if !self.records.insert(record) {
            return Ok(false);
        }
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }
        ::log::info!(
            "Saved {} records to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(true)
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full set to a temporary sibling, then swap it into place
    fn persist(&self) -> Result<(), StoreError> {
        let tmp = sibling_path(&self.path, ".tmp");
        let csv_err = |source| StoreError::Csv {
            path: tmp.display().to_string(),
            source,
        };

        let mut writer = csv::Writer::from_path(&tmp).map_err(csv_err)?;
        writer
            .write_record(self.records.columns())
            .map_err(csv_err)?;
        for row in self.records.rows() {
            writer.write_record(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| StoreError::Io {
            path: tmp.display().to_string(),
            source,
        })?;
        drop(writer);

        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}

/// Parse the persisted table, or describe why it is unusable
fn read_records(path: &Path) -> Result<RecordSet, String> {
    let mut reader = csv::ReaderBuilder::new()
        .from_path(path)
        .map_err(|e| e.to_string())?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if !headers.iter().any(|h| h == NAME_FIELD) {
        return Err(format!("no '{}' column", NAME_FIELD));
    }

    let mut records = RecordSet::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| e.to_string())?;
        let mut record = Record::new();
        for (key, value) in headers.iter().zip(row.iter()) {
            record.set(key, value);
        }
        let name = match record.name() {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                return Err(format!(
                    "row {} has a blank '{}'",
                    index + 1,
                    NAME_FIELD
                ));
            }
        };
        if records.contains(name) {
            ::log::warn!("Ignoring duplicate stored record for {}", name);
            continue;
        }
        records.insert(record);
    }

    Ok(records)
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn company(name: &str, website: &str) -> Record {
        let mut record = Record::new();
        record.set("Website", website);
        record.set(NAME_FIELD, name);
        record
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = DedupStore::load(dir.path().join("companies.csv")).unwrap();
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_append_rewrites_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("companies.csv");

        let mut store = DedupStore::load(&path).unwrap();
        assert!(store.append(company("Acme", "https://acme.test")).unwrap());

        let mut beta = Record::named("Beta");
        beta.set("Phone", "555 0100");
        assert!(store.append(beta).unwrap());

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Name,Website,Phone\nAcme,https://acme.test,\nBeta,,555 0100\n"
        );
        assert!(!sibling_path(&path, ".tmp").exists());

        let reloaded = DedupStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("Acme"));
        assert!(reloaded.contains("Beta"));
        let beta = &reloaded.records().records()[1];
        assert_eq!(beta.get("Website"), Some(""));
        assert_eq!(beta.get("Phone"), Some("555 0100"));
    }

    #[test]
    fn test_append_skips_known_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("companies.csv");

        let mut store = DedupStore::load(&path).unwrap();
        assert!(store.append(company("Acme", "https://acme.test")).unwrap());
        assert!(!store.append(company("Acme", "https://other.test")).unwrap());

        assert_eq!(store.len(), 1);
        let reloaded = DedupStore::load(&path).unwrap();
        assert_eq!(
            reloaded.records().records()[0].get("Website"),
            Some("https://acme.test")
        );
    }

    #[test]
    fn test_unreadable_file_is_moved_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("companies.csv");
        fs::write(&path, "Company,Website\nAcme,https://acme.test\n").unwrap();

        let store = DedupStore::load(&path).unwrap();
        assert!(store.is_empty());
        assert!(!path.exists());
        assert!(sibling_path(&path, ".unreadable").exists());
    }

    #[test]
    fn test_ragged_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("companies.csv");
        fs::write(&path, "Name,Website\nAcme\n").unwrap();

        let store = DedupStore::load(&path).unwrap();
        assert!(store.is_empty());
        assert!(sibling_path(&path, ".unreadable").exists());
    }

    #[test]
    fn test_failed_rewrite_does_not_mark_name_known() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out");
        fs::create_dir(&nested).unwrap();
        let path = nested.join("companies.csv");

        let mut store = DedupStore::load(&path).unwrap();
        fs::remove_dir(&nested).unwrap();

        assert!(store.append(Record::named("Acme")).is_err());
        assert!(!store.contains("Acme"));
        assert_eq!(store.len(), 0);

        fs::create_dir(&nested).unwrap();
        assert!(store.append(Record::named("Acme")).unwrap());
        assert!(store.contains("Acme"));
    }

    #[test]
    fn test_blank_name_row_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("companies.csv");
        let original = "Name,Website
Acme,https://a.test
 ,https://b.test
";
        fs::write(&path, original).unwrap();

        let store = DedupStore::load(&path).unwrap();
        assert!(store.is_empty());
        assert!(!path.exists());
        let aside = sibling_path(&path, ".unreadable");
        assert_eq!(fs::read_to_string(aside).unwrap(), original);
    }

    #[test]
    fn test_duplicate_rows_keep_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("companies.csv");
        fs::write(&path, "Name,Website\nAcme,https://a.test\nAcme,https://b.test\n").unwrap();

        let store = DedupStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.records().records()[0].get("Website"),
            Some("https://a.test")
        );
    }
}

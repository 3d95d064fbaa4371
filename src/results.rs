use std::collections::HashSet;

/// Column holding the company name, the key used to avoid re-scraping
pub const NAME_FIELD: &str = "Name";

/// One scraped company: field name to value, in the order fields were set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record holding only its name
    pub fn named(name: &str) -> Self {
        let mut record = Self::new();
        record.set(NAME_FIELD, name);
        record
    }

    /// Set a field, replacing any previous value for the same key
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The dedup key, if set
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_FIELD)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Records in discovery order, unique by name
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<Record>,
    names: HashSet<String>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Append a record. Returns false (and keeps the set unchanged) when the
    /// record has no name or its name is already present.
    pub fn insert(&mut self, record: Record) -> bool {
        let name = match record.name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return false,
        };
        if !self.names.insert(name) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Remove and return the most recently inserted record
    pub fn pop(&mut self) -> Option<Record> {
        let record = self.records.pop()?;
        if let Some(name) = record.name() {
            self.names.remove(name);
        }
        Some(record)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Union of keys over all records, `Name` first, then in first-seen order
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![NAME_FIELD.to_string()];
        for record in &self.records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }
        columns
    }

    /// Every record laid out against `columns()`, blanks where a key is missing
    pub fn rows(&self) -> Vec<Vec<&str>> {
        let columns = self.columns();
        self.records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).unwrap_or(""))
                    .collect()
            })
            .collect()
    }
}

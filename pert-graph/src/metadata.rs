use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

/// One metadata document attached to a perturbation identifier.
pub type Record = serde_json::Map<String, Value>;

/// Exact-match metadata lookup by perturbation identifier. Injected
/// into graph construction so the builder stays decoupled from any
/// particular document store.
pub trait MetadataStore {
    /// The first record whose key matches `label`, if any.
    fn find_by_label(&self, label: &str) -> anyhow::Result<Option<Record>>;
}

/// A metadata collection loaded from a JSON array file, indexed by one
/// string field of each document (first match wins).
pub struct JsonCollectionStore {
    docs: Vec<Record>,
    index: HashMap<Box<str>, usize>,
}

impl JsonCollectionStore {
    pub const DEFAULT_KEY_FIELD: &'static str = "pert_id";

    /// Load a collection file.
    ///
    /// * `file_path` - JSON file holding an array of flat documents
    /// * `key_field` - document field used for lookup; if `None`, `pert_id`
    ///
    pub fn open(file_path: &str, key_field: Option<&str>) -> anyhow::Result<Self> {
        let key_field = key_field.unwrap_or(Self::DEFAULT_KEY_FIELD);

        let file = File::open(file_path)?;
        let docs: Vec<Record> = serde_json::from_reader(BufReader::new(file))?;

        let mut index = HashMap::with_capacity(docs.len());
        for (i, doc) in docs.iter().enumerate() {
            if let Some(Value::String(key)) = doc.get(key_field) {
                // first match wins
                index
                    .entry(key.clone().into_boxed_str())
                    .or_insert(i);
            }
        }

        log::info!(
            "indexed {} of {} documents from {} by '{}'",
            index.len(),
            docs.len(),
            file_path,
            key_field
        );

        Ok(Self { docs, index })
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl MetadataStore for JsonCollectionStore {
    fn find_by_label(&self, label: &str) -> anyhow::Result<Option<Record>> {
        Ok(self.index.get(label).map(|&i| self.docs[i].clone()))
    }
}

/// In-memory store for programmatic use and tests.
#[derive(Default)]
pub struct StaticStore {
    records: HashMap<Box<str>, Record>,
}

impl StaticStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: &str, record: Record) {
        self.records.insert(label.into(), record);
    }

    /// A store that answers every lookup with an empty record.
    pub fn with_empty_records(labels: &[Box<str>]) -> Self {
        let mut store = Self::new();
        for label in labels {
            store.insert(label, Record::new());
        }
        store
    }
}

impl MetadataStore for StaticStore {
    fn find_by_label(&self, label: &str) -> anyhow::Result<Option<Record>> {
        Ok(self.records.get(label).cloned())
    }
}

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{IndexError, IndexResult};
use crate::{NameQuery, SearchIndex};

/// An object held by [`MemoryIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedObject {
    pub class_name: String,
    pub id: String,
    pub properties: HashMap<String, String>,
}

impl IndexedObject {
    pub fn new(class_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            id: id.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// In-memory index returning matches in insertion order.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    objects: Vec<IndexedObject>,
    failing_values: HashSet<String>,
    lookups: AtomicUsize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, object: IndexedObject) -> Self {
        self.objects.push(object);
        self
    }

    /// Shorthand for an object with a single `name` property.
    pub fn with_named(self, class_name: &str, id: &str, name: &str) -> Self {
        self.with_object(IndexedObject::new(class_name, id).with_property("name", name))
    }

    /// Makes lookups for this value fail as if the service were unreachable.
    pub fn fail_lookups_for(mut self, value: impl Into<String>) -> Self {
        self.failing_values.insert(value.into());
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn find_ids_by_name(&self, query: &NameQuery<'_>) -> IndexResult<Vec<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.failing_values.contains(query.value) {
            return Err(IndexError::Unavailable(format!(
                "lookup for '{}' failed",
                query.value
            )));
        }

        Ok(self
            .objects
            .iter()
            .filter(|object| object.class_name == query.class_name)
            .filter(|object| object.properties.get(query.field).map(String::as_str) == Some(query.value))
            .take(query.limit)
            .map(|object| object.id.clone())
            .collect())
    }
}

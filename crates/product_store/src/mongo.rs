use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::record::{Candidates, ProductRecord, RecordId};
use crate::ProductStore;

/// Where products live and which fields carry the join key and the
/// cross-reference.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionLayout {
    /// Used only when the connection string does not name a database.
    pub database: String,
    pub collection: String,
    pub name_field: String,
    pub cross_ref_field: String,
}

impl Default for CollectionLayout {
    fn default() -> Self {
        Self {
            database: "test".to_string(),
            collection: "products".to_string(),
            name_field: "name".to_string(),
            cross_ref_field: "weaviateId".to_string(),
        }
    }
}

impl CollectionLayout {
    /// `{ <cross_ref_field>: { $exists: false } }`
    pub fn missing_cross_ref_filter(&self) -> Document {
        let mut filter = Document::new();
        filter.insert(self.cross_ref_field.clone(), doc! { "$exists": false });
        filter
    }

    /// `{ $set: { <cross_ref_field>: value } }`
    pub fn set_cross_ref_update(&self, value: &str) -> Document {
        let mut fields = Document::new();
        fields.insert(self.cross_ref_field.clone(), value);
        doc! { "$set": fields }
    }

    /// Turns a raw product document into a record. Documents without an
    /// `_id` or without a string name cannot be reconciled.
    pub fn decode(&self, document: Document) -> StoreResult<ProductRecord> {
        let id = match document.get("_id") {
            Some(id) => RecordId::from(id.clone()),
            None => {
                return Err(StoreError::InvalidRecord(
                    "document has no _id".to_string(),
                ))
            }
        };
        let name = match document.get(&self.name_field) {
            Some(Bson::String(name)) => name.clone(),
            _ => {
                return Err(StoreError::InvalidRecord(format!(
                    "document {} has no string `{}` field",
                    id, self.name_field
                )))
            }
        };
        let cross_ref = match document.get(&self.cross_ref_field) {
            Some(Bson::String(value)) => Some(value.clone()),
            _ => None,
        };
        Ok(ProductRecord {
            id,
            name,
            cross_ref,
        })
    }

    /// Decodes every document, keeping the ones that fail as unreadable
    /// candidates instead of dropping them.
    pub fn decode_all(&self, documents: impl IntoIterator<Item = Document>) -> Candidates {
        let mut candidates = Candidates::default();
        for document in documents {
            match self.decode(document) {
                Ok(record) => candidates.records.push(record),
                Err(e) => candidates.unreadable.push(e),
            }
        }
        candidates
    }
}

/// Product store backed by a MongoDB collection.
pub struct MongoProductStore {
    client: Client,
    collection: Collection<Document>,
    layout: CollectionLayout,
}

impl MongoProductStore {
    /// Connects and pings the server so that a bad URI or unreachable
    /// cluster fails here rather than on the first query.
    pub async fn connect(uri: &str, layout: CollectionLayout) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(&layout.database));
        database.run_command(doc! { "ping": 1 }).await?;

        info!(
            "Connected to MongoDB database '{}', collection '{}'",
            database.name(),
            layout.collection
        );

        let collection = database.collection::<Document>(&layout.collection);
        Ok(Self {
            client,
            collection,
            layout,
        })
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn find_missing_cross_ref(&self) -> StoreResult<Candidates> {
        let filter = self.layout.missing_cross_ref_filter();
        debug!("Querying products with filter {}", filter);

        let documents: Vec<Document> = self.collection.find(filter).await?.try_collect().await?;
        debug!("Query matched {} document(s)", documents.len());
        Ok(self.layout.decode_all(documents))
    }

    async fn set_cross_ref(&self, id: &RecordId, value: &str) -> StoreResult<()> {
        let filter = doc! { "_id": id.as_bson().clone() };
        let update = self.layout.set_cross_ref_update(value);

        let result = self.collection.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;
        debug!("MongoDB client shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_missing_cross_ref_filter() {
        let layout = CollectionLayout::default();
        assert_eq!(
            layout.missing_cross_ref_filter(),
            doc! { "weaviateId": { "$exists": false } }
        );
    }

    #[test]
    fn test_set_update_uses_configured_field() {
        let layout = CollectionLayout {
            cross_ref_field: "vectorId".to_string(),
            ..Default::default()
        };
        assert_eq!(
            layout.set_cross_ref_update("w-100"),
            doc! { "$set": { "vectorId": "w-100" } }
        );
    }

    #[test]
    fn test_decode_product_document() {
        let layout = CollectionLayout::default();
        let oid = ObjectId::new();
        let record = layout
            .decode(doc! { "_id": oid, "name": "Widget", "price": 4.5 })
            .unwrap();

        assert_eq!(record.id, RecordId::from(oid));
        assert_eq!(record.name, "Widget");
        assert_eq!(record.cross_ref, None);
    }

    #[test]
    fn test_decode_keeps_existing_cross_ref() {
        let layout = CollectionLayout::default();
        let record = layout
            .decode(doc! { "_id": 2, "name": "Gadget", "weaviateId": "abc" })
            .unwrap();
        assert_eq!(record.cross_ref.as_deref(), Some("abc"));
    }

    #[test]
    fn test_decode_rejects_missing_name() {
        let layout = CollectionLayout::default();
        let err = layout.decode(doc! { "_id": 3, "name": 17 }).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));

        let err = layout.decode(doc! { "name": "Widget" }).unwrap_err();
        assert!(err.to_string().contains("_id"));
    }

    #[test]
    fn test_decode_all_keeps_unreadable_documents() {
        let layout = CollectionLayout::default();
        let candidates = layout.decode_all(vec![
            doc! { "_id": 1, "name": "Widget" },
            doc! { "_id": 2 },
            doc! { "_id": 3, "name": "Gizmo" },
        ]);

        assert_eq!(candidates.len(), 3);
        let names: Vec<&str> = candidates.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Widget", "Gizmo"]);
        assert_eq!(candidates.unreadable.len(), 1);
        assert!(candidates.unreadable[0].to_string().contains("document 2"));
    }
}

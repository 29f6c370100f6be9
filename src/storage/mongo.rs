use super::engine::{DeleteResult, DocumentStore, InsertOneResult};
use super::query::{Filter, Update};
use crate::core::{Document, ID_FIELD, ObjectId, Result, StoreError, Value};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, Bson, doc, oid};
use mongodb::error::{Error as DriverError, ErrorKind, WriteFailure};
use mongodb::options::ClientOptions;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

const APP_NAME: &str = "hrms";
const DUPLICATE_KEY_CODE: i32 = 11000;
const IMMUTABLE_FIELD_CODE: i32 = 66;

/// MongoDB-backed store.
///
/// Namespaces arrive as `database.collection` and are split on the first
/// dot. The driver keeps its own connection pool, so one instance serves
/// every request handler.
pub struct MongoStore {
    client: mongodb::Client,
    closed: AtomicBool,
}

impl MongoStore {
    /// Build a driver client from a `mongodb://` connection string.
    ///
    /// The driver connects lazily; call [`DocumentStore::ping`] to find out
    /// whether the server is actually reachable.
    pub async fn connect(connection_string: &str, timeout: Duration) -> Result<Self> {
        let mut options = ClientOptions::parse(connection_string)
            .await
            .map_err(store_error)?;
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = mongodb::Client::with_options(options).map_err(store_error)?;
        Ok(Self {
            client,
            closed: AtomicBool::new(false),
        })
    }

    fn collection(&self, namespace: &str) -> Result<mongodb::Collection<bson::Document>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        let (database, collection) = namespace
            .split_once('.')
            .ok_or_else(|| StoreError::Command(format!("invalid namespace '{namespace}'")))?;
        Ok(self.client.database(database).collection(collection))
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn count_documents(&self, collection: &str, filter: &Filter) -> Result<u64> {
        self.collection(collection)?
            .count_documents(filter_document(filter), None)
            .await
            .map_err(store_error)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let cursor = self
            .collection(collection)?
            .find(filter_document(filter), None)
            .await
            .map_err(store_error)?;
        let docs: Vec<bson::Document> = cursor.try_collect().await.map_err(store_error)?;
        docs.into_iter().map(from_bson_document).collect()
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        self.collection(collection)?
            .find_one(filter_document(filter), None)
            .await
            .map_err(store_error)?
            .map(from_bson_document)
            .transpose()
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<InsertOneResult> {
        let handle = self.collection(collection)?;

        // assigned here so the id leads the document and the caller gets a
        // typed id back without decoding the driver's Bson
        let id = match document.id() {
            Some(id) => id,
            None => {
                let id = ObjectId::new();
                document.prepend_id(id);
                id
            }
        };

        handle
            .insert_one(to_bson_document(&document), None)
            .await
            .map_err(|err| match write_error_code(&err) {
                Some(DUPLICATE_KEY_CODE) => StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    id: id.to_hex(),
                },
                _ => store_error(err),
            })?;

        debug!(collection, %id, "document inserted");
        Ok(InsertOneResult { inserted_id: id })
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Document>> {
        // the driver returns the pre-image unless told otherwise
        self.collection(collection)?
            .find_one_and_update(filter_document(filter), update_document(update), None)
            .await
            .map_err(store_error)?
            .map(from_bson_document)
            .transpose()
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteResult> {
        let result = self
            .collection(collection)?
            .delete_one(filter_document(filter), None)
            .await
            .map_err(store_error)?;
        Ok(DeleteResult {
            deleted_count: result.deleted_count,
        })
    }

    async fn ping(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map(|_| ())
            .map_err(store_error)
    }

    fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn write_error_code(err: &DriverError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => Some(write.code),
        ErrorKind::Command(command) => Some(command.code),
        _ => None,
    }
}

fn store_error(err: DriverError) -> StoreError {
    if write_error_code(&err) == Some(IMMUTABLE_FIELD_CODE) {
        return StoreError::ImmutableField(ID_FIELD.to_string());
    }
    match err.kind.as_ref() {
        ErrorKind::Io(_)
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::Authentication { .. } => StoreError::Connection(err.to_string()),
        ErrorKind::BsonDeserialization(_) => StoreError::Decode(err.to_string()),
        _ => StoreError::Command(err.to_string()),
    }
}

fn filter_document(filter: &Filter) -> bson::Document {
    to_bson_document(filter.conditions())
}

fn update_document(update: &Update) -> bson::Document {
    match update {
        Update::Set(fields) => doc! { "$set": to_bson_document(fields) },
    }
}

fn to_bson_document(doc: &Document) -> bson::Document {
    doc.iter()
        .map(|(key, value)| (key.to_string(), to_bson(value)))
        .collect()
}

fn to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Boolean(b) => Bson::Boolean(*b),
        Value::Int64(i) => Bson::Int64(*i),
        Value::Double(f) => Bson::Double(*f),
        Value::String(s) => Bson::String(s.clone()),
        Value::ObjectId(id) => Bson::ObjectId(oid::ObjectId::from_bytes(id.bytes())),
        Value::Array(items) => Bson::Array(items.iter().map(to_bson).collect()),
        Value::Document(doc) => Bson::Document(to_bson_document(doc)),
    }
}

fn from_bson_document(doc: bson::Document) -> Result<Document> {
    doc.into_iter()
        .map(|(key, value)| Ok((key, from_bson(value)?)))
        .collect()
}

fn from_bson(value: Bson) -> Result<Value> {
    Ok(match value {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Boolean(b),
        Bson::Int32(i) => Value::Int64(i64::from(i)),
        Bson::Int64(i) => Value::Int64(i),
        Bson::Double(f) => Value::Double(f),
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(id) => Value::ObjectId(ObjectId::from_bytes(id.bytes())),
        Bson::Array(items) => Value::Array(items.into_iter().map(from_bson).collect::<Result<_>>()?),
        Bson::Document(doc) => Value::Document(from_bson_document(doc)?),
        other => {
            return Err(StoreError::Decode(format!(
                "unsupported BSON type {:?}",
                other.element_type()
            )));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ids_keep_their_bytes() {
        let id = ObjectId::new();
        let Bson::ObjectId(driver_id) = to_bson(&Value::ObjectId(id)) else {
            panic!("expected a BSON ObjectId");
        };
        assert_eq!(driver_id.to_hex(), id.to_hex());
        assert_eq!(from_bson(Bson::ObjectId(driver_id)).unwrap(), Value::ObjectId(id));
    }

    #[test]
    fn test_nested_values_convert_in_order() {
        let doc = Document::new()
            .with(ID_FIELD, ObjectId::new())
            .with("name", "Ada")
            .with("skills", Value::Array(vec!["math".into(), "poetry".into()]))
            .with("address", Document::new().with("city", "London"));

        let bson_doc = to_bson_document(&doc);
        assert_eq!(
            bson_doc.keys().map(String::as_str).collect::<Vec<_>>(),
            vec![ID_FIELD, "name", "skills", "address"]
        );
        assert_eq!(from_bson_document(bson_doc).unwrap(), doc);
    }

    #[test]
    fn test_int32_reads_as_int64() {
        let doc = from_bson_document(doc! { "age": 30_i32, "salary": 1000.5 }).unwrap();
        assert_eq!(doc.get("age"), Some(&Value::Int64(30)));
        assert_eq!(doc.get("salary").and_then(Value::as_f64), Some(1000.5));
    }

    #[test]
    fn test_unsupported_types_are_decode_errors() {
        let err = from_bson_document(doc! { "hired": bson::DateTime::now() }).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn test_filter_and_update_documents() {
        let id = ObjectId::new();
        let filter = filter_document(&Filter::by_id(id));
        assert_eq!(
            filter,
            doc! { "_id": oid::ObjectId::from_bytes(id.bytes()) }
        );
        assert!(filter_document(&Filter::all()).is_empty());

        let update = update_document(&Update::set(
            Document::new().with("name", "Grace").with("salary", 2000.0),
        ));
        assert_eq!(update, doc! { "$set": { "name": "Grace", "salary": 2000.0 } });
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_ping() {
        let store = MongoStore::connect("mongodb://127.0.0.1:1/hr", Duration::from_millis(300))
            .await
            .unwrap();

        let err = store.ping().await.unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)), "{err:?}");

        store.shutdown();
        assert!(matches!(store.ping().await, Err(StoreError::Closed)));
    }
}

use crate::core::{Document, ID_FIELD, ObjectId, ObjectIdError, StoreError, Value};
use serde::{Deserialize, Serialize, Serializer};

pub const COLLECTION: &str = "employees";

/// Largest magnitude below which every integer is exactly representable
/// as an `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// An employee record as exchanged with HTTP clients.
///
/// Missing fields decode to their zero value and unknown fields are
/// ignored; a field of the wrong JSON type is a decode error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Hex form of the store's `_id`; empty until the store assigns one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, serialize_with = "serialize_number")]
    pub salary: f64,
    #[serde(default, serialize_with = "serialize_number")]
    pub age: f64,
}

/// Whole numbers go out without a fraction (`1000`, not `1000.0`).
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

impl Employee {
    pub fn new(name: impl Into<String>, salary: f64, age: f64) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            salary,
            age,
        }
    }

    /// Store encoding. An empty `id` leaves `_id` out so the store assigns one.
    pub fn to_document(&self) -> Result<Document, ObjectIdError> {
        let mut doc = Document::new();
        if !self.id.is_empty() {
            doc.insert(ID_FIELD, ObjectId::parse_str(&self.id)?);
        }
        doc.insert("name", self.name.as_str());
        doc.insert("salary", self.salary);
        doc.insert("age", self.age);
        Ok(doc)
    }

    /// Fields replaced by an update; `_id` and any other stored fields are
    /// left alone.
    pub fn update_document(&self) -> Document {
        Document::new()
            .with("name", self.name.as_str())
            .with("age", self.age)
            .with("salary", self.salary)
    }

    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let id = match doc.get(ID_FIELD) {
            None | Some(Value::Null) => String::new(),
            Some(Value::ObjectId(id)) => id.to_hex(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => return Err(type_error(ID_FIELD, "objectId", other)),
        };

        Ok(Self {
            id,
            name: decode_string(doc, "name")?,
            salary: decode_number(doc, "salary")?,
            age: decode_number(doc, "age")?,
        })
    }
}

fn decode_string(doc: &Document, field: &str) -> Result<String, StoreError> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(type_error(field, "string", other)),
    }
}

fn decode_number(doc: &Document, field: &str) -> Result<f64, StoreError> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| type_error(field, "double", value)),
    }
}

fn type_error(field: &str, expected: &str, found: &Value) -> StoreError {
    StoreError::Decode(format!(
        "field '{}': expected {}, found {}",
        field,
        expected,
        found.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_encoding_omits_empty_id() {
        let value = serde_json::to_value(Employee::new("Ada", 1000.0, 30.0)).unwrap();
        assert_eq!(value, json!({"name": "Ada", "salary": 1000, "age": 30}));

        let mut with_id = Employee::new("Ada", 1000.0, 30.0);
        with_id.id = "507f1f77bcf86cd799439011".to_string();
        let value = serde_json::to_value(with_id).unwrap();
        assert_eq!(value["id"], "507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_whole_numbers_serialize_without_fraction() {
        let text = serde_json::to_string(&Employee::new("Ada", 1000.0, 30.0)).unwrap();
        assert_eq!(text, r#"{"name":"Ada","salary":1000,"age":30}"#);

        let text = serde_json::to_string(&Employee::new("Ada", 1250.5, -0.0)).unwrap();
        assert_eq!(text, r#"{"name":"Ada","salary":1250.5,"age":0}"#);

        let huge = serde_json::to_string(&Employee::new("Ada", 1e300, f64::NAN)).unwrap();
        assert!(huge.contains(r#""salary":1e300"#), "{huge}");
        assert!(huge.contains(r#""age":null"#), "{huge}");
    }

    #[test]
    fn test_wire_decoding_is_permissive() {
        let employee: Employee = serde_json::from_value(json!({
            "name": "Ada",
            "salary": 1000,
            "department": "R&D"
        }))
        .unwrap();

        assert_eq!(employee.name, "Ada");
        assert_eq!(employee.salary, 1000.0);
        assert_eq!(employee.age, 0.0);
        assert!(employee.id.is_empty());
    }

    #[test]
    fn test_wire_decoding_rejects_wrong_types() {
        assert!(serde_json::from_value::<Employee>(json!({"name": "Ada", "age": "thirty"})).is_err());
        assert!(serde_json::from_value::<Employee>(json!({"name": 42})).is_err());
        assert!(serde_json::from_value::<Employee>(json!("Ada")).is_err());
    }

    #[test]
    fn test_store_encoding() {
        let mut employee = Employee::new("Ada", 1000.0, 30.0);
        let doc = employee.to_document().unwrap();
        assert!(!doc.contains_key(ID_FIELD));
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["name", "salary", "age"]);

        let id = ObjectId::new();
        employee.id = id.to_hex();
        let doc = employee.to_document().unwrap();
        assert_eq!(doc.id(), Some(id));

        employee.id = "not-an-id".to_string();
        assert!(employee.to_document().is_err());
    }

    #[test]
    fn test_update_document_excludes_id() {
        let mut employee = Employee::new("Ada", 1000.0, 30.0);
        employee.id = ObjectId::new().to_hex();

        let update = employee.update_document();
        assert!(!update.contains_key(ID_FIELD));
        assert_eq!(update.keys().collect::<Vec<_>>(), vec!["name", "age", "salary"]);
    }

    #[test]
    fn test_from_document_accepts_integer_numbers() {
        let id = ObjectId::new();
        let doc = Document::new()
            .with(ID_FIELD, id)
            .with("name", "Ada")
            .with("salary", 1000i64)
            .with("age", 30.5);

        let employee = Employee::from_document(&doc).unwrap();
        assert_eq!(employee.id, id.to_hex());
        assert_eq!(employee.salary, 1000.0);
        assert_eq!(employee.age, 30.5);
    }

    #[test]
    fn test_from_document_rejects_wrong_types() {
        let doc = Document::new().with("name", "Ada").with("age", "thirty");
        let err = Employee::from_document(&doc).unwrap_err();
        assert!(matches!(err, StoreError::Decode(msg) if msg.contains("'age'")));

        let doc = Document::new().with(ID_FIELD, true);
        assert!(Employee::from_document(&doc).is_err());
    }
}

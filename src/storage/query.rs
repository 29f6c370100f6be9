use crate::core::{Document, ID_FIELD, ObjectId, Result, StoreError, Value};

/// Equality filter: a document matches when every listed field is present
/// and equal. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Document,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(key, value)
    }

    pub fn by_id(id: ObjectId) -> Self {
        Self::eq(ID_FIELD, id)
    }

    pub fn and(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &Document {
        &self.conditions
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(key, expected)| doc.get(key) == Some(expected))
    }
}

/// Modification applied by `find_one_and_update`.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// `$set`: overwrite or add the given fields, leave the rest untouched.
    Set(Document),
}

impl Update {
    pub fn set(fields: Document) -> Self {
        Self::Set(fields)
    }

    pub fn apply(&self, target: &mut Document) -> Result<()> {
        match self {
            Self::Set(fields) => {
                if let Some(new_id) = fields.get(ID_FIELD)
                    && target.get(ID_FIELD) != Some(new_id)
                {
                    return Err(StoreError::ImmutableField(ID_FIELD.to_string()));
                }
                for (key, value) in fields.iter() {
                    target.insert(key, value.clone());
                }
                Ok(())
            }
        }
    }
}

pub mod document;
pub mod error;
pub mod object_id;
pub mod value;

pub use document::{Document, ID_FIELD};
pub use error::{Result, StoreError};
pub use object_id::{ObjectId, ObjectIdError};
pub use value::Value;

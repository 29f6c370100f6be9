pub mod collection;
pub mod engine;
pub mod memory;
pub mod mongo;
pub mod query;

pub use collection::{Collection, Database};
pub use engine::{DeleteResult, DocumentStore, InsertOneResult};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use query::{Filter, Update};

use super::{ApiError, Operation, Rejection, StatusPolicy};
use crate::model::employee::COLLECTION;
use crate::storage::{Collection, Database};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Database,
    pub employees: Collection,
    pub status_policy: StatusPolicy,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let employees = db.collection(COLLECTION);
        Self {
            db,
            employees,
            status_policy: StatusPolicy::default(),
        }
    }

    pub fn with_status_policy(mut self, status_policy: StatusPolicy) -> Self {
        self.status_policy = status_policy;
        self
    }

    pub fn reject(&self, operation: Operation, err: ApiError) -> Rejection {
        self.status_policy.reject(operation, err)
    }
}

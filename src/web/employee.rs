use super::{ApiError, AppState, Operation, Rejection};
use crate::core::{ObjectId, StoreError};
use crate::model::Employee;
use crate::storage::{Collection, Filter, Update};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::{debug, info};

pub const DELETED_MESSAGE: &str = "record deleted";

type ApiResult<T> = Result<T, ApiError>;

/// `GET /employee`
pub async fn list_employees(State(state): State<AppState>) -> Result<Json<Vec<Employee>>, Rejection> {
    list(&state.employees)
        .await
        .map(Json)
        .map_err(|err| state.reject(Operation::List, err))
}

/// `POST /employee`
pub async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<Employee>, JsonRejection>,
) -> Result<(StatusCode, Json<Employee>), Rejection> {
    let outcome = match payload {
        Ok(Json(employee)) => create(&state.employees, employee).await,
        Err(rejection) => Err(ApiError::from(rejection)),
    };

    outcome
        .map(|created| (StatusCode::CREATED, Json(created)))
        .map_err(|err| state.reject(Operation::Create, err))
}

/// `PUT /employee/:id`
///
/// The identifier is checked before the body so a bad id is reported as
/// such whatever the payload looks like. The response carries the path id
/// exactly as the client wrote it.
pub async fn update_employee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Employee>, JsonRejection>,
) -> Result<Json<Employee>, Rejection> {
    let outcome: ApiResult<Employee> = async {
        let id = parse_id(&raw_id)?;
        let Json(mut employee) = payload?;
        employee.id = raw_id;
        update(&state.employees, id, employee).await
    }
    .await;

    outcome
        .map(Json)
        .map_err(|err| state.reject(Operation::Update, err))
}

/// `DELETE /employee/:id`
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<&'static str>, Rejection> {
    let outcome: ApiResult<()> = async {
        let id = parse_id(&raw_id)?;
        delete(&state.employees, id).await
    }
    .await;

    outcome
        .map(|()| Json(DELETED_MESSAGE))
        .map_err(|err| state.reject(Operation::Delete, err))
}

pub fn parse_id(raw_id: &str) -> ApiResult<ObjectId> {
    Ok(ObjectId::parse_str(raw_id)?)
}

/// All employees in store order.
pub async fn list(collection: &Collection) -> ApiResult<Vec<Employee>> {
    let filter = Filter::all();

    // capacity hint only
    let count = collection.count_documents(&filter).await?;
    debug!(count, "listing employees");

    let mut employees = Vec::with_capacity(usize::try_from(count).unwrap_or_default());
    for doc in collection.find(&filter).await? {
        employees.push(Employee::from_document(&doc)?);
    }
    Ok(employees)
}

/// Insert a new employee and return it as persisted.
///
/// Any client-supplied `id` is dropped; the store assigns the identifier
/// and the response is read back from the store.
pub async fn create(collection: &Collection, mut employee: Employee) -> ApiResult<Employee> {
    employee.id.clear();
    let doc = employee.to_document()?;

    let inserted_id = collection.insert_one(doc).await?.inserted_id;
    info!(id = %inserted_id, name = %employee.name, "employee created");

    let stored = collection
        .find_one(&Filter::by_id(inserted_id))
        .await?
        .ok_or_else(|| StoreError::Missing(inserted_id.to_hex()))?;

    Ok(Employee::from_document(&stored)?)
}

/// Replace `name`, `age` and `salary` of an existing employee.
///
/// Returns `employee` as submitted, including its `id`; the stored document
/// is not read back.
pub async fn update(collection: &Collection, id: ObjectId, employee: Employee) -> ApiResult<Employee> {
    let update = Update::set(employee.update_document());
    let previous = collection
        .find_one_and_update(&Filter::by_id(id), &update)
        .await?;

    if previous.is_none() {
        return Err(ApiError::NotFound);
    }

    info!(%id, "employee updated");
    Ok(employee)
}

pub async fn delete(collection: &Collection, id: ObjectId) -> ApiResult<()> {
    let result = collection.delete_one(&Filter::by_id(id)).await?;
    if result.deleted_count == 0 {
        return Err(ApiError::NotFound);
    }

    info!(%id, "employee deleted");
    Ok(())
}

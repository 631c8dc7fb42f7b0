use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{NaiveDate, NaiveDateTime};
use common::LooseNumber;
use model::categories;
use model::entities::entry::EntryKind;
use serde::{Deserialize, Serialize};
use store::{EntryPatch, EntryWithPlan, NewEntry};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Positive-minutes check applied at the request boundary; past this
/// point the store persists whatever it is given.
fn validate_minutes(amount: &LooseNumber) -> Result<(), ValidationError> {
    if amount.as_minutes() > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("amount_not_positive"))
    }
}

/// Request body for logging an entry
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateEntryRequest {
    /// Entry kind (income = body-area tag, expense = workout)
    pub kind: EntryKind,
    /// Minutes of activity; numeric strings are accepted
    #[validate(custom(function = "validate_minutes"))]
    pub amount: LooseNumber,
    /// Category from the kind's vocabulary
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    /// Display icon; defaults from the category vocabulary
    pub category_icon: Option<String>,
    /// Owning plan ID
    pub account_id: i64,
    /// Activity date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Free text; defaults to the category name
    pub description: Option<String>,
}

/// Request body for updating an entry
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateEntryRequest {
    pub kind: Option<EntryKind>,
    /// Minutes of activity; numeric strings are accepted
    pub amount: Option<LooseNumber>,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: Option<String>,
    pub category_icon: Option<String>,
    pub account_id: Option<i64>,
    /// Activity date (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Query parameters for listing entries
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListEntriesQuery {
    /// Maximum number of entries to return
    pub limit: Option<u64>,
}

/// Entry response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EntryResponse {
    pub id: i64,
    pub kind: EntryKind,
    /// Minutes of activity
    pub amount: f64,
    pub category: String,
    pub category_icon: String,
    pub account_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub created_at: NaiveDateTime,
    /// Owning plan's display name, when it still exists
    pub plan_name: Option<String>,
}

impl From<EntryWithPlan> for EntryResponse {
    fn from(row: EntryWithPlan) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            amount: row.amount,
            category: row.category,
            category_icon: row.category_icon,
            account_id: row.account_id,
            date: row.date,
            description: row.description,
            created_at: row.created_at,
            plan_name: row.plan_name,
        }
    }
}

impl From<model::entry::Model> for EntryResponse {
    fn from(model: model::entry::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            amount: model.amount,
            category: model.category,
            category_icon: model.category_icon,
            account_id: model.account_id,
            date: model.date,
            description: model.description,
            created_at: model.created_at,
            plan_name: None,
        }
    }
}

/// Log a new entry. The local write is authoritative; the remote mirror
/// attempt happens before this returns but cannot fail the request.
#[utoipa::path(
    post,
    path = "/api/v1/entries",
    tag = "entries",
    request_body = CreateEntryRequest,
    responses(
        (status = 201, description = "Entry created successfully", body = ApiResponse<EntryResponse>),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_entry(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateEntryRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<EntryResponse>>), StatusCode> {
    let category_icon = request
        .category_icon
        .unwrap_or_else(|| categories::icon_for(request.kind, &request.category).to_string());

    let new_entry = NewEntry {
        kind: request.kind,
        amount: request.amount,
        category: request.category,
        category_icon,
        account_id: request.account_id,
        date: request.date,
        description: request.description.unwrap_or_default(),
    };

    match state.entries.add_entry(new_entry).await {
        Ok(created) => {
            info!(id = created.id, "entry created");
            let response = ApiResponse {
                data: EntryResponse::from(created),
                message: "Entry created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => {
            error!("Failed to create entry: {}", err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// List entries, newest activity first
#[utoipa::path(
    get,
    path = "/api/v1/entries",
    tag = "entries",
    responses(
        (status = 200, description = "Entries retrieved successfully", body = ApiResponse<Vec<EntryResponse>>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_entries(
    Query(query): Query<ListEntriesQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<EntryResponse>>>, StatusCode> {
    match state.entries.list(query.limit).await {
        Ok(rows) => {
            let entries: Vec<EntryResponse> = rows.into_iter().map(EntryResponse::from).collect();
            Ok(Json(ApiResponse {
                message: format!("Retrieved {} entries", entries.len()),
                data: entries,
                success: true,
            }))
        }
        Err(err) => {
            error!("Failed to retrieve entries: {}", err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific entry by ID
#[utoipa::path(
    get,
    path = "/api/v1/entries/{entry_id}",
    tag = "entries",
    params(
        ("entry_id" = i64, Path, description = "Entry ID"),
    ),
    responses(
        (status = 200, description = "Entry retrieved successfully", body = ApiResponse<EntryResponse>),
        (status = 404, description = "Entry not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_entry(
    Path(entry_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<EntryResponse>>, StatusCode> {
    match state.entries.entry(entry_id).await {
        Ok(Some(row)) => Ok(Json(ApiResponse {
            data: EntryResponse::from(row),
            message: "Entry retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("entry {} not found", entry_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(err) => {
            error!("Failed to retrieve entry {}: {}", entry_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update an entry. Local-only: the mirror never sees edits.
#[utoipa::path(
    put,
    path = "/api/v1/entries/{entry_id}",
    tag = "entries",
    params(
        ("entry_id" = i64, Path, description = "Entry ID"),
    ),
    request_body = UpdateEntryRequest,
    responses(
        (status = 200, description = "Entry updated successfully", body = ApiResponse<EntryResponse>),
        (status = 404, description = "Entry not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_entry(
    Path(entry_id): Path<i64>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateEntryRequest>>,
) -> Result<Json<ApiResponse<EntryResponse>>, StatusCode> {
    let patch = EntryPatch {
        kind: request.kind,
        amount: request.amount,
        category: request.category,
        category_icon: request.category_icon,
        account_id: request.account_id,
        date: request.date,
        description: request.description,
    };

    match state.entries.update_entry(entry_id, patch).await {
        Ok(()) => {}
        Err(err) if err.is_not_found() => {
            warn!("entry {} not found", entry_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(err) => {
            error!("Failed to update entry {}: {}", entry_id, err);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    match state.entries.entry(entry_id).await {
        Ok(Some(row)) => Ok(Json(ApiResponse {
            data: EntryResponse::from(row),
            message: "Entry updated successfully".to_string(),
            success: true,
        })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(err) => {
            error!("Failed to reload entry {}: {}", entry_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete an entry. Local-only: the mirrored copy lingers.
#[utoipa::path(
    delete,
    path = "/api/v1/entries/{entry_id}",
    tag = "entries",
    params(
        ("entry_id" = i64, Path, description = "Entry ID"),
    ),
    responses(
        (status = 200, description = "Entry deleted successfully", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_entry(
    Path(entry_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    match state.entries.remove_entry(entry_id).await {
        Ok(()) => Ok(Json(ApiResponse {
            data: entry_id.to_string(),
            message: "Entry deleted successfully".to_string(),
            success: true,
        })),
        Err(err) => {
            error!("Failed to delete entry {}: {}", entry_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

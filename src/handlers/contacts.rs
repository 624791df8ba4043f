use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};

use crate::error::ErrorInfo;
use crate::models::Contact;
use crate::services::ServiceError;
use crate::state::AppState;

/// GET /contacts - list every contact
pub async fn get_all_contacts(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    match state.service.get_all_contacts().await {
        Ok(contacts) => Json(contacts).into_response(),
        Err(err) => service_error(err, &uri),
    }
}

/// POST /contacts - create a contact, assigning an id
pub async fn create_contact(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<Contact>, JsonRejection>,
) -> Response {
    let Json(contact) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(rejection, &uri),
    };

    match state.service.create_contact(contact).await {
        Ok(created) => {
            tracing::info!(
                "created contact {} with id {}",
                created.name,
                created.id.unwrap_or_default()
            );
            Json(created).into_response()
        }
        Err(err) => service_error(err, &uri),
    }
}

/// GET /contacts/:id - fetch a single contact
pub async fn get_contact(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> Response {
    match state.service.get_contact(id).await {
        Ok(contact) => Json(contact).into_response(),
        Err(err) => service_error(err, &uri),
    }
}

/// PUT /contacts/:id - full-record replacement
pub async fn update_contact(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    payload: Result<Json<Contact>, JsonRejection>,
) -> Response {
    let Json(contact) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(rejection, &uri),
    };

    match state.service.update_contact(id, contact).await {
        Ok(updated) => Json(updated).into_response(),
        Err(err) => service_error(err, &uri),
    }
}

/// DELETE /contacts/:id - 200 with an empty body on success
pub async fn delete_contact(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> Response {
    match state.service.delete_contact(id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => service_error(err, &uri),
    }
}

fn invalid_body(rejection: JsonRejection, uri: &Uri) -> Response {
    tracing::error!("unreadable contact payload: {}", rejection.body_text());
    ErrorInfo::new(StatusCode::BAD_REQUEST, rejection.body_text(), uri).into_response()
}

fn service_error(err: ServiceError, uri: &Uri) -> Response {
    let (status, message) = match &err {
        ServiceError::NotFound(_) => {
            tracing::error!("contact not found: {}", err);
            (StatusCode::NOT_FOUND, "Contact not found".to_string())
        }
        ServiceError::AlreadyExists(_) => {
            tracing::error!("cannot create contact: {}", err);
            (StatusCode::BAD_REQUEST, "Contact already exists".to_string())
        }
        ServiceError::IdMismatch { .. } => {
            tracing::error!("rejected update: {}", err);
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        ServiceError::Store(inner) => {
            tracing::error!("unhandled store error: {:?}", inner);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    };

    ErrorInfo::new(status, message, uri).into_response()
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::bureaus::agencies::AGENCY_DIRECTORY;

use super::collaborator::DraftCollaborator;
use super::service::{DisputeWizardService, ServiceError};
use super::store::{SessionStore, StoreError};
use super::wizard::{DisputeRound, SessionId};

/// Router builder exposing the account catalog, the comparator, the agency
/// directory, and the wizard session endpoints.
pub fn dispute_router<S, C>(service: Arc<DisputeWizardService<S, C>>) -> Router
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    Router::new()
        .route("/api/v1/accounts", get(accounts_handler::<S, C>))
        .route(
            "/api/v1/accounts/:account_id/comparison",
            get(comparison_handler::<S, C>),
        )
        .route("/api/v1/agencies", get(agencies_handler))
        .route(
            "/api/v1/disputes/sessions",
            post(open_session_handler::<S, C>),
        )
        .route(
            "/api/v1/disputes/sessions/:session_id",
            get(session_handler::<S, C>).delete(close_session_handler::<S, C>),
        )
        .route(
            "/api/v1/disputes/sessions/:session_id/account",
            post(retarget_handler::<S, C>),
        )
        .route(
            "/api/v1/disputes/sessions/:session_id/proceed",
            post(proceed_handler::<S, C>),
        )
        .route(
            "/api/v1/disputes/sessions/:session_id/back",
            post(back_handler::<S, C>),
        )
        .route(
            "/api/v1/disputes/sessions/:session_id/generate",
            post(generate_handler::<S, C>),
        )
        .route(
            "/api/v1/disputes/sessions/:session_id/edit",
            post(edit_handler::<S, C>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenSessionRequest {
    pub(crate) account_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RetargetRequest {
    pub(crate) account_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateRequest {
    #[serde(default)]
    pub(crate) round: Option<DisputeRound>,
}

fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::UnknownAccount(_) | ServiceError::UnknownSession(_) => StatusCode::NOT_FOUND,
        ServiceError::Wizard(_) => StatusCode::CONFLICT,
        ServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

async fn accounts_handler<S, C>(
    State(service): State<Arc<DisputeWizardService<S, C>>>,
) -> Response
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    (StatusCode::OK, Json(service.accounts().to_vec())).into_response()
}

async fn comparison_handler<S, C>(
    State(service): State<Arc<DisputeWizardService<S, C>>>,
    Path(account_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    match service.comparison(&account_id) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn agencies_handler() -> Response {
    (StatusCode::OK, Json(AGENCY_DIRECTORY)).into_response()
}

async fn open_session_handler<S, C>(
    State(service): State<Arc<DisputeWizardService<S, C>>>,
    Json(payload): Json<OpenSessionRequest>,
) -> Response
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    match service.open_session(&payload.account_id) {
        Ok((view, ticket)) => {
            let worker = service.clone();
            tokio::spawn(async move { worker.run_analysis(ticket).await });
            (StatusCode::ACCEPTED, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn session_handler<S, C>(
    State(service): State<Arc<DisputeWizardService<S, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    match service.session(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn close_session_handler<S, C>(
    State(service): State<Arc<DisputeWizardService<S, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    match service.close_session(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

async fn retarget_handler<S, C>(
    State(service): State<Arc<DisputeWizardService<S, C>>>,
    Path(session_id): Path<String>,
    Json(payload): Json<RetargetRequest>,
) -> Response
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    match service.retarget(&SessionId(session_id), &payload.account_id) {
        Ok((view, ticket)) => {
            let worker = service.clone();
            tokio::spawn(async move { worker.run_analysis(ticket).await });
            (StatusCode::ACCEPTED, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn proceed_handler<S, C>(
    State(service): State<Arc<DisputeWizardService<S, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    match service.proceed(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn back_handler<S, C>(
    State(service): State<Arc<DisputeWizardService<S, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    match service.back(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn generate_handler<S, C>(
    State(service): State<Arc<DisputeWizardService<S, C>>>,
    Path(session_id): Path<String>,
    payload: Option<Json<GenerateRequest>>,
) -> Response
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    let round = payload.and_then(|Json(request)| request.round);
    match service.request_letter(&SessionId(session_id), round) {
        Ok((view, ticket)) => {
            let worker = service.clone();
            tokio::spawn(async move { worker.run_letter(ticket).await });
            (StatusCode::ACCEPTED, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn edit_handler<S, C>(
    State(service): State<Arc<DisputeWizardService<S, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    match service.edit_strategy(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

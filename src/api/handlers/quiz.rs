//! Quiz endpoints. The client holds the [`QuizState`] and posts it back with
//! every step; the server only applies transitions.

use crate::{
    api::AppState,
    auth::{normalize_email, on_sign_in, valid_email},
    quiz::{Catalog, Event, Question, QuestionView, QuizState},
    store::UserStore,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

/// A state together with what to draw for it.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuizStep {
    pub state: QuizState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
    pub view: QuestionView,
}

impl QuizStep {
    fn new(catalog: &Catalog, state: QuizState, event: Option<Event>) -> Self {
        let view = QuestionView::render(catalog, &state);
        Self { state, event, view }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AnswerRequest {
    pub state: QuizState,
    pub option_id: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct BackRequest {
    pub state: QuizState,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LeadRequest {
    pub email: String,
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

#[utoipa::path(
    get,
    path= "/quiz",
    responses (
        (status = 200, description = "Initial state and first question", body = QuizStep),
    ),
    tag= "quiz"
)]
pub async fn start<S: UserStore + 'static>(State(state): State<AppState<S>>) -> Response {
    Json(QuizStep::new(&state.catalog, QuizState::new(), None)).into_response()
}

#[utoipa::path(
    get,
    path= "/quiz/catalog",
    responses (
        (status = 200, description = "All questions in catalog order", body = [Question]),
    ),
    tag= "quiz"
)]
pub async fn catalog<S: UserStore + 'static>(State(state): State<AppState<S>>) -> Response {
    Json::<&[Question]>(state.catalog.questions()).into_response()
}

#[utoipa::path(
    post,
    path= "/quiz/answer",
    request_body = AnswerRequest,
    responses (
        (status = 200, description = "Transition applied", body = QuizStep),
        (status = 400, description = "State outside the catalog or unknown option"),
    ),
    tag= "quiz"
)]
#[instrument(skip(state, payload))]
pub async fn answer<S: UserStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Option<Json<AnswerRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return bad_request("Missing payload".to_string());
    };
    let catalog = state.catalog.as_ref();

    if let Err(e) = request.state.validate(catalog) {
        debug!("Rejected quiz state: {e}");
        return bad_request(e.to_string());
    }

    // Once completed, answering is a no-op and the option is not looked up.
    let next = if request.state.completed {
        None
    } else {
        let question = catalog.get(request.state.current_index);
        match question.and_then(|q| q.option(&request.option_id)) {
            Some(option) => option.next.clone(),
            None => {
                debug!(option_id = %request.option_id, "Unknown option");
                return bad_request(format!("Unknown option: {}", request.option_id));
            }
        }
    };

    let (quiz_state, event) = request.state.answer(catalog, next.as_deref());
    debug!(?event, "Quiz answered");

    Json(QuizStep::new(catalog, quiz_state, Some(event))).into_response()
}

#[utoipa::path(
    post,
    path= "/quiz/back",
    request_body = BackRequest,
    responses (
        (status = 200, description = "Previous screen", body = QuizStep),
        (status = 400, description = "State outside the catalog"),
    ),
    tag= "quiz"
)]
pub async fn back<S: UserStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Option<Json<BackRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return bad_request("Missing payload".to_string());
    };
    let catalog = state.catalog.as_ref();

    if let Err(e) = request.state.validate(catalog) {
        return bad_request(e.to_string());
    }

    let (quiz_state, event) = request.state.back();
    Json(QuizStep::new(catalog, quiz_state, Some(event))).into_response()
}

#[utoipa::path(
    post,
    path= "/quiz/lead",
    request_body = LeadRequest,
    responses (
        (status = 204, description = "Lead recorded (or already known)"),
        (status = 400, description = "Invalid email"),
    ),
    tag= "quiz"
)]
#[instrument(skip(state, payload))]
pub async fn lead<S: UserStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Option<Json<LeadRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return bad_request("Missing payload".to_string());
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return bad_request("Invalid email".to_string());
    }

    match on_sign_in(state.store.as_ref(), &email).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
            .into_response(),
    }
}

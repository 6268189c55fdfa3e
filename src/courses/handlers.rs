use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::MessageResponse,
        middleware::{authenticate, require_capability, CurrentUser},
        roles::Capability,
    },
    courses::dto::{CourseListResponse, CourseRequest},
    db::RepoError,
    error::{ApiError, ApiResult},
    extract::AppJson,
    state::AppState,
};

pub fn course_routes(state: AppState) -> Router<AppState> {
    let create = post(create_course)
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_capability(Capability::ManageCourses, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(state, authenticate));

    Router::new()
        .route("/create", create)
        .route("/update/:id", put(update_course))
        .route("/delete/:id", delete(delete_course))
        .route("/get", get(list_courses))
}

/// Ids that are not UUIDs cannot match any course.
fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        warn!(id = %raw, "malformed course id");
        ApiError::bad_request("course not found")
    })
}

#[instrument(skip_all)]
pub async fn create_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    AppJson(payload): AppJson<CourseRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let fields = payload
        .into_fields()
        .ok_or_else(|| ApiError::bad_request("all fields are required"))?;

    if state.courses.find_by_title(&fields.title).await?.is_some() {
        warn!(title = %fields.title, "course already exists");
        return Err(ApiError::bad_request("course already exists"));
    }

    let course = match state.courses.create(fields).await {
        Ok(c) => c,
        Err(RepoError::Conflict) => {
            warn!("course title taken concurrently");
            return Err(ApiError::bad_request("course already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        course_id = %course.id,
        title = %course.title,
        created_by = %user.0.id,
        "course created"
    );
    Ok(Json(MessageResponse::new("course added successfully")))
}

#[instrument(skip(state, payload))]
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CourseRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    let fields = payload
        .into_fields()
        .ok_or_else(|| ApiError::bad_request("all fields are required"))?;

    match state.courses.replace(id, fields).await {
        Ok(Some(course)) => {
            info!(course_id = %course.id, "course updated");
            Ok(Json(MessageResponse::new("course updated successfully")))
        }
        Ok(None) => {
            warn!(course_id = %id, "update of unknown course");
            Err(ApiError::bad_request("course not found"))
        }
        Err(RepoError::Conflict) => {
            warn!(course_id = %id, "update collides with existing title");
            Err(ApiError::bad_request("course already exists"))
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let id = parse_id(&id)?;
    let Some(course) = state.courses.delete(id).await? else {
        warn!(course_id = %id, "delete of unknown course");
        return Err(ApiError::bad_request("course not found"));
    };
    info!(course_id = %course.id, title = %course.title, "course deleted");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("course deleted successfully")),
    ))
}

#[instrument(skip(state))]
pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Json<CourseListResponse>> {
    let courses = state.courses.list().await?;
    Ok(Json(CourseListResponse {
        message: "courses found successfully".into(),
        courses,
    }))
}

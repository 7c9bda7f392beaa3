use crate::modules::models::{
    request::{SearchContestsParameter, UpdateSolutionLinkRequest},
    response::{ContestsResponse, ErrorResponse, MessageResponse},
};
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use contest_tracker_libs::{
    models::{BookmarkState, Contest, NewSolutionLink, SolutionLink},
    store::{ContestStore, SolutionLinkStore, StoreError},
    ContestSynchronizer,
};
use std::sync::Arc;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<(StatusCode, Json<T>), ApiError>;

fn store_error(context: &str, not_found: &str, e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found(not_found)),
        ),
        e => {
            tracing::error!("Error in {}: {:?}", context, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal(e)),
            )
        }
    }
}

/// Synchronize contests, then return every contest and solution link.
///
/// Any failure yields `200` with empty lists.
pub async fn get_contests(
    Extension(synchronizer): Extension<Arc<ContestSynchronizer>>,
    Extension(contests): Extension<Arc<dyn ContestStore>>,
    Extension(solution_links): Extension<Arc<dyn SolutionLinkStore>>,
) -> (StatusCode, Json<ContestsResponse>) {
    if let Err(e) = synchronizer.sync().await {
        tracing::warn!(
            "Contest sync failed, answering with empty lists: {:?}",
            e
        );
        return (StatusCode::OK, Json(ContestsResponse::default()));
    }

    match (
        contests.list_contests().await,
        solution_links.list_solution_links().await,
    ) {
        (Ok(contests), Ok(solution_links)) => (
            StatusCode::OK,
            Json(ContestsResponse {
                contests,
                solution_links,
            }),
        ),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(
                "Failed to list contests, answering with empty lists: {:?}",
                e
            );
            (StatusCode::OK, Json(ContestsResponse::default()))
        }
    }
}

pub async fn bookmark_contest(
    Path(id): Path<i64>,
    Extension(contests): Extension<Arc<dyn ContestStore>>,
) -> ApiResult<BookmarkState> {
    let state = contests
        .toggle_bookmark(id)
        .await
        .map_err(|e| store_error("bookmark_contest", "Contest not found", e))?;

    Ok((StatusCode::OK, Json(state)))
}

pub async fn add_solution_link(
    Extension(solution_links): Extension<Arc<dyn SolutionLinkStore>>,
    Json(link): Json<NewSolutionLink>,
) -> ApiResult<SolutionLink> {
    let created = solution_links
        .insert_solution_link(&link)
        .await
        .map_err(|e| store_error("add_solution_link", "Solution link not found", e))?;

    Ok((StatusCode::OK, Json(created)))
}

pub async fn update_solution_link(
    Path(id): Path<i64>,
    Extension(solution_links): Extension<Arc<dyn SolutionLinkStore>>,
    Json(body): Json<UpdateSolutionLinkRequest>,
) -> ApiResult<SolutionLink> {
    let updated = solution_links
        .update_solution_link(id, &body.youtube_link)
        .await
        .map_err(|e| store_error("update_solution_link", "Solution link not found", e))?;

    Ok((StatusCode::OK, Json(updated)))
}

pub async fn delete_solution_link(
    Path(id): Path<i64>,
    Extension(solution_links): Extension<Arc<dyn SolutionLinkStore>>,
) -> ApiResult<MessageResponse> {
    solution_links
        .delete_solution_link(id)
        .await
        .map_err(|e| store_error("delete_solution_link", "Solution link not found", e))?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: String::from("Solution link deleted successfully"),
        }),
    ))
}

pub async fn search_contests(
    Query(params): Query<SearchContestsParameter>,
    Extension(contests): Extension<Arc<dyn ContestStore>>,
) -> ApiResult<Vec<Contest>> {
    let title = params.title.unwrap_or_default();
    let found = contests
        .search_contests(&title)
        .await
        .map_err(|e| store_error("search_contests", "Contest not found", e))?;

    Ok((StatusCode::OK, Json(found)))
}

pub async fn liveness(Extension(contests): Extension<Arc<dyn ContestStore>>) -> StatusCode {
    match contests.ping().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use crate::analytics::report::CategoryDistribution;
use crate::analytics::report::DashboardMetrics;
use crate::analytics::report::ProgressSummary;
use crate::analytics::report::WeeklySeries;
use crate::cmd::serve::state::ServerState;
use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::review::engine::IntervalPreview;
use crate::review::select::DeckStats;
use crate::types::card::Card;
use crate::types::card_id::CardId;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// An error as a JSON response. The status code follows the error kind, and
/// the body says whether resubmitting can help.
pub struct ApiError(ErrorReport);

impl From<ErrorReport> for ApiError {
    fn from(value: ErrorReport) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Scheduler => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Persistence => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "error": self.0.message(),
            "retryable": self.0.is_retryable(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Deserialize)]
pub struct RatingBody {
    rating: String,
}

pub async fn metrics_handler(State(state): State<ServerState>) -> Json<DashboardMetrics> {
    Json(state.analytics.get_dashboard_metrics(Timestamp::now()))
}

pub async fn weekly_handler(State(state): State<ServerState>) -> Json<WeeklySeries> {
    Json(state.analytics.get_weekly_series(Timestamp::now()))
}

pub async fn categories_handler(State(state): State<ServerState>) -> Json<CategoryDistribution> {
    Json(state.analytics.get_category_distribution(Timestamp::now()))
}

pub async fn progress_handler(State(state): State<ServerState>) -> Json<ProgressSummary> {
    Json(state.analytics.get_progress_summary(Timestamp::now()))
}

pub async fn clear_cache_handler(State(state): State<ServerState>) -> StatusCode {
    state.analytics.clear_cache();
    StatusCode::NO_CONTENT
}

pub async fn deck_handler(State(state): State<ServerState>) -> ApiResult<DeckStats> {
    Ok(Json(state.review.deck_stats(Timestamp::now())?))
}

pub async fn due_handler(State(state): State<ServerState>) -> ApiResult<Vec<Card>> {
    Ok(Json(state.review.get_due_cards(Timestamp::now())?))
}

/// The single most urgent due card, or `null`.
pub async fn next_handler(State(state): State<ServerState>) -> ApiResult<Option<Card>> {
    Ok(Json(state.review.next_card(Timestamp::now())?))
}

pub async fn preview_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<IntervalPreview>> {
    let id = CardId::new(id);
    Ok(Json(state.review.preview(&id, Timestamp::now())?))
}

pub async fn rating_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<RatingBody>,
) -> ApiResult<Card> {
    let id = CardId::new(id);
    let rating: Rating = body.rating.parse()?;
    Ok(Json(state.review.submit_rating(&id, rating, Timestamp::now())?))
}

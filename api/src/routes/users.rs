use std::sync::Arc;

use analytics_store::entity::series::UserRow;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Serialize;

use super::{respond, DaysParams};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UserItem {
    pub date: String,
    pub daily_users: u64,
    pub nlp_users: u64,
    pub pendle_users: u64,
    pub cumulative_users: u64,
}

impl From<&UserRow> for UserItem {
    fn from(r: &UserRow) -> Self {
        Self {
            date: r.date.to_string(),
            daily_users: r.daily_users,
            nlp_users: r.nlp_users,
            pendle_users: r.pendle_users,
            cumulative_users: r.cumulative_users,
        }
    }
}

/// GET /api/users
/// Daily active addresses across wNLP and the Pendle markets
pub async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaysParams>,
) -> impl IntoResponse {
    let days = state.service.settings().lookback_days(params.days);

    respond(state.service.user_stats(days).await, |rows| {
        rows.iter().map(UserItem::from).collect::<Vec<_>>()
    })
}

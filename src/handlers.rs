use crate::aggregate::{DateFilter, GroupKey};
use crate::errors::AppError;
use crate::models::SummaryResponse;
use crate::render::RenderedView;
use crate::state::{AppState, CycleQuery};
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub filter: Option<String>,
    pub group: Option<String>,
}

impl AnalyticsQuery {
    fn into_cycle(self) -> Result<CycleQuery, AppError> {
        let filter = match self.filter.as_deref() {
            None => DateFilter::All,
            Some(raw) => DateFilter::parse(raw)
                .ok_or_else(|| AppError::bad_request("filter must be one of all, today, 7d, 30d"))?,
        };
        let group_by = match self.group.as_deref() {
            None => None,
            Some(raw) => Some(GroupKey::parse(raw).ok_or_else(|| {
                AppError::bad_request("group must be one of payment, customer, service")
            })?),
        };
        Ok(CycleQuery { filter, group_by })
    }
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let view = state.current_view().await;
    Html(render_index(&view))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<RenderedView>, AppError> {
    let query = query.into_cycle()?;
    Ok(Json(state.refresh(&query).await))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let query = query.into_cycle()?;
    let (tier, summary) = state.summarize(&query).await;
    Ok(Json(SummaryResponse { tier, summary }))
}

pub async fn health() -> &'static str {
    "ok"
}

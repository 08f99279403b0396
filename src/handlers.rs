use crate::errors::DashboardError;
use crate::models::{AdjustForm, AdjustRequest, Direction, LoginForm, StateResponse};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    Form, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect},
};
use tokio::fs;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let reconciler = state.reconciler.lock().await;
    Html(render_index(&reconciler.snapshot()))
}

pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let reconciler = state.reconciler.lock().await;
    Json(reconciler.snapshot())
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, DashboardError> {
    let mut reconciler = state.reconciler.lock().await;
    surfaced(reconciler.login(&form.password).await)?;
    Ok(Redirect::to("/"))
}

pub async fn logout(State(state): State<AppState>) -> Result<Redirect, DashboardError> {
    let mut reconciler = state.reconciler.lock().await;
    reconciler.logout().await?;
    Ok(Redirect::to("/"))
}

pub async fn refresh(State(state): State<AppState>) -> Result<Redirect, DashboardError> {
    let mut reconciler = state.reconciler.lock().await;
    surfaced(reconciler.refresh().await)?;
    Ok(Redirect::to("/"))
}

pub async fn add_points(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Form(form): Form<AdjustForm>,
) -> Result<Redirect, DashboardError> {
    adjust_from_form(&state, &username, Direction::Add, form).await
}

pub async fn redeem_points(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Form(form): Form<AdjustForm>,
) -> Result<Redirect, DashboardError> {
    adjust_from_form(&state, &username, Direction::Redeem, form).await
}

pub async fn adjust(
    State(state): State<AppState>,
    Json(payload): Json<AdjustRequest>,
) -> Result<Json<StateResponse>, DashboardError> {
    let mut reconciler = state.reconciler.lock().await;
    reconciler
        .adjust(
            &payload.username,
            payload.direction,
            &payload.local,
            &payload.global,
            &payload.reason,
        )
        .await?;
    Ok(Json(reconciler.snapshot()))
}

pub async fn icon(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    if !is_plain_png_name(&file) {
        return Err(StatusCode::NOT_FOUND);
    }
    let bytes = fs::read(state.icons_dir.join(&file))
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

async fn adjust_from_form(
    state: &AppState,
    username: &str,
    direction: Direction,
    form: AdjustForm,
) -> Result<Redirect, DashboardError> {
    let mut reconciler = state.reconciler.lock().await;
    surfaced(
        reconciler
            .adjust(username, direction, &form.local, &form.global, &form.reason)
            .await
            .map(|_| ()),
    )?;
    Ok(Redirect::to("/"))
}

/// The page shows every failure except a storage fault, which is a 500.
fn surfaced(result: Result<(), DashboardError>) -> Result<(), DashboardError> {
    match result {
        Err(err @ DashboardError::Storage(_)) => Err(err),
        _ => Ok(()),
    }
}

fn is_plain_png_name(file: &str) -> bool {
    file.ends_with(".png")
        && !file.starts_with('.')
        && file
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' '))
}

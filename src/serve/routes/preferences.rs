use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::Error,
    serve::{
        AppState,
        error::ServeError,
        session::explorer_info,
        types::{EndpointInfo, FavoriteRequest, PreferencesUpdate, PreferencesView, ServeResponse},
    },
};

#[utoipa::path(
    tag = "Preferences",
    get,
    path = "/preferences",
    responses(
        (status = 200, description = "Persisted display preferences", body = PreferencesView),
    )
)]
/// Preferences
pub async fn preferences_get(State(state): State<AppState>) -> impl IntoResponse {
    let explorer = state.read().await;

    (StatusCode::OK, Json(PreferencesView::from(explorer.prefs())))
}

#[utoipa::path(
    tag = "Preferences",
    put,
    path = "/preferences",
    request_body = PreferencesUpdate,
    responses(
        (status = 200, description = "Preferences after the update", body = PreferencesView),
        (status = 400, description = "Empty theme or currency"),
    )
)]
/// Update Preferences
pub async fn preferences_update(
    State(state): State<AppState>,
    Json(update): Json<PreferencesUpdate>,
) -> Result<impl IntoResponse, ServeError> {
    let mut explorer = state.write().await;

    if let Some(theme) = update.theme {
        if theme.trim().is_empty() {
            return Err(ServeError::malformed_request("empty theme"));
        }
        explorer.prefs_mut().set_theme(theme.trim())?;
    }

    if let Some(currency) = update.currency {
        if currency.trim().is_empty() {
            return Err(ServeError::malformed_request("empty currency"));
        }
        explorer.prefs_mut().set_currency(currency.trim())?;
    }

    Ok((StatusCode::OK, Json(PreferencesView::from(explorer.prefs()))))
}

#[utoipa::path(
    tag = "Preferences",
    put,
    path = "/chains/{name}/favorite",
    params(
        ("name" = String, Path, description = "Chain name, case-insensitive", example = "epix"),
    ),
    request_body = FavoriteRequest,
    responses(
        (status = 200, description = "Preferences after the update", body = PreferencesView),
        (status = 404, description = "Chain not loaded"),
    )
)]
/// Mark Favorite
pub async fn chains_favorite(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<FavoriteRequest>,
) -> Result<impl IntoResponse, ServeError> {
    let mut explorer = state.write().await;

    let name = explorer
        .registry()
        .resolve_name(&name)
        .ok_or(ServeError::NotFound)?
        .to_string();

    explorer.prefs_mut().set_favorite(&name, request.favorite)?;

    Ok((StatusCode::OK, Json(PreferencesView::from(explorer.prefs()))))
}

#[utoipa::path(
    tag = "Explorer",
    put,
    path = "/endpoint",
    request_body = EndpointInfo,
    responses(
        (status = 200, description = "Endpoint now in use; recent blocks are kept", body = ServeResponse<EndpointInfo>),
        (status = 400, description = "Unusable endpoint address"),
        (status = 503, description = "No chain selected"),
    )
)]
/// Switch Endpoint
///
/// Points the selected chain at another REST endpoint and remembers it for
/// the next time the chain is selected.
pub async fn endpoint_update(
    State(state): State<AppState>,
    Json(endpoint): Json<EndpointInfo>,
) -> Result<impl IntoResponse, ServeError> {
    let mut explorer = state.write().await;

    if explorer.session().is_none() {
        return Err(ServeError::NoChainSelected);
    }

    let session = explorer
        .set_endpoint(endpoint.into())
        .map_err(|e| match e {
            Error::Config(msg) => ServeError::malformed_request(msg),
            other => ServeError::Explorer(other),
        })?;

    let data = EndpointInfo::from(session.endpoint());

    let out = ServeResponse {
        data,
        explorer_info: explorer_info(&explorer)?,
    };

    Ok((StatusCode::OK, Json(out)))
}

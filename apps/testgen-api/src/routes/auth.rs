//! OAuth web-flow endpoints: redirect to the provider, then exchange
//! the callback code for a bearer token and set the session cookie.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use testgen_github::exchange_code;
use tracing::info;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::session::session_cookie;

pub async fn login(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.oauth.authorize_url())
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
}

/// One-shot code-for-token exchange. No token in the provider response
/// means no cookie and a 400; transport errors propagate as-is.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Redirect)> {
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::bad_request("code is required"))?;

    let token = exchange_code(&state.http, &state.oauth, &code).await?;
    info!("OAuth exchange succeeded, starting session");

    let jar = jar.add(session_cookie(token, state.secure_cookies));
    let dashboard = format!("{}/dashboard", state.client_origin);
    Ok((jar, Redirect::temporary(&dashboard)))
}

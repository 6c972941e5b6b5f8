use axum::{extract::State, response::Redirect};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    http::{AppState, Result},
    oauth::google,
    session::Session,
};

/// Sends the browser to Google's consent screen. The flow state is written
/// to the session only once the authorization url has been built.
pub async fn route(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let flow = google::new_flow(
        &state.config.google_client_id,
        &state.config.google_client_secret,
    )?;

    // Google sends the browser here once the user is done.
    let callback_url = flow.provider().callback_url(&state.config.auth_url);
    let (authorization_url, flow_state) = flow.authorization_url(&callback_url)?;

    session.set(flow.provider().name, &flow_state).await?;

    log::debug!("Redirecting to {} consent screen", flow.provider().name);

    Ok((
        jar.add(session.cookie(state.config.session_cookie_secure)),
        Redirect::temporary(authorization_url.as_str()),
    ))
}

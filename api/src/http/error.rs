use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{oauth::AuthorizationSetupError, session::SessionError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not start the authorization flow")]
    AuthorizationSetup(#[from] AuthorizationSetupError),

    #[error("session storage failed")]
    Session(#[from] SessionError),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthorizationSetup(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        log::error!("{}", error_chain(&self));

        // The cause stays in the server log.
        self.status_code().into_response()
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

use super::{AuthorizationFlow, AuthorizationSetupError, Provider};

pub const PROFILE_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.profile";
pub const EMAIL_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

pub static PROVIDER: Provider = Provider {
    name: "google",
    auth_url: "https://accounts.google.com/o/oauth2/auth",
    token_url: "https://oauth2.googleapis.com/token",
    scopes: &[PROFILE_SCOPE, EMAIL_SCOPE],
    callback_path: "/GoogleCallback",
};

pub fn new_flow(
    client_id: &str,
    client_secret: &str,
) -> Result<AuthorizationFlow, AuthorizationSetupError> {
    AuthorizationFlow::new(&PROVIDER, client_id, client_secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn profile_then_email() {
        assert_eq!(PROVIDER.scopes, &[PROFILE_SCOPE, EMAIL_SCOPE]);
    }

    #[test]
    fn callback_is_appended_to_base_url() {
        assert_eq!(
            PROVIDER.callback_url("https://example.com/auth"),
            "https://example.com/auth/GoogleCallback"
        );
    }
}

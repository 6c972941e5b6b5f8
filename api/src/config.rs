#[derive(clap::Parser, Clone)]
pub struct Config {
    #[clap(short, env, default_value = "3000")]
    pub port: u16,

    #[clap(long, env)]
    pub google_client_id: String,

    #[clap(long, env)]
    pub google_client_secret: String,

    /// Public base URL of this service. Google sends the browser back to
    /// `{auth_url}/GoogleCallback`.
    #[clap(long, env)]
    pub auth_url: String,

    /// Seconds a session lives after its last write.
    #[clap(long, env, default_value = "600")]
    pub session_ttl: u64,

    /// Marks the session cookie `Secure`. Only disable for plain http
    /// development setups.
    #[clap(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    pub session_cookie_secure: bool,
}

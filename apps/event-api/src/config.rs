/// Event API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Password for the `user` admin account (HTTP Basic auth).
    pub admin_password: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Event name shown on the status bar until changed by an admin.
    pub event_name: String,
}

pub const DEFAULT_EVENT_NAME: &str = "Online Robotics Competition";

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_var("DATABASE_URL"),
            admin_password: required_var("ADMIN_PASSWORD"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            event_name: std::env::var("EVENT_NAME")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string()),
        }
    }
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}

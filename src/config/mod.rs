use std::env;

/// Role ids the content API assigns to teachers and students.
pub const DEFAULT_TEACHER_ROLE_ID: &str = "83c708d8-90c4-4835-b066-2d36ec66ac50";
pub const DEFAULT_STUDENT_ROLE_ID: &str = "4dbda2fc-909b-4767-849b-1ab4a0d5d374";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub content_api_url: String,
    pub content_api_token: Option<String>,
    pub content_api_email: Option<String>,
    pub content_api_password: Option<String>,
    pub content_api_timeout_secs: u64,
    /// Bearer secret for the session routes; when unset they are closed.
    pub admin_token: Option<String>,
    /// Passed as `limit` on every collection read; `-1` asks for the whole collection.
    pub collection_limit: i64,
    pub teacher_role_id: String,
    pub student_role_id: String,
    pub recent_lesson_window_days: i64,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            content_api_url: env::var("CONTENT_API_URL")?
                .trim_end_matches('/')
                .to_string(),
            content_api_token: non_empty_var("CONTENT_API_TOKEN"),
            content_api_email: non_empty_var("CONTENT_API_EMAIL"),
            content_api_password: non_empty_var("CONTENT_API_PASSWORD"),
            content_api_timeout_secs: env::var("CONTENT_API_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            admin_token: non_empty_var("ADMIN_TOKEN"),
            collection_limit: env::var("COLLECTION_LIMIT")
                .unwrap_or_else(|_| "-1".to_string())
                .parse()
                .unwrap_or(-1),
            teacher_role_id: env::var("TEACHER_ROLE_ID")
                .unwrap_or_else(|_| DEFAULT_TEACHER_ROLE_ID.to_string()),
            student_role_id: env::var("STUDENT_ROLE_ID")
                .unwrap_or_else(|_| DEFAULT_STUDENT_ROLE_ID.to_string()),
            recent_lesson_window_days: env::var("RECENT_LESSON_WINDOW_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }

    /// Configuration pointing at `content_api_url` with every other setting at its default.
    pub fn with_content_api(content_api_url: impl Into<String>) -> Self {
        Self {
            content_api_url: content_api_url.into().trim_end_matches('/').to_string(),
            content_api_token: None,
            content_api_email: None,
            content_api_password: None,
            content_api_timeout_secs: 30,
            admin_token: None,
            collection_limit: -1,
            teacher_role_id: DEFAULT_TEACHER_ROLE_ID.to_string(),
            student_role_id: DEFAULT_STUDENT_ROLE_ID.to_string(),
            recent_lesson_window_days: 30,
            host: "0.0.0.0".to_string(),
            port: 3000,
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

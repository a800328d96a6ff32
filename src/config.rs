use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Deployment environment, from NODE_ENV. "production" or "development".
    pub env: String,
    /// Directory holding the built frontend (index.html + assets/).
    pub static_dir: String,
    /// Directory receiving seeded plan documents.
    pub data_dir: String,
    /// Frontend origin allowed by CORS in addition to localhost.
    pub cors_origin: String,
    pub openrouter_base_url: String,
    pub openrouter_api_key: Option<String>,
    pub github_token: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_uri: Option<String>,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let env = std::env::var("NODE_ENV").unwrap_or_else(|_| "development".into());

    let openrouter_api_key = non_empty(std::env::var("OPENROUTER_API_KEY").ok());
    if openrouter_api_key.is_none() {
        if env == "production" {
            anyhow::bail!(
                "OPENROUTER_API_KEY is not set. \
                 Chat and model routes cannot serve in production without it."
            );
        }
        eprintln!("⚠️  OPENROUTER_API_KEY is not set — chat routes will reject requests until it is configured.");
    }

    Ok(Config {
        port: std::env::var("PORT")
            .unwrap_or_else(|_| "3001".into())
            .parse()
            .unwrap_or(3001),
        env,
        static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "dist".into()),
        data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into()),
        cors_origin: std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".into()),
        openrouter_base_url: std::env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai".into()),
        openrouter_api_key,
        github_token: non_empty(std::env::var("GITHUB_TOKEN").ok()),
        google_client_id: non_empty(std::env::var("GOOGLE_CLIENT_ID").ok()),
        google_client_secret: non_empty(std::env::var("GOOGLE_CLIENT_SECRET").ok()),
        google_redirect_uri: non_empty(std::env::var("GOOGLE_REDIRECT_URI").ok()),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

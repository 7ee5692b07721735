use std::env;
use std::path::PathBuf;

/// Sentinel left in unconfigured `.env` templates for the bot token.
pub const BOT_TOKEN_PLACEHOLDER: &str = "TU_TOKEN_AQUI";
/// Sentinel left in unconfigured `.env` templates for the chat id.
pub const CHAT_ID_PLACEHOLDER: &str = "TU_CHAT_ID_AQUI";

pub const DEFAULT_STORE_PATH: &str = "historial_idealista.csv";

#[derive(Debug, Clone, Default)]
pub struct ApiCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

impl TelegramConfig {
    /// Returns the bot token unless it is missing or still the template value.
    pub fn usable_bot_token(&self) -> Option<&str> {
        usable(self.bot_token.as_deref(), BOT_TOKEN_PLACEHOLDER)
    }

    pub fn usable_chat_id(&self) -> Option<&str> {
        usable(self.chat_id.as_deref(), CHAT_ID_PLACEHOLDER)
    }
}

fn usable<'a>(value: Option<&'a str>, placeholder: &str) -> Option<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != placeholder)
}

/// Fixed search parameters. Only the operation and page vary per request.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub base_url: String,
    pub token_url: String,
    pub country: String,
    pub language: String,
    pub max_items: u32,
    pub property_type: String,
    pub order: String,
    pub center: (f64, f64),
    pub distance_m: u32,
    pub sort: String,
    pub location_label: String,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            base_url: "https://api.idealista.com/3.5/".to_string(),
            token_url: "https://api.idealista.com/oauth/token".to_string(),
            country: "es".to_string(),
            language: "es".to_string(),
            max_items: 50,
            property_type: "homes".to_string(),
            order: "priceDown".to_string(),
            center: (39.825749, -0.232300),
            distance_m: 5000,
            sort: "desc".to_string(),
            location_label: "Valencia (5 km radius)".to_string(),
        }
    }
}

impl SearchParams {
    pub fn center_param(&self) -> String {
        format!("{:.6},{:.6}", self.center.0, self.center.1)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: ApiCredentials,
    pub telegram: TelegramConfig,
    pub search: SearchParams,
    pub store_path: PathBuf,
}

impl Settings {
    /// Reads credentials from the environment. Call `dotenv::dotenv()` first
    /// if a `.env` file should be honoured.
    pub fn from_env(store_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials: ApiCredentials {
                client_id: env_var("CLIENT_ID"),
                client_secret: env_var("CLIENT_SECRET"),
            },
            telegram: TelegramConfig {
                bot_token: env_var("TELEGRAM_BOT_TOKEN"),
                chat_id: env_var("TELEGRAM_CHAT_ID"),
                ..TelegramConfig::default()
            },
            search: SearchParams::default(),
            store_path: store_path.into(),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

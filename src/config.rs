use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub nominatim_base: String,
    pub overpass_base: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("OPENAI_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            nominatim_base: std::env::var("NOMINATIM_BASE")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            overpass_base: std::env::var("OVERPASS_BASE")
                .unwrap_or_else(|_| "https://overpass-api.de/api/interpreter".to_string()),
        };

        for (name, url) in [
            ("OPENAI_BASE_URL", &config.openai_base_url),
            ("NOMINATIM_BASE", &config.nominatim_base),
            ("OVERPASS_BASE", &config.overpass_base),
        ] {
            if url.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("OpenAI Base URL: {}", config.openai_base_url);
        tracing::debug!("OpenAI Model: {}", config.openai_model);
        tracing::debug!("Nominatim Base URL: {}", config.nominatim_base);
        tracing::debug!("Overpass Base URL: {}", config.overpass_base);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

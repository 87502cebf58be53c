use super::Config;

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Environment wins over config.toml.
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = non_empty_var("ANTHROPIC_API_KEY") {
            self.anthropic.api_key = Some(key);
        }

        if let Some(model) = non_empty_var("ANTHROPIC_MODEL") {
            self.anthropic.model = model;
        }

        if let Some(provider) = non_empty_var("RESEARCH_PROVIDER") {
            self.research.provider = Some(provider.to_lowercase());
        }

        if let Some(key) = non_empty_var("RESEARCH_API_KEY")
            .or_else(|| non_empty_var("TAVILY_API_KEY"))
            .or_else(|| non_empty_var("SERPER_API_KEY"))
            .or_else(|| non_empty_var("BRAVE_API_KEY"))
        {
            self.research.api_key = Some(key);
        }

        if let Some(model) = non_empty_var("OLLAMA_MODEL") {
            self.ollama.model = Some(model);
        }

        if let Some(host) = non_empty_var("OLLAMA_HOST") {
            self.ollama.host = Some(host);
        }

        if let Some(data_dir) = non_empty_var("GHOSTPOST_DATA_DIR") {
            self.data_dir = data_dir;
        }

        if let Some(grammar) = non_empty_var("GHOSTPOST_GRAMMAR") {
            self.grammar.enabled = !matches!(
                grammar.to_ascii_lowercase().as_str(),
                "off" | "0" | "false" | "no"
            );
        }

        if let Some(port_str) =
            non_empty_var("GHOSTPOST_GATEWAY_PORT").or_else(|| non_empty_var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Some(host) = non_empty_var("GHOSTPOST_GATEWAY_HOST") {
            self.gateway.host = host;
        }
    }
}

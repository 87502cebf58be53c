use crate::config::Config;
use crate::providers::describe_backend;
use crate::research::create_research_provider;
use crate::style::StyleGuide;

pub fn render_status(config: &Config, guide: &StyleGuide) -> String {
    let mut lines = vec![
        format!("◆ {}", t!("status.title")),
        String::new(),
        format!("{}     {}", t!("status.version"), env!("CARGO_PKG_VERSION")),
        format!(
            "{}      {}",
            t!("status.config"),
            config.config_path.display()
        ),
        format!("{}        {}", t!("status.data"), config.data_dir().display()),
        String::new(),
    ];

    match describe_backend(config) {
        Some((kind, model)) => lines.push(format!(
            "  {}     {kind} ({model})",
            t!("status.backend")
        )),
        None if config.generation.template_fallback => lines.push(format!(
            "  {}     {}",
            t!("status.backend"),
            t!("status.template_only")
        )),
        None => lines.push(format!(
            "  {}     {}",
            t!("status.backend"),
            t!("status.unavailable")
        )),
    }

    let research = match (
        config.research.provider.as_deref(),
        create_research_provider(&config.research),
    ) {
        (Some(_), Some(provider)) => provider.name().to_string(),
        (Some(name), None) => format!("{name} ({})", t!("status.missing_key")),
        (None, _) => t!("status.off").to_string(),
    };
    lines.push(format!("  {}    {research}", t!("status.research")));

    let grammar = if config.grammar.enabled {
        format!("{} ({})", config.grammar.endpoint, config.grammar.language)
    } else {
        t!("status.off").to_string()
    };
    lines.push(format!("  {}     {grammar}", t!("status.grammar")));

    lines.push(String::new());
    lines.push(format!(
        "  {}       v{} ({})",
        t!("status.style"),
        guide.version,
        if guide.locked {
            t!("status.locked")
        } else {
            t!("status.unlocked")
        }
    ));
    lines.push(format!(
        "  {}    {}",
        t!("status.examples"),
        guide.examples.len()
    ));
    if let Some(updated_at) = guide.updated_at {
        lines.push(format!(
            "  {}     {}",
            t!("status.updated"),
            updated_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reports_template_only_without_backend() {
        let mut config = Config::default();
        config.anthropic.api_key = None;
        config.ollama.model = None;
        config.research.provider = Some("tavily".into());
        config.research.api_key = None;

        let text = render_status(&config, &StyleGuide::default());
        assert!(text.contains("template"));
        assert!(text.contains("tavily"));
        assert!(text.contains("v1"));
    }

    #[test]
    fn status_names_the_remote_backend() {
        let mut config = Config::default();
        config.anthropic.api_key = Some("sk-ant-test".into());

        let text = render_status(&config, &StyleGuide::default());
        assert!(text.contains("anthropic"));
        assert!(text.contains(&config.anthropic.model));
    }
}

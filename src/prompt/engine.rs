use tera::Tera;

/// Tera-backed engine holding the inline prompt templates.
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    /// Engine with no templates registered.
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
        }
    }

    /// Engine preloaded with `(name, source)` pairs.
    pub fn with_templates(templates: &[(&str, &str)]) -> anyhow::Result<Self> {
        let mut engine = Self::new();
        for (name, content) in templates {
            engine.add_template(name, content)?;
        }
        Ok(engine)
    }

    /// Register a template from a string, replacing any of the same name.
    pub fn add_template(&mut self, name: &str, content: &str) -> anyhow::Result<()> {
        self.tera.add_raw_template(name, content)?;
        Ok(())
    }

    /// Render a named template with the given context.
    pub fn render(&self, template_name: &str, context: &tera::Context) -> anyhow::Result<String> {
        let rendered = self.tera.render(template_name, context)?;
        Ok(rendered)
    }
}

impl Default for TeraEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Context;

    #[test]
    fn unknown_template_fails() {
        let engine = TeraEngine::new();
        assert!(engine.render("nonexistent", &Context::new()).is_err());
    }

    #[test]
    fn missing_variable_fails() {
        let engine = TeraEngine::with_templates(&[("greeting", "Hello, {{ name }}!")]).unwrap();
        assert!(engine.render("greeting", &Context::new()).is_err());
    }

    #[test]
    fn loops_and_conditionals_render() {
        let engine = TeraEngine::with_templates(&[(
            "list",
            "{% if title %}{{ title }}\n{% endif %}{% for item in items %}- {{ item }}\n{% endfor %}",
        )])
        .unwrap();

        let mut ctx = Context::new();
        ctx.insert("title", "Facts:");
        ctx.insert("items", &vec!["alpha", "beta"]);
        assert_eq!(engine.render("list", &ctx).unwrap(), "Facts:\n- alpha\n- beta\n");
    }

    #[test]
    fn plain_names_are_not_html_escaped() {
        let engine = TeraEngine::with_templates(&[("t", "{{ v }}")]).unwrap();
        let mut ctx = Context::new();
        ctx.insert("v", "Q&A <1/3>");
        assert_eq!(engine.render("t", &ctx).unwrap(), "Q&A <1/3>");
    }

    #[test]
    fn invalid_template_is_rejected() {
        let mut engine = TeraEngine::new();
        assert!(engine.add_template("bad", "{% for x in %}").is_err());
    }
}

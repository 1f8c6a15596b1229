//! src/templates.rs
//!
//! Handlebars engine with the display helpers registered under the names
//! the templates use. Helpers are pure; everything request-specific
//! arrives through the context.

use crate::social::filters;
use handlebars::{handlebars_helper, Handlebars};

handlebars_helper!(backend_name: |key: String| filters::backend_name(&key));
handlebars_helper!(backend_class: |key: String| filters::backend_class(&key));
handlebars_helper!(icon_name: |key: String| filters::icon_name(&key));
handlebars_helper!(social_backends: |keys: Vec<String>| filters::social_backends(&keys));
handlebars_helper!(legacy_backends: |keys: Vec<String>| filters::legacy_backends(&keys));
handlebars_helper!(oauth_backends: |keys: Vec<String>| filters::oauth_backends(&keys));
handlebars_helper!(filter_backends: |keys: Vec<String>, allowed: Vec<String>|
    filters::filter_backends(&keys, &allowed));
handlebars_helper!(slice_by: |keys: Vec<String>, size: u64|
    filters::slice_by(&keys, size as usize));

pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self, handlebars::TemplateError> {
        let mut handlebars = Handlebars::new();

        handlebars.register_helper("backend_name", Box::new(backend_name));
        handlebars.register_helper("backend_class", Box::new(backend_class));
        handlebars.register_helper("icon_name", Box::new(icon_name));
        handlebars.register_helper("social_backends", Box::new(social_backends));
        handlebars.register_helper("legacy_backends", Box::new(legacy_backends));
        handlebars.register_helper("oauth_backends", Box::new(oauth_backends));
        handlebars.register_helper("filter_backends", Box::new(filter_backends));
        handlebars.register_helper("slice_by", Box::new(slice_by));

        handlebars.register_template_string("home", include_str!("../templates/home.hbs"))?;

        Ok(Self { handlebars })
    }

    pub fn render(
        &self,
        name: &str,
        context: &serde_json::Value,
    ) -> Result<String, handlebars::RenderError> {
        self.handlebars.render(name, context)
    }
}

#[cfg(test)]
impl TemplateEngine {
    fn render_inline(
        &self,
        source: &str,
        context: &serde_json::Value,
    ) -> Result<String, handlebars::RenderError> {
        self.handlebars.render_template(source, context)
    }
}

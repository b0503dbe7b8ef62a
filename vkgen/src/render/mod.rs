//! Renderer module: trait-based format dispatch.

pub mod json;
pub mod markdown;

use anyhow::{anyhow, Result};
use vkgen_registry::ResolvedModel;

/// Trait for rendering a resolved model into a specific output format.
pub trait Renderer {
    fn render(&self, model: &ResolvedModel) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use markdown or json", format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_formats() {
        assert_eq!(create_renderer("md").unwrap().file_extension(), "md");
        assert_eq!(create_renderer("json").unwrap().file_extension(), "json");
    }

    #[test]
    fn unknown_format_names_the_choices() {
        let err = create_renderer("html").err().unwrap();
        assert_eq!(err.to_string(), "unknown format: html. Use markdown or json");
    }
}

//! JSON renderer: the resolved model as pretty-printed `serde_json`.

use crate::render::Renderer;
use anyhow::{Context, Result};
use vkgen_registry::ResolvedModel;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, model: &ResolvedModel) -> Result<String> {
        let mut out = serde_json::to_string_pretty(model).context("failed to serialize model")?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

//! `<enums>` blocks: one enum type each, or the reserved constants block.

use super::{elements, required_attr, ParserState};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result, Section};
use crate::ident;
use crate::model::{Category, DependencyNode, EnumPayload};
use roxmltree::Node;
use std::collections::BTreeSet;
use tracing::debug;

/// Literal naming for enum `name` (prefix already stripped).
///
/// `ImageType` → prefix `VK_IMAGE_TYPE_`. Bitmask enums take the part before
/// `FlagBits` and cut member names at `Bit`. A tag at the end of the prefix
/// is moved out: `ColorSpaceKHR` → prefix `VK_COLOR_SPACE_`, tag `KHR`.
pub(crate) fn derive_enum(
    config: &RegistryConfig,
    tags: &BTreeSet<String>,
    name: &str,
    is_bitmask: bool,
) -> Result<EnumPayload, String> {
    if name == config.status_type {
        return Ok(EnumPayload::new(false, config.status_literal_prefix(), ""));
    }

    let (base, postfix) = if is_bitmask {
        let pos = name
            .find("FlagBits")
            .ok_or_else(|| format!("bitmask enum `{}` does not contain `FlagBits`", name))?;
        (&name[..pos], "Bit")
    } else {
        (name, "")
    };

    let body = format!("{}_{}", config.literal_prefix, ident::to_macro_case(base));
    let mut payload = EnumPayload::new(is_bitmask, format!("{}_", body), postfix);
    if let Some(tag) = ident::find_tag(&body, tags) {
        payload.prefix = body[..body.len() - tag.len()].to_string();
        payload.tag = Some(tag.to_string());
    }
    Ok(payload)
}

pub(crate) fn read_enums(state: &mut ParserState, node: Node) -> Result<()> {
    let raw_name = required_attr(node, "name", Section::Enums, "enums")?;
    if raw_name == state.config.constants_block {
        return read_constants(state, node);
    }
    let name = state.type_name(raw_name);

    let is_bitmask = if name == state.config.status_type {
        false
    } else {
        match required_attr(node, "type", Section::Enums, &name)? {
            "bitmask" => true,
            "enum" => false,
            other => {
                return Err(RegistryError::malformed(
                    Section::Enums,
                    &name,
                    format!("unknown enum type `{}`", other),
                ))
            }
        }
    };

    let mut payload = derive_enum(state.config, &state.registry.tags, &name, is_bitmask)
        .map_err(|reason| RegistryError::malformed(Section::Enums, &name, reason))?;
    let tag = payload.tag.clone();

    for value in elements(node) {
        match value.tag_name().name() {
            "enum" => {
                let literal = required_attr(value, "name", Section::Enums, &name)?;
                payload
                    .push_literal(literal, tag.as_deref())
                    .map_err(|e| RegistryError::malformed(Section::Enums, &name, e.to_string()))?;
            }
            "unused" => {}
            other => {
                return Err(RegistryError::malformed(
                    Section::Enums,
                    &name,
                    format!("unexpected <{}> in enums block", other),
                ))
            }
        }
    }

    if !state.registry.push_node(DependencyNode::new(Category::Enum, &name)) {
        return Err(RegistryError::malformed(Section::Enums, name, "declared twice"));
    }
    debug!(%name, members = payload.members.len(), "read enum");
    state.registry.enums.insert(name, payload);
    Ok(())
}

fn read_constants(state: &mut ParserState, node: Node) -> Result<()> {
    for constant in elements(node).filter(|c| c.has_tag_name("enum")) {
        let name = required_attr(constant, "name", Section::Enums, &state.config.constants_block)?;
        let value = constant
            .attribute("value")
            .or_else(|| constant.attribute("alias"))
            .unwrap_or("");
        state
            .registry
            .constants
            .insert(name.to_string(), value.to_string());
    }
    Ok(())
}

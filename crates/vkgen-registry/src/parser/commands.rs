//! `<commands>` section and handle/method linking.

use super::{child_text, elements, member::read_member, ParserState};
use crate::error::{IdentError, RegistryError, Result, Section};
use crate::ident;
use crate::model::{Category, CommandPayload, DependencyNode, Registry};
use roxmltree::Node;
use std::collections::BTreeSet;
use tracing::debug;

/// `optional` value marking a count parameter queried before its array.
const TWO_STEP_MARKER: &str = "false,true";

pub(crate) fn read_commands(state: &mut ParserState, node: Node) -> Result<()> {
    for command in elements(node) {
        if !command.has_tag_name("command") {
            return Err(RegistryError::malformed(
                Section::Commands,
                command.tag_name().name(),
                "expected <command>",
            ));
        }
        read_command(state, command)?;
    }
    Ok(())
}

/// `VK_ERROR_SURFACE_LOST_KHR` → `eErrorSurfaceLostKHR`.
pub(crate) fn success_code_name(
    code: &str,
    tags: &BTreeSet<String>,
    literal_prefix: &str,
) -> Result<String, IdentError> {
    let tag = ident::find_tag(code, tags);
    let root = ident::strip(code, literal_prefix, tag)?;
    Ok(format!("e{}{}", ident::to_camel_case(&root)?, tag.unwrap_or("")))
}

fn read_command(state: &mut ParserState, node: Node) -> Result<()> {
    let proto = node
        .children()
        .find(|c| c.has_tag_name("proto"))
        .ok_or_else(|| RegistryError::malformed(Section::Commands, "command", "missing <proto>"))?;
    let raw_name = child_text(proto, "name").ok_or_else(|| {
        RegistryError::malformed(Section::Commands, "command", "<proto> without <name>")
    })?;
    let name = ident::strip_command(raw_name, &state.config.command_prefix)
        .map_err(|e| RegistryError::malformed(Section::Commands, raw_name, e.to_string()))?;
    let return_type = child_text(proto, "type")
        .map(|t| state.type_name(t))
        .ok_or_else(|| RegistryError::malformed(Section::Commands, &name, "<proto> without <type>"))?;

    let mut payload = CommandPayload::new(return_type);

    let literal_prefix = state.config.status_literal_prefix();
    let codes: Vec<String> = match node.attribute("successcodes") {
        Some(list) => list.split(',').map(|c| c.trim().to_string()).collect(),
        None => match state.config.exceptions.success_codes_for(raw_name) {
            Some(codes) => {
                debug!(command = %name, "success codes from exception table");
                codes.to_vec()
            }
            None => Vec::new(),
        },
    };
    for code in codes.iter().filter(|c| !c.is_empty()) {
        let binding = success_code_name(code, &state.registry.tags, &literal_prefix)
            .map_err(|e| RegistryError::malformed(Section::Commands, &name, e.to_string()))?;
        payload.success_codes.push(binding);
    }

    let mut marked: Vec<String> = Vec::new();
    for child in elements(node) {
        match child.tag_name().name() {
            "proto" => {}
            "param" => {
                let param = read_member(child, &state.config.type_prefix)
                    .map_err(|reason| RegistryError::malformed(Section::Commands, &name, reason))?;
                if child.attribute("optional") == Some(TWO_STEP_MARKER) {
                    marked.push(param.name.clone());
                }
                payload.parameters.push(param);
            }
            "implicitexternsyncparams" | "validity" => {}
            other => {
                return Err(RegistryError::malformed(
                    Section::Commands,
                    &name,
                    format!("unexpected <{}> in command", other),
                ))
            }
        }
    }
    // the marker only counts on a parameter that sizes another one
    payload.is_two_step = payload.parameters.iter().any(|p| {
        p.length_expr
            .as_deref()
            .and_then(|len| len.split(',').next())
            .is_some_and(|count| marked.iter().any(|m| m == count))
    });
    if !payload.is_two_step && state.config.exceptions.forces_two_step(raw_name) {
        debug!(command = %name, "two-step from exception table");
        payload.is_two_step = true;
    }

    let deps: Vec<String> = std::iter::once(payload.return_type.clone())
        .chain(payload.parameters.iter().map(|p| p.pure_type.clone()))
        .collect();
    if !state
        .registry
        .push_node(DependencyNode::new(Category::Command, &name).with_dependencies(deps))
    {
        return Err(RegistryError::malformed(Section::Commands, name, "declared twice"));
    }
    state.registry.commands.insert(name, payload);
    Ok(())
}

/// Commands whose first parameter is a handle become that handle's methods.
///
/// The receiver stops being an ordering edge of the command; the handle in
/// turn lists the command, in registry order.
pub(crate) fn link_methods(registry: &mut Registry) {
    let links: Vec<(String, String)> = registry
        .nodes
        .iter()
        .filter(|n| n.category == Category::Command)
        .filter_map(|n| {
            let first = registry.commands.get(&n.name)?.parameters.first()?;
            registry
                .handles
                .contains_key(&first.pure_type)
                .then(|| (n.name.clone(), first.pure_type.clone()))
        })
        .collect();

    for (command, handle) in links {
        if let Some(payload) = registry.commands.get_mut(&command) {
            payload.handle = Some(handle.clone());
            payload.is_method = true;
        }
        if let Some(node) = registry.node_mut(&command) {
            node.dependencies.remove(&handle);
        }
        if let Some(h) = registry.handles.get_mut(&handle) {
            h.commands.push(command);
        }
    }
}

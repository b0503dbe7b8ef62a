//! `<extensions>` section.
//!
//! Extensions only annotate entities declared elsewhere, so reading them
//! produces [`ExtensionPatch`]es. The patches are applied in document order
//! after every section has been read.

use super::{elements, required_attr, ParserState};
use crate::error::{RegistryError, Result, Section};
use crate::ident;
use crate::model::{Category, ExtensionData, Registry};
use roxmltree::Node;
use tracing::debug;

/// One effect of a supported extension's `<require>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionPatch {
    RequireCommand {
        extension: String,
        command: String,
        guard: Option<String>,
    },
    RequireType {
        extension: String,
        name: String,
        guard: Option<String>,
    },
    AppendLiteral {
        extension: String,
        enum_name: String,
        literal: String,
        tag: Option<String>,
    },
}

pub(crate) fn read_extensions(state: &mut ParserState, node: Node) -> Result<()> {
    for ext in elements(node) {
        if !ext.has_tag_name("extension") {
            return Err(RegistryError::malformed(
                Section::Extensions,
                ext.tag_name().name(),
                "expected <extension>",
            ));
        }
        read_extension(state, ext)?;
    }
    Ok(())
}

fn read_extension(state: &mut ParserState, ext: Node) -> Result<()> {
    let name = required_attr(ext, "name", Section::Extensions, "extension")?.to_string();
    let tag = ident::extract_extension_tag(&name)
        .map_err(|e| RegistryError::malformed(Section::Extensions, &name, e.to_string()))?;
    let supported = required_attr(ext, "supported", Section::Extensions, &name)?.to_string();
    let number = match ext.attribute("number") {
        Some(n) => Some(n.parse::<u32>().map_err(|_| {
            RegistryError::malformed(Section::Extensions, &name, format!("bad extension number `{}`", n))
        })?),
        None => None,
    };
    let mut data = ExtensionData {
        name,
        number,
        tag,
        protect: ext.attribute("protect").map(str::to_string),
        supported,
        requires: Vec::new(),
    };

    if data.is_disabled() {
        debug!(extension = %data.name, "skipping disabled extension");
        state.registry.extensions.push(data);
        return Ok(());
    }

    for require in elements(ext) {
        if !require.has_tag_name("require") {
            return Err(RegistryError::malformed(
                Section::Extensions,
                &data.name,
                format!("unexpected <{}> in extension", require.tag_name().name()),
            ));
        }
        read_require(state, &mut data, require)?;
    }
    state.registry.extensions.push(data);
    Ok(())
}

fn read_require(state: &mut ParserState, data: &mut ExtensionData, require: Node) -> Result<()> {
    for item in elements(require) {
        match item.tag_name().name() {
            "command" => {
                let raw = required_attr(item, "name", Section::Extensions, &data.name)?;
                let command = ident::strip_command(raw, &state.config.command_prefix)
                    .map_err(|e| RegistryError::malformed(Section::Extensions, &data.name, e.to_string()))?;
                data.requires.push(command.clone());
                state.patches.push(ExtensionPatch::RequireCommand {
                    extension: data.name.clone(),
                    command,
                    guard: data.protect.clone(),
                });
            }
            "type" => {
                let name = state.type_name(required_attr(item, "name", Section::Extensions, &data.name)?);
                data.requires.push(name.clone());
                state.patches.push(ExtensionPatch::RequireType {
                    extension: data.name.clone(),
                    name,
                    guard: data.protect.clone(),
                });
            }
            "enum" => {
                let Some(extends) = item.attribute("extends") else {
                    // extension-local constant, not a member of any type
                    continue;
                };
                let literal = required_attr(item, "name", Section::Extensions, &data.name)?;
                let forms = ["offset", "bitpos", "value"]
                    .iter()
                    .filter(|a| item.attribute(**a).is_some())
                    .count();
                if forms != 1 {
                    return Err(RegistryError::malformed(
                        Section::Extensions,
                        &data.name,
                        format!("`{}` needs exactly one of offset, bitpos, value", literal),
                    ));
                }
                let tag = item.attribute("offset").map(|_| data.tag.clone());
                let enum_name = state.type_name(extends);
                state.patches.push(ExtensionPatch::AppendLiteral {
                    extension: data.name.clone(),
                    enum_name,
                    literal: literal.to_string(),
                    tag,
                });
            }
            "usage" => {}
            other => {
                return Err(RegistryError::malformed(
                    Section::Extensions,
                    &data.name,
                    format!("unexpected <{}> in require", other),
                ))
            }
        }
    }
    Ok(())
}

// -- Patch application --------------------------------------------------------

pub(crate) fn apply_patches(registry: &mut Registry, patches: Vec<ExtensionPatch>) -> Result<()> {
    let count = patches.len();
    for patch in patches {
        match patch {
            ExtensionPatch::RequireCommand {
                extension,
                command,
                guard,
            } => {
                let payload = registry.commands.get_mut(&command).ok_or_else(|| {
                    RegistryError::malformed(
                        Section::Extensions,
                        &extension,
                        format!("requires unknown command `{}`", command),
                    )
                })?;
                if guard.is_some() {
                    payload.protect = guard;
                }
            }
            ExtensionPatch::RequireType {
                extension,
                name,
                guard,
            } => attach_type_guard(registry, &extension, &name, guard)?,
            ExtensionPatch::AppendLiteral {
                extension,
                enum_name,
                literal,
                tag,
            } => {
                let payload = registry.enums.get_mut(&enum_name).ok_or_else(|| {
                    RegistryError::malformed(
                        Section::Extensions,
                        &extension,
                        format!("extends unknown enum `{}`", enum_name),
                    )
                })?;
                payload
                    .push_literal(&literal, tag.as_deref())
                    .map_err(|e| RegistryError::malformed(Section::Extensions, &extension, e.to_string()))?;
            }
        }
    }
    debug!(count, "applied extension patches");
    Ok(())
}

fn attach_type_guard(
    registry: &mut Registry,
    extension: &str,
    name: &str,
    guard: Option<String>,
) -> Result<()> {
    let category = registry.category_of(name).ok_or_else(|| {
        RegistryError::malformed(
            Section::Extensions,
            extension,
            format!("requires unknown type `{}`", name),
        )
    })?;
    let Some(guard) = guard else {
        return Ok(());
    };

    match category {
        Category::Enum => {
            if let Some(e) = registry.enums.get_mut(name) {
                e.protect = Some(guard);
            }
        }
        Category::Flags => {
            let Some(flags) = registry.flags.get_mut(name) else {
                return Ok(());
            };
            flags.protect = Some(guard.clone());
            let enum_name = flags.enum_name.clone();
            // a mask with no bits yet is emitted together with its bit enum
            if let Some(bits) = registry.enums.get_mut(&enum_name) {
                if bits.members.is_empty() {
                    bits.protect = Some(guard);
                }
            }
        }
        Category::Handle => {
            if let Some(h) = registry.handles.get_mut(name) {
                h.protect = Some(guard);
            }
        }
        Category::Scalar => {
            if let Some(s) = registry.scalars.get_mut(name) {
                s.protect = Some(guard);
            }
        }
        Category::Struct | Category::Union => {
            if let Some(s) = registry.structs.get_mut(name) {
                s.protect = Some(guard);
            }
        }
        Category::FuncPointer | Category::RequiredAlias => {
            debug!(%name, %extension, "no guard slot for {}", category);
        }
        Category::Command => {
            return Err(RegistryError::malformed(
                Section::Extensions,
                extension,
                format!("`{}` is a command, required as a type", name),
            ))
        }
    }
    Ok(())
}

//! `<types>` section.

use super::{child_text, elements, member::read_member, required_attr, ParserState};
use crate::error::{RegistryError, Result, Section};
use crate::model::{
    Category, DependencyNode, FlagsPayload, HandlePayload, ScalarPayload, StructPayload,
};
use roxmltree::Node;
use tracing::debug;

const HEADER_VERSION_DEFINE: &str = "VK_HEADER_VERSION";

pub(crate) fn read_types(state: &mut ParserState, node: Node) -> Result<()> {
    for ty in elements(node) {
        if !ty.has_tag_name("type") {
            return Err(RegistryError::malformed(
                Section::Types,
                ty.tag_name().name(),
                "expected <type>",
            ));
        }
        match ty.attribute("category") {
            Some("basetype") => read_basetype(state, ty)?,
            Some("bitmask") => read_bitmask(state, ty)?,
            Some("define") => read_define(state, ty),
            Some("funcpointer") => read_funcpointer(state, ty)?,
            Some("handle") => read_handle(state, ty)?,
            Some("struct") => read_struct(state, ty, false)?,
            Some("union") => read_struct(state, ty, true)?,
            // enum types are declared by their <enums> block
            Some("enum") | Some("include") => {}
            Some(other) => {
                return Err(RegistryError::malformed(
                    Section::Types,
                    ty.attribute("name").unwrap_or(other),
                    format!("unknown type category `{}`", other),
                ))
            }
            None => read_required(state, ty)?,
        }
    }
    Ok(())
}

fn push(state: &mut ParserState, node: DependencyNode) -> Result<()> {
    let name = node.name.clone();
    if state.registry.push_node(node) {
        Ok(())
    } else {
        Err(RegistryError::malformed(Section::Types, name, "declared twice"))
    }
}

/// `<name>` child, falling back to the `name` attribute.
fn type_name<'a>(ty: Node<'a, '_>) -> Result<&'a str> {
    child_text(ty, "name")
        .or_else(|| ty.attribute("name"))
        .ok_or_else(|| {
            RegistryError::malformed(
                Section::Types,
                ty.attribute("category").unwrap_or("type"),
                "type without a name",
            )
        })
}

fn read_basetype(state: &mut ParserState, ty: Node) -> Result<()> {
    let name = state.type_name(type_name(ty)?);
    if name == state.config.flags_primitive {
        debug!(%name, "skipping flags primitive");
        return Ok(());
    }
    let underlying = child_text(ty, "type")
        .ok_or_else(|| RegistryError::malformed(Section::Types, &name, "basetype without <type>"))?
        .to_string();
    push(
        state,
        DependencyNode::new(Category::Scalar, &name).with_dependencies([underlying.clone()]),
    )?;
    state.registry.scalars.insert(
        name,
        ScalarPayload {
            underlying,
            protect: None,
        },
    );
    Ok(())
}

fn read_bitmask(state: &mut ParserState, ty: Node) -> Result<()> {
    let name = state.type_name(type_name(ty)?);
    let enum_name = match ty.attribute("requires") {
        Some(requires) => state.type_name(requires),
        None => synthesize_bits_enum(state, &name)?,
    };
    push(
        state,
        DependencyNode::new(Category::Flags, &name).with_dependencies([enum_name.clone()]),
    )?;
    state.registry.flags.insert(
        name,
        FlagsPayload {
            enum_name,
            protect: None,
        },
    );
    Ok(())
}

/// A mask with no declared bits still needs a bit enum to name: `FooFlags`
/// gets an empty `FooFlagBits`.
fn synthesize_bits_enum(state: &mut ParserState, flags: &str) -> Result<String> {
    let pos = flags.rfind("Flags").ok_or_else(|| {
        RegistryError::malformed(Section::Types, flags, "bitmask name does not contain `Flags`")
    })?;
    let enum_name = format!("{}FlagBits{}", &flags[..pos], &flags[pos + "Flags".len()..]);
    let payload = super::enums::derive_enum(state.config, &state.registry.tags, &enum_name, true)
        .map_err(|reason| RegistryError::malformed(Section::Types, flags, reason))?;
    push(state, DependencyNode::new(Category::Enum, &enum_name))?;
    debug!(%flags, %enum_name, "synthesized empty bit enum");
    state.registry.enums.insert(enum_name.clone(), payload);
    Ok(enum_name)
}

fn read_define(state: &mut ParserState, ty: Node) {
    if child_text(ty, "name") != Some(HEADER_VERSION_DEFINE) {
        return;
    }
    let version = ty
        .children()
        .filter(|c| c.is_text())
        .last()
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(version) = version {
        debug!(%version, "header version");
        state.registry.header_version = Some(version.to_string());
    }
}

fn read_funcpointer(state: &mut ParserState, ty: Node) -> Result<()> {
    let name = type_name(ty)?.to_string();
    push(state, DependencyNode::new(Category::FuncPointer, name))
}

fn read_handle(state: &mut ParserState, ty: Node) -> Result<()> {
    let name = state.type_name(type_name(ty)?);
    let define = child_text(ty, "type").unwrap_or("");
    if !define.starts_with("VK_DEFINE") {
        return Err(RegistryError::malformed(
            Section::Types,
            &name,
            format!("unexpected handle definition `{}`", define),
        ));
    }
    push(state, DependencyNode::new(Category::Handle, &name))?;
    state.registry.handles.insert(
        name,
        HandlePayload {
            dispatchable: define == "VK_DEFINE_HANDLE",
            ..Default::default()
        },
    );
    Ok(())
}

fn read_struct(state: &mut ParserState, ty: Node, is_union: bool) -> Result<()> {
    let name = state.type_name(required_attr(ty, "name", Section::Types, "struct")?);
    if state.config.exceptions.skips_struct(&name) {
        debug!(%name, "skipping excluded struct");
        return Ok(());
    }

    let mut payload = StructPayload {
        is_union,
        returned_only: ty.attribute("returnedonly") == Some("true"),
        ..Default::default()
    };
    for child in elements(ty) {
        match child.tag_name().name() {
            "member" => {
                let member = read_member(child, &state.config.type_prefix)
                    .map_err(|reason| RegistryError::malformed(Section::Types, &name, reason))?;
                payload.members.push(member);
            }
            "validity" => {}
            other => {
                return Err(RegistryError::malformed(
                    Section::Types,
                    &name,
                    format!("unexpected <{}> in struct", other),
                ))
            }
        }
    }

    // a struct pointing at itself (pNext-style chains) is not an ordering edge
    let deps = payload
        .members
        .iter()
        .map(|m| m.pure_type.clone())
        .filter(|t| *t != name);
    let category = if is_union { Category::Union } else { Category::Struct };
    push(state, DependencyNode::new(category, &name).with_dependencies(deps))?;
    state.registry.structs.insert(name, payload);
    Ok(())
}

fn read_required(state: &mut ParserState, ty: Node) -> Result<()> {
    let name = required_attr(ty, "name", Section::Types, "type")?.to_string();
    push(state, DependencyNode::new(Category::RequiredAlias, name))
}

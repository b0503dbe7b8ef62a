//! Registry parser: one pass per section, dispatched by element name.
//!
//! The `<tags>` section is read first regardless of where it sits, since
//! enum prefixes depend on it. Everything that reaches across sections
//! (method linking, extension patches, reference checks) runs after the
//! walk, once every entity exists.

pub mod commands;
pub mod enums;
pub mod extensions;
pub mod member;
pub mod types;

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result, Section};
use crate::model::{Category, Registry};
use extensions::ExtensionPatch;
use roxmltree::{Document, Node};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Top-level sections carrying nothing the model needs.
const IGNORED_SECTIONS: &[&str] = &["comment", "feature", "vendorids", "platforms"];

// -- Parser state -------------------------------------------------------------

pub(crate) struct ParserState<'c> {
    pub config: &'c RegistryConfig,
    pub registry: Registry,
    pub patches: Vec<ExtensionPatch>,
}

impl<'c> ParserState<'c> {
    fn new(config: &'c RegistryConfig) -> Self {
        let mut registry = Registry::default();
        registry.tags = config.builtin_tags.iter().cloned().collect();
        ParserState {
            config,
            registry,
            patches: Vec::new(),
        }
    }

    /// Strip the type prefix: `VkImage` → `Image`.
    pub fn type_name(&self, raw: &str) -> String {
        raw.strip_prefix(self.config.type_prefix.as_str())
            .unwrap_or(raw)
            .to_string()
    }
}

// -- Public API ---------------------------------------------------------------

/// Parse a registry document into a fully patched, reference-checked model.
pub fn parse_registry(xml: &str, config: &RegistryConfig) -> Result<Registry> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    if root.tag_name().name() != "registry" {
        return Err(RegistryError::malformed(
            Section::Registry,
            root.tag_name().name(),
            "root element must be <registry>",
        ));
    }

    let mut state = ParserState::new(config);

    for section in elements(root).filter(|n| n.has_tag_name("tags")) {
        read_tags(&mut state, section)?;
    }

    for section in elements(root) {
        match section.tag_name().name() {
            "tags" => {}
            "types" => types::read_types(&mut state, section)?,
            "enums" => enums::read_enums(&mut state, section)?,
            "commands" => commands::read_commands(&mut state, section)?,
            "extensions" => extensions::read_extensions(&mut state, section)?,
            other if IGNORED_SECTIONS.contains(&other) => {}
            other => {
                return Err(RegistryError::malformed(
                    Section::Registry,
                    other,
                    "unknown registry section",
                ))
            }
        }
    }

    let ParserState {
        mut registry,
        patches,
        ..
    } = state;

    commands::link_methods(&mut registry);
    extensions::apply_patches(&mut registry, patches)?;
    validate(&registry, config)?;

    info!(
        nodes = registry.nodes.len(),
        commands = registry.commands.len(),
        enums = registry.enums.len(),
        structs = registry.structs.len(),
        "parsed registry"
    );
    Ok(registry)
}

// -- Helpers ------------------------------------------------------------------

/// Child elements, skipping text, XML comments and `<comment>` elements.
pub(crate) fn elements<'a, 'i>(node: Node<'a, 'i>) -> impl Iterator<Item = Node<'a, 'i>> {
    node.children()
        .filter(|c| c.is_element() && !c.has_tag_name("comment"))
}

/// A required attribute, or a malformed-registry error naming it.
pub(crate) fn required_attr<'a>(
    node: Node<'a, '_>,
    attr: &str,
    section: Section,
    entity: &str,
) -> Result<&'a str> {
    node.attribute(attr).ok_or_else(|| {
        RegistryError::malformed(
            section,
            entity,
            format!("<{}> is missing the `{}` attribute", node.tag_name().name(), attr),
        )
    })
}

/// Text of the first child element named `tag`.
pub(crate) fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.has_tag_name(tag))
        .and_then(|c| c.text())
        .map(str::trim)
}

fn read_tags(state: &mut ParserState, node: Node) -> Result<()> {
    for tag in elements(node) {
        let name = required_attr(tag, "name", Section::Tags, "tag")?;
        state.registry.tags.insert(name.to_string());
    }
    debug!(count = state.registry.tags.len(), "read tags");
    Ok(())
}

// -- Post-parse validation ----------------------------------------------------

fn section_of(category: Category) -> Section {
    match category {
        Category::Command => Section::Commands,
        Category::Enum => Section::Enums,
        Category::Flags
        | Category::FuncPointer
        | Category::Handle
        | Category::RequiredAlias
        | Category::Scalar
        | Category::Struct
        | Category::Union => Section::Types,
    }
}

/// Every edge must land on a parsed entity or a seed name, and every success
/// code must name a member of the status enum.
fn validate(registry: &Registry, config: &RegistryConfig) -> Result<()> {
    let seeds: BTreeSet<String> = config.seed_names().into_iter().collect();

    for node in &registry.nodes {
        if let Some(unknown) = node
            .dependencies
            .iter()
            .find(|d| !registry.contains(d) && !seeds.contains(*d))
        {
            return Err(RegistryError::malformed(
                section_of(node.category),
                &node.name,
                format!("references unknown type `{}`", unknown),
            ));
        }
    }

    let status = registry.enums.get(&config.status_type);
    for (name, command) in &registry.commands {
        for code in &command.success_codes {
            let known = status.is_some_and(|e| e.has_member(code));
            if !known {
                return Err(RegistryError::ambiguous(
                    name,
                    format!("success code `{}` is not a member of {}", code, config.status_type),
                ));
            }
        }
    }
    Ok(())
}

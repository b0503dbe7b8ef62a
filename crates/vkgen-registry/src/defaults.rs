//! Default values per entity.
//!
//! A missing default is data, not an error. Every struct and union still
//! value-initializes, but one holding a by-value member without a default
//! gets no default constructor. That fact is tracked next to the values and
//! does not spread to aggregates embedding it.

use crate::error::{RegistryError, Result, Section};
use crate::model::{Category, DependencyNode, Registry};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    /// First member of an enum: `ImageType::e1D`.
    EnumMember(String),
    /// Value-initialization: `Extent2D()`.
    ZeroInit,
    /// The literal `0`.
    Zero,
}

impl DefaultValue {
    /// Source expression for an entity named `entity`.
    pub fn expression(&self, entity: &str) -> String {
        match self {
            DefaultValue::EnumMember(member) => format!("{}::{}", entity, member),
            DefaultValue::ZeroInit => format!("{}()", entity),
            DefaultValue::Zero => "0".to_string(),
        }
    }
}

/// Entity name → default, `None` where no default is available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefaultValues {
    values: BTreeMap<String, Option<DefaultValue>>,
    /// Aggregates with a member that cannot be defaulted.
    without_default_constructor: BTreeSet<String>,
}

impl DefaultValues {
    pub fn get(&self, name: &str) -> Option<&DefaultValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Whether `name` was visited at all (commands never are).
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// `Some(false)` for a struct or union whose members cannot all be
    /// defaulted; `None` for names that are not aggregates.
    pub fn has_default_constructor(&self, registry: &Registry, aggregate: &str) -> Option<bool> {
        registry.structs.get(aggregate)?;
        Some(!self.without_default_constructor.contains(aggregate))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&DefaultValue>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One pass over `sorted`. Every member type is visited before the
/// aggregate holding it; `seeds` count as raw mask values defaulting to `0`.
pub fn synthesize_defaults(
    sorted: &[DependencyNode],
    registry: &Registry,
    seeds: &[String],
) -> Result<DefaultValues> {
    let mut values: BTreeMap<String, Option<DefaultValue>> = seeds
        .iter()
        .map(|s| (s.clone(), Some(DefaultValue::Zero)))
        .collect();
    let mut without_default_constructor = BTreeSet::new();

    for node in sorted {
        let value = match node.category {
            Category::Command => continue,
            Category::Enum => {
                let payload = registry
                    .enums
                    .get(&node.name)
                    .ok_or_else(|| missing_payload(Section::Enums, node))?;
                Some(match payload.members.first() {
                    Some(first) => DefaultValue::EnumMember(first.name.clone()),
                    None => DefaultValue::ZeroInit,
                })
            }
            Category::Flags | Category::Handle => Some(DefaultValue::ZeroInit),
            Category::Struct | Category::Union => {
                let payload = registry
                    .structs
                    .get(&node.name)
                    .ok_or_else(|| missing_payload(Section::Types, node))?;
                let blocker = payload.members.iter().find(|m| {
                    !m.is_pointer() && !values.get(&m.pure_type).is_some_and(Option::is_some)
                });
                if let Some(member) = blocker {
                    debug!(aggregate = %node.name, member = %member.name, "no default constructor");
                    without_default_constructor.insert(node.name.clone());
                }
                Some(DefaultValue::ZeroInit)
            }
            Category::FuncPointer => None,
            Category::RequiredAlias | Category::Scalar => Some(DefaultValue::Zero),
        };
        values.insert(node.name.clone(), value);
    }

    Ok(DefaultValues {
        values,
        without_default_constructor,
    })
}

fn missing_payload(section: Section, node: &DependencyNode) -> RegistryError {
    RegistryError::malformed(section, &node.name, format!("{} node without payload", node.category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnumPayload, Member, StructPayload};

    fn member(raw_type: &str, name: &str) -> Member {
        Member {
            raw_type: raw_type.to_string(),
            pure_type: raw_type.trim_end_matches('*').to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn add_struct(reg: &mut Registry, sorted: &mut Vec<DependencyNode>, name: &str, members: Vec<Member>) {
        let node = DependencyNode::new(Category::Struct, name)
            .with_dependencies(members.iter().map(|m| m.pure_type.clone()));
        reg.push_node(node.clone());
        sorted.push(node);
        reg.structs.insert(
            name.to_string(),
            StructPayload {
                members,
                ..Default::default()
            },
        );
    }

    fn add(reg: &mut Registry, sorted: &mut Vec<DependencyNode>, category: Category, name: &str) {
        let node = DependencyNode::new(category, name);
        reg.push_node(node.clone());
        sorted.push(node);
    }

    #[test]
    fn per_category_defaults() {
        let mut reg = Registry::default();
        let mut sorted = Vec::new();
        add(&mut reg, &mut sorted, Category::RequiredAlias, "uint32_t");
        add(&mut reg, &mut sorted, Category::Scalar, "Bool32");
        add(&mut reg, &mut sorted, Category::Handle, "Device");
        add(&mut reg, &mut sorted, Category::Flags, "QueueFlags");
        add(&mut reg, &mut sorted, Category::Enum, "ImageType");
        add(&mut reg, &mut sorted, Category::Enum, "EmptyFlagBits");
        add(&mut reg, &mut sorted, Category::Command, "createDevice");
        let mut image_type = EnumPayload::new(false, "VK_IMAGE_TYPE_", "");
        image_type.push_literal("VK_IMAGE_TYPE_1D", None).unwrap();
        reg.enums.insert("ImageType".into(), image_type);
        reg.enums.insert("EmptyFlagBits".into(), EnumPayload::new(true, "VK_EMPTY_", "Bit"));

        let d = synthesize_defaults(&sorted, &reg, &[]).unwrap();
        assert_eq!(d.get("uint32_t"), Some(&DefaultValue::Zero));
        assert_eq!(d.get("Bool32").unwrap().expression("Bool32"), "0");
        assert_eq!(d.get("Device").unwrap().expression("Device"), "Device()");
        assert_eq!(d.get("QueueFlags"), Some(&DefaultValue::ZeroInit));
        assert_eq!(d.get("ImageType").unwrap().expression("ImageType"), "ImageType::e1D");
        assert_eq!(d.get("EmptyFlagBits"), Some(&DefaultValue::ZeroInit));
        assert!(!d.contains("createDevice"));
    }

    #[test]
    fn funcpointer_member_blocks_default_constructor() {
        let mut reg = Registry::default();
        let mut sorted = Vec::new();
        add(&mut reg, &mut sorted, Category::RequiredAlias, "uint32_t");
        add(&mut reg, &mut sorted, Category::FuncPointer, "PFN_vkDebugReportCallbackEXT");
        add_struct(
            &mut reg,
            &mut sorted,
            "DebugReportCallbackCreateInfoEXT",
            vec![
                member("uint32_t", "flags"),
                member("PFN_vkDebugReportCallbackEXT", "pfnCallback"),
                member("void*", "pUserData"),
            ],
        );
        add_struct(&mut reg, &mut sorted, "Extent2D", vec![member("uint32_t", "width")]);

        let d = synthesize_defaults(&sorted, &reg, &[]).unwrap();
        assert!(d.contains("PFN_vkDebugReportCallbackEXT"));
        assert_eq!(d.get("PFN_vkDebugReportCallbackEXT"), None);
        assert_eq!(d.has_default_constructor(&reg, "DebugReportCallbackCreateInfoEXT"), Some(false));
        assert_eq!(d.get("DebugReportCallbackCreateInfoEXT"), Some(&DefaultValue::ZeroInit));
        assert_eq!(d.has_default_constructor(&reg, "Extent2D"), Some(true));
        assert_eq!(d.has_default_constructor(&reg, "uint32_t"), None);
    }

    #[test]
    fn embedding_keeps_its_default_constructor() {
        let mut reg = Registry::default();
        let mut sorted = Vec::new();
        add(&mut reg, &mut sorted, Category::FuncPointer, "PFN_vkAllocationFunction");
        add_struct(&mut reg, &mut sorted, "Callbacks", vec![member("PFN_vkAllocationFunction", "pfnAllocation")]);
        add_struct(&mut reg, &mut sorted, "Outer", vec![member("Callbacks", "callbacks")]);
        add_struct(&mut reg, &mut sorted, "ByPointer", vec![member("Callbacks*", "pCallbacks")]);

        let d = synthesize_defaults(&sorted, &reg, &[]).unwrap();
        assert_eq!(d.has_default_constructor(&reg, "Callbacks"), Some(false));
        assert_eq!(d.has_default_constructor(&reg, "Outer"), Some(true));
        assert_eq!(d.has_default_constructor(&reg, "ByPointer"), Some(true));
        assert_eq!(d.get("Callbacks").unwrap().expression("Callbacks"), "Callbacks()");
    }

    #[test]
    fn seeds_default_to_zero() {
        let mut reg = Registry::default();
        let mut sorted = Vec::new();
        add_struct(&mut reg, &mut sorted, "Masked", vec![member("Flags", "flags")]);
        let d = synthesize_defaults(&sorted, &reg, &["Flags".to_string()]).unwrap();
        assert_eq!(d.get("Flags"), Some(&DefaultValue::Zero));
        assert_eq!(d.has_default_constructor(&reg, "Masked"), Some(true));
    }

    #[test]
    fn node_without_payload_is_malformed() {
        let sorted = vec![DependencyNode::new(Category::Enum, "Ghost")];
        let err = synthesize_defaults(&sorted, &Registry::default(), &[]).unwrap_err();
        assert_eq!(err.to_string(), "malformed registry [enums] Ghost: enum node without payload");
    }
}

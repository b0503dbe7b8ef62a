//! Registry data model: dependency nodes plus one payload map per category.
//!
//! All names are stored with the registry prefix already stripped
//! (`VkInstance` → `Instance`, `vkCreateInstance` → `createInstance`).

use crate::error::IdentError;
use crate::ident;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Closed set of entity kinds. Every consumer matches it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Command,
    Enum,
    Flags,
    FuncPointer,
    Handle,
    RequiredAlias,
    Scalar,
    Struct,
    Union,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Command => "command",
            Category::Enum => "enum",
            Category::Flags => "flags",
            Category::FuncPointer => "funcpointer",
            Category::Handle => "handle",
            Category::RequiredAlias => "required",
            Category::Scalar => "scalar",
            Category::Struct => "struct",
            Category::Union => "union",
        };
        f.write_str(name)
    }
}

/// One entity plus the names its definition references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyNode {
    pub category: Category,
    pub name: String,
    pub dependencies: BTreeSet<String>,
}

impl DependencyNode {
    pub fn new(category: Category, name: impl Into<String>) -> Self {
        DependencyNode {
            category,
            name: name.into(),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }
}

/// A struct/union member or a command parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Full declared type: `const AllocationCallbacks*`.
    pub raw_type: String,
    /// Type name with `const`/`struct`/pointer decoration removed.
    pub pure_type: String,
    pub name: String,
    /// Fixed array extent, literal (`4`) or constant (`VK_UUID_SIZE`).
    pub array_size: Option<String>,
    /// Name of the member holding this member's element count, or one of the
    /// known non-member length expressions.
    pub length_expr: Option<String>,
    pub optional: bool,
}

impl Member {
    pub fn is_pointer(&self) -> bool {
        self.raw_type.ends_with('*')
    }

    pub fn is_const(&self) -> bool {
        self.raw_type.starts_with("const ") || self.raw_type.contains(" const")
    }

    /// A pointer through which the callee writes.
    pub fn is_mutable_pointer(&self) -> bool {
        self.is_pointer() && !self.is_const()
    }

    /// The pointee type: `Extent2D*` → `Extent2D`, `void**` → `void*`.
    pub fn pointee_type(&self) -> Option<&str> {
        self.raw_type.strip_suffix('*')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandPayload {
    pub return_type: String,
    pub parameters: Vec<Member>,
    /// Binding names of the success codes (`eSuccess`, `eIncomplete`).
    pub success_codes: Vec<String>,
    pub protect: Option<String>,
    /// Receiver handle when the first parameter is a handle.
    pub handle: Option<String>,
    pub is_method: bool,
    pub is_two_step: bool,
}

impl CommandPayload {
    pub fn new(return_type: impl Into<String>) -> Self {
        CommandPayload {
            return_type: return_type.into(),
            parameters: Vec::new(),
            success_codes: Vec::new(),
            protect: None,
            handle: None,
            is_method: false,
            is_two_step: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumMember {
    /// Binding identifier: `eSrgbNonlinearKHR`.
    pub name: String,
    /// The registry literal it maps to: `VK_COLOR_SPACE_SRGB_NONLINEAR_KHR`.
    pub literal_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumPayload {
    pub is_bitmask: bool,
    /// Literal prefix shared by all members: `VK_IMAGE_TYPE_`.
    pub prefix: String,
    /// Marker cut from member names: `Bit` for bitmask enums.
    pub postfix: String,
    /// Tag removed from the prefix, re-appended to every member name.
    pub tag: Option<String>,
    pub members: Vec<EnumMember>,
    pub protect: Option<String>,
}

impl EnumPayload {
    pub fn new(is_bitmask: bool, prefix: impl Into<String>, postfix: impl Into<String>) -> Self {
        EnumPayload {
            is_bitmask,
            prefix: prefix.into(),
            postfix: postfix.into(),
            tag: None,
            members: Vec::new(),
            protect: None,
        }
    }

    /// Derive a binding name for `literal` and append it.
    ///
    /// `"e" + camel(strip(literal, prefix, tag))`, cut at the postfix if it
    /// occurs, then the tag put back at the very end.
    pub fn push_literal(&mut self, literal: &str, tag: Option<&str>) -> Result<&EnumMember, IdentError> {
        let root = ident::strip(literal, &self.prefix, tag)?;
        let mut name = format!("e{}", ident::to_camel_case(&root)?);
        if !self.postfix.is_empty() {
            if let Some(pos) = name.find(&self.postfix) {
                name.truncate(pos);
            }
        }
        if let Some(tag) = tag {
            name.push_str(tag);
        }
        self.members.push(EnumMember {
            name,
            literal_value: literal.to_string(),
        });
        Ok(&self.members[self.members.len() - 1])
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagsPayload {
    /// The bit enum backing this mask.
    pub enum_name: String,
    pub protect: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HandlePayload {
    /// Commands taking this handle as receiver, in registry order.
    pub commands: Vec<String>,
    pub protect: Option<String>,
    pub dispatchable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalarPayload {
    pub underlying: String,
    pub protect: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructPayload {
    pub is_union: bool,
    pub returned_only: bool,
    pub members: Vec<Member>,
    pub protect: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionData {
    pub name: String,
    pub number: Option<u32>,
    pub tag: String,
    pub protect: Option<String>,
    pub supported: String,
    /// Stripped names of the commands and types the extension pulls in.
    pub requires: Vec<String>,
}

impl ExtensionData {
    pub fn is_disabled(&self) -> bool {
        self.supported == "disabled"
    }
}

/// The parsed registry. Owns every entity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registry {
    /// Every entity in registry order.
    pub nodes: Vec<DependencyNode>,
    pub commands: BTreeMap<String, CommandPayload>,
    pub enums: BTreeMap<String, EnumPayload>,
    pub flags: BTreeMap<String, FlagsPayload>,
    pub handles: BTreeMap<String, HandlePayload>,
    pub scalars: BTreeMap<String, ScalarPayload>,
    pub structs: BTreeMap<String, StructPayload>,
    pub extensions: Vec<ExtensionData>,
    pub tags: BTreeSet<String>,
    /// Members of the reserved constants block: name → value.
    pub constants: BTreeMap<String, String>,
    pub header_version: Option<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Registry {
    /// Append a node. Returns `false` when the name is already taken.
    pub(crate) fn push_node(&mut self, node: DependencyNode) -> bool {
        if self.index.contains_key(&node.name) {
            return false;
        }
        self.index.insert(node.name.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn node(&self, name: &str) -> Option<&DependencyNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub(crate) fn node_mut(&mut self, name: &str) -> Option<&mut DependencyNode> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.nodes[i]),
            None => None,
        }
    }

    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.node(name).map(|n| n.category)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

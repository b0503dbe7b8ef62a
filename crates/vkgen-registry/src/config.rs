//! Naming conventions of the registry being processed.

use crate::exceptions::ExceptionTable;

/// Generator conventions. `Default` yields the Vulkan registry conventions.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Stripped from type names: `VkInstance` → `Instance`.
    pub type_prefix: String,
    /// Stripped from command names: `vkCreateInstance` → `createInstance`.
    pub command_prefix: String,
    /// Macro prefix used to rebuild enum literal prefixes (`VK` + `_IMAGE_TYPE_`).
    pub literal_prefix: String,
    /// Stripped name of the raw mask primitive. Skipped as a basetype and
    /// seeded as available before sorting.
    pub flags_primitive: String,
    /// The status-code enum.
    pub status_type: String,
    pub void_type: String,
    /// Reserved enums block holding scalar literals instead of a type.
    pub constants_block: String,
    /// Tags known before the `<tags>` section is read.
    pub builtin_tags: Vec<String>,
    /// Parameter names eligible as the generic (template) parameter.
    pub generic_data_params: Vec<String>,
    pub exceptions: ExceptionTable,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            type_prefix: "Vk".to_string(),
            command_prefix: "vk".to_string(),
            literal_prefix: "VK".to_string(),
            flags_primitive: "Flags".to_string(),
            status_type: "Result".to_string(),
            void_type: "void".to_string(),
            constants_block: "API Constants".to_string(),
            builtin_tags: vec!["EXT".to_string(), "KHR".to_string()],
            generic_data_params: vec!["pData".to_string(), "pValues".to_string()],
            exceptions: ExceptionTable::registry_defaults(),
        }
    }
}

impl RegistryConfig {
    /// Names treated as available before the resolver places anything.
    pub fn seed_names(&self) -> Vec<String> {
        vec![self.flags_primitive.clone()]
    }

    /// The fixed literal prefix of the status enum (`VK_`).
    pub(crate) fn status_literal_prefix(&self) -> String {
        format!("{}_", self.literal_prefix)
    }

    pub(crate) fn is_generic_data_param(&self, name: &str) -> bool {
        self.generic_data_params.iter().any(|p| p == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_vulkan_conventions() {
        let config = RegistryConfig::default();
        assert_eq!(config.seed_names(), vec!["Flags".to_string()]);
        assert_eq!(config.status_literal_prefix(), "VK_");
        assert!(config.is_generic_data_param("pValues"));
        assert!(!config.is_generic_data_param("pCode"));
    }
}

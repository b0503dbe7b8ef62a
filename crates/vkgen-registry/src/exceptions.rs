//! Registry data-quality workarounds.
//!
//! Each entry corrects one known omission in the registry. Entries are data,
//! looked up by exact name; they are never generalized into rules.

/// Reviewable list of per-name registry corrections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTable {
    /// Struct names (prefix already stripped) the parser drops.
    pub skipped_structs: Vec<String>,
    /// `(raw command name, raw success codes)` used when the command has no
    /// `successcodes` attribute.
    pub success_codes: Vec<(String, Vec<String>)>,
    /// Raw command names whose count parameter lacks the two-step marker.
    pub two_step: Vec<String>,
}

impl ExceptionTable {
    /// An empty table: the registry is taken exactly as written.
    pub fn none() -> Self {
        ExceptionTable {
            skipped_structs: Vec::new(),
            success_codes: Vec::new(),
            two_step: Vec::new(),
        }
    }

    /// Corrections for the Vulkan registry.
    pub fn registry_defaults() -> Self {
        ExceptionTable {
            // legacy duplicate of Rect2D-with-depth, never part of the API
            skipped_structs: vec!["Rect3D".to_string()],
            success_codes: vec![(
                "vkCreateDisplayModeKHR".to_string(),
                vec!["VK_SUCCESS".to_string()],
            )],
            two_step: vec!["vkGetDisplayPlaneSupportedDisplaysKHR".to_string()],
        }
    }

    pub fn skips_struct(&self, name: &str) -> bool {
        self.skipped_structs.iter().any(|s| s == name)
    }

    pub fn success_codes_for(&self, raw_command: &str) -> Option<&[String]> {
        self.success_codes
            .iter()
            .find(|(name, _)| name == raw_command)
            .map(|(_, codes)| codes.as_slice())
    }

    pub fn forces_two_step(&self, raw_command: &str) -> bool {
        self.two_step.iter().any(|c| c == raw_command)
    }
}

impl Default for ExceptionTable {
    fn default() -> Self {
        Self::registry_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_skip_rect3d() {
        let table = ExceptionTable::registry_defaults();
        assert!(table.skips_struct("Rect3D"));
        assert!(!table.skips_struct("Rect2D"));
    }

    #[test]
    fn lookups_are_exact() {
        let table = ExceptionTable::registry_defaults();
        assert_eq!(
            table.success_codes_for("vkCreateDisplayModeKHR"),
            Some(&["VK_SUCCESS".to_string()][..])
        );
        assert_eq!(table.success_codes_for("createDisplayModeKHR"), None);
        assert!(table.forces_two_step("vkGetDisplayPlaneSupportedDisplaysKHR"));
        assert!(!table.forces_two_step("vkGetDisplayPlaneSupportedDisplays"));
    }

    #[test]
    fn none_is_empty() {
        let table = ExceptionTable::none();
        assert!(!table.skips_struct("Rect3D"));
        assert!(table.success_codes.is_empty() && table.two_step.is_empty());
    }
}

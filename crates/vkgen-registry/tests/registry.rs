use std::collections::HashMap;
use vkgen_registry::{build_model, Category, DefaultValue, RegistryConfig, RegistryError, ResolvedModel, TypeExpr};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn mini_model() -> ResolvedModel {
    let xml = std::fs::read_to_string(fixture_path("mini_registry.xml")).unwrap();
    build_model(&xml, &RegistryConfig::default()).unwrap()
}

// -- Parsing ------------------------------------------------------------------

#[test]
fn reads_header_version_and_constants() {
    let model = mini_model();
    assert_eq!(model.registry.header_version.as_deref(), Some("4"));
    assert_eq!(model.registry.constants.get("VK_UUID_SIZE").map(String::as_str), Some("16"));
    assert_eq!(
        model.registry.constants.get("VK_LOD_CLAMP_NONE").map(String::as_str),
        Some("1000.0f")
    );
    assert!(model.registry.tags.contains("NV"));
}

#[test]
fn skipped_struct_is_absent() {
    let model = mini_model();
    assert!(!model.registry.contains("Rect3D"));
    assert!(model.sorted.iter().all(|n| n.name != "Rect3D"));
}

#[test]
fn categories_of_declared_types() {
    let model = mini_model();
    let reg = &model.registry;
    assert_eq!(reg.category_of("uint32_t"), Some(Category::RequiredAlias));
    assert_eq!(reg.category_of("Display"), Some(Category::RequiredAlias));
    assert_eq!(reg.category_of("Bool32"), Some(Category::Scalar));
    assert_eq!(reg.category_of("Flags"), None);
    assert_eq!(reg.category_of("QueueFlags"), Some(Category::Flags));
    assert_eq!(reg.category_of("InstanceCreateFlagBits"), Some(Category::Enum));
    assert_eq!(reg.category_of("PFN_vkAllocationFunction"), Some(Category::FuncPointer));
    assert_eq!(reg.category_of("ClearColorValue"), Some(Category::Union));
    assert_eq!(reg.category_of("createInstance"), Some(Category::Command));

    assert!(reg.handles["Instance"].dispatchable);
    assert!(!reg.handles["Fence"].dispatchable);
}

#[test]
fn extension_literals_are_appended() {
    let model = mini_model();
    let result = &model.registry.enums["Result"];
    let last = result.members.last().unwrap();
    assert_eq!(last.name, "eErrorSurfaceLostKHR");
    assert_eq!(last.literal_value, "VK_ERROR_SURFACE_LOST_KHR");
    // disabled extension contributes nothing
    assert!(result.members.iter().all(|m| !m.literal_value.starts_with("VK_NV_")));

    let sampler = &model.registry.enums["SamplerAddressMode"];
    assert!(sampler.has_member("eMirrorClampToEdge"));
    let structure = &model.registry.enums["StructureType"];
    assert!(structure.has_member("eXlibSurfaceCreateInfoKHR"));
}

#[test]
fn extension_guards_reach_every_required_entity() {
    let model = mini_model();
    let reg = &model.registry;
    let guard = Some("VK_USE_PLATFORM_XLIB_KHR".to_string());
    assert_eq!(reg.commands["createXlibSurfaceKHR"].protect, guard);
    assert_eq!(reg.structs["XlibSurfaceCreateInfoKHR"].protect, guard);
    assert_eq!(reg.flags["XlibSurfaceCreateFlagsKHR"].protect, guard);
    assert_eq!(reg.enums["XlibSurfaceCreateFlagBitsKHR"].protect, guard);
    assert_eq!(reg.structs["SurfaceCapabilitiesKHR"].protect, None);

    let disabled = reg.extensions.iter().find(|e| e.name == "VK_NV_extension_1").unwrap();
    assert!(disabled.is_disabled());
    assert!(disabled.requires.is_empty());
    let xlib = reg.extensions.iter().find(|e| e.name == "VK_KHR_xlib_surface").unwrap();
    assert_eq!(xlib.number, Some(5));
    assert!(xlib.requires.contains(&"createXlibSurfaceKHR".to_string()));
}

#[test]
fn handles_list_their_methods_in_registry_order() {
    let model = mini_model();
    assert_eq!(
        model.registry.handles["Instance"].commands,
        vec![
            "destroyInstance",
            "enumeratePhysicalDevices",
            "getInstanceProcAddr",
            "createXlibSurfaceKHR",
        ]
    );
    assert_eq!(model.registry.handles["Device"].commands, vec!["getFenceStatus"]);
    let create = &model.registry.commands["createInstance"];
    assert!(!create.is_method);
    assert_eq!(create.handle, None);
}

// -- Ordering -----------------------------------------------------------------

#[test]
fn every_entity_follows_its_dependencies() {
    let model = mini_model();
    let position: HashMap<&str, usize> = model
        .sorted
        .iter()
        .enumerate()
        .map(|(i, n)| (n.name.as_str(), i))
        .collect();
    assert_eq!(model.sorted.len(), model.registry.nodes.len());
    for (i, node) in model.sorted.iter().enumerate() {
        for dep in &node.dependencies {
            if dep == "Flags" {
                continue;
            }
            assert!(position[dep.as_str()] < i, "{} placed before {}", node.name, dep);
        }
    }
}

#[test]
fn method_receiver_is_not_an_ordering_edge() {
    let model = mini_model();
    let node = model.registry.node("getFenceStatus").unwrap();
    assert!(!node.dependencies.contains("Device"));
    assert!(node.dependencies.contains("Fence"));
}

// -- Signatures ---------------------------------------------------------------

#[test]
fn return_types_of_core_commands() {
    let model = mini_model();
    let returns = |name: &str| model.analyses[name].external_return_type.clone();
    assert_eq!(returns("createInstance"), TypeExpr::Named("Instance".into()));
    assert_eq!(returns("destroyInstance"), TypeExpr::Void);
    assert_eq!(returns("enumeratePhysicalDevices"), TypeExpr::Named("Result".into()));
    assert_eq!(
        returns("getPhysicalDeviceProperties"),
        TypeExpr::Named("PhysicalDeviceProperties".into())
    );
    assert_eq!(
        returns("getPhysicalDeviceQueueFamilyProperties"),
        TypeExpr::Sequence("QueueFamilyProperties".into())
    );
    assert_eq!(returns("getFenceStatus"), TypeExpr::Named("Result".into()));
    assert_eq!(returns("getInstanceProcAddr"), TypeExpr::Named("PFN_vkVoidFunction".into()));
    assert_eq!(returns("createXlibSurfaceKHR"), TypeExpr::Named("SurfaceKHR".into()));
}

#[test]
fn two_step_enumeration_is_classified() {
    let model = mini_model();
    let analysis = &model.analyses["enumeratePhysicalDevices"];
    assert!(analysis.is_two_step);
    assert_eq!(analysis.vector_pairs().collect::<Vec<_>>(), vec![(2, 1)]);
    assert_eq!(analysis.return_param, Some(2));
    assert_eq!(analysis.skipped_params.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(
        model.registry.commands["enumeratePhysicalDevices"].success_codes,
        vec!["eSuccess", "eIncomplete"]
    );
}

#[test]
fn exception_table_forces_two_step() {
    let model = mini_model();
    assert!(model.analyses["getDisplayPlaneSupportedDisplaysKHR"].is_two_step);
    assert!(!model.analyses["getPhysicalDeviceProperties"].is_two_step);
}

// -- Defaults -----------------------------------------------------------------

#[test]
fn defaults_across_categories() {
    let model = mini_model();
    let d = &model.defaults;
    assert_eq!(d.get("Flags"), Some(&DefaultValue::Zero));
    assert_eq!(d.get("Bool32"), Some(&DefaultValue::Zero));
    assert_eq!(d.get("ImageType").unwrap().expression("ImageType"), "ImageType::e1D");
    assert_eq!(d.get("QueueFlagBits").unwrap().expression("QueueFlagBits"), "QueueFlagBits::eGraphics");
    assert_eq!(d.get("XlibSurfaceCreateFlagBitsKHR"), Some(&DefaultValue::ZeroInit));
    assert_eq!(d.get("Instance"), Some(&DefaultValue::ZeroInit));
    assert_eq!(d.get("PFN_vkFreeFunction"), None);
    assert!(!d.contains("createInstance"));
}

#[test]
fn aggregate_constructibility() {
    let model = mini_model();
    let reg = &model.registry;
    let d = &model.defaults;
    assert_eq!(d.has_default_constructor(reg, "AllocationCallbacks"), Some(false));
    assert_eq!(d.get("AllocationCallbacks"), Some(&DefaultValue::ZeroInit));
    assert_eq!(d.has_default_constructor(reg, "InstanceCreateInfo"), Some(true));
    assert_eq!(d.has_default_constructor(reg, "SurfaceCapabilitiesKHR"), Some(true));
    assert_eq!(d.has_default_constructor(reg, "PhysicalDeviceProperties"), Some(true));
    assert_eq!(d.has_default_constructor(reg, "ClearColorValue"), Some(true));
    assert_eq!(d.has_default_constructor(reg, "Instance"), None);
}

// -- Failures -----------------------------------------------------------------

#[test]
fn by_value_cycle_is_unresolvable() {
    let xml = r#"<registry>
        <types>
            <type requires="vk_platform" name="uint32_t"/>
            <type category="struct" name="VkNode">
                <member><type>VkEdge</type> <name>edge</name></member>
            </type>
            <type category="struct" name="VkEdge">
                <member><type>VkNode</type> <name>node</name></member>
                <member><type>uint32_t</type> <name>weight</name></member>
            </type>
        </types>
    </registry>"#;
    let err = build_model(xml, &RegistryConfig::default()).unwrap_err();
    match &err {
        RegistryError::UnresolvableDependency { stuck } => {
            let names: Vec<&str> = stuck.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, vec!["Node", "Edge"]);
        }
        other => panic!("expected an unresolvable dependency, got {:?}", other),
    }
    assert!(err.to_string().contains("Node (waiting on Edge)"));
}

#[test]
fn success_code_outside_status_enum_is_rejected() {
    let xml = r#"<registry>
        <types>
            <type requires="vk_platform" name="void"/>
            <type category="handle"><type>VK_DEFINE_HANDLE</type>(<name>VkDevice</name>)</type>
        </types>
        <enums name="VkResult" type="enum">
            <enum value="0" name="VK_SUCCESS"/>
        </enums>
        <commands>
            <command successcodes="VK_SUCCESS,VK_TIMEOUT">
                <proto><type>VkResult</type> <name>vkDeviceWaitIdle</name></proto>
                <param><type>VkDevice</type> <name>device</name></param>
            </command>
        </commands>
    </registry>"#;
    let err = build_model(xml, &RegistryConfig::default()).unwrap_err();
    assert!(matches!(err, RegistryError::AmbiguousSignature { .. }));
    assert!(err.to_string().contains("deviceWaitIdle"));
}

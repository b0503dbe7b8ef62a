//! Markdown declaration report.
//!
//! An index of every entity in declaration order, then one section per
//! entity. Commands get a signature table showing the role each parameter
//! plays in the enhanced signature.

use crate::render::Renderer;
use crate::toc;
use anyhow::Result;
use vkgen_registry::model::{
    CommandPayload, EnumPayload, FlagsPayload, HandlePayload, ScalarPayload, StructPayload,
};
use vkgen_registry::{Category, CommandAnalysis, DependencyNode, ResolvedModel};

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, model: &ResolvedModel) -> Result<String> {
        let mut output = String::from("# Registry model\n\n");
        if let Some(ref version) = model.registry.header_version {
            output.push_str(&format!("Header version: {}\n\n", version));
        }

        if !model.sorted.is_empty() {
            output.push_str("## Index\n\n");
            for node in &model.sorted {
                output.push_str(&toc::render_toc_item(&node.name));
                output.push('\n');
            }
            output.push('\n');
        }

        if !model.registry.constants.is_empty() {
            output.push_str("## Constants\n\n| Name | Value |\n|---|---|\n");
            for (name, value) in &model.registry.constants {
                output.push_str(&format!("| `{}` | `{}` |\n", name, value));
            }
            output.push('\n');
        }

        if !model.registry.extensions.is_empty() {
            output.push_str(&render_extensions(model));
        }

        if !model.sorted.is_empty() {
            output.push_str("## Declarations\n\n");
            for node in &model.sorted {
                output.push_str(&render_entity(model, node));
                output.push('\n');
            }
        }

        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

fn render_extensions(model: &ResolvedModel) -> String {
    let mut out = String::from("## Extensions\n\n| Extension | Number | Supported | Guard |\n|---|---|---|---|\n");
    for ext in &model.registry.extensions {
        out.push_str(&format!(
            "| `{}` | {} | {} | {} |\n",
            ext.name,
            ext.number.map(|n| n.to_string()).unwrap_or_default(),
            ext.supported,
            ext.protect.as_deref().map(code).unwrap_or_default(),
        ));
    }
    out.push('\n');
    out
}

fn render_entity(model: &ResolvedModel, node: &DependencyNode) -> String {
    let reg = &model.registry;
    let mut lines: Vec<String> = vec![format!("### {}\n", node.name)];

    let protect = match node.category {
        Category::Command => reg.commands.get(&node.name).and_then(|c| c.protect.as_deref()),
        Category::Enum => reg.enums.get(&node.name).and_then(|e| e.protect.as_deref()),
        Category::Flags => reg.flags.get(&node.name).and_then(|f| f.protect.as_deref()),
        Category::Handle => reg.handles.get(&node.name).and_then(|h| h.protect.as_deref()),
        Category::Scalar => reg.scalars.get(&node.name).and_then(|s| s.protect.as_deref()),
        Category::Struct | Category::Union => reg.structs.get(&node.name).and_then(|s| s.protect.as_deref()),
        Category::FuncPointer | Category::RequiredAlias => None,
    };
    match protect {
        Some(guard) => lines.push(format!("_{}_, guarded by {}\n", node.category, code(guard))),
        None => lines.push(format!("_{}_\n", node.category)),
    }

    let body = match node.category {
        Category::Command => match (reg.commands.get(&node.name), model.analyses.get(&node.name)) {
            (Some(command), Some(analysis)) => render_command(command, analysis),
            _ => Vec::new(),
        },
        Category::Enum => reg.enums.get(&node.name).map(render_enum).unwrap_or_default(),
        Category::Flags => reg.flags.get(&node.name).map(render_flags).unwrap_or_default(),
        Category::Handle => reg.handles.get(&node.name).map(render_handle).unwrap_or_default(),
        Category::Scalar => reg.scalars.get(&node.name).map(render_scalar).unwrap_or_default(),
        Category::Struct | Category::Union => reg.structs.get(&node.name).map(render_struct).unwrap_or_default(),
        Category::FuncPointer | Category::RequiredAlias => Vec::new(),
    };
    lines.extend(body);

    if node.category != Category::Command {
        match model.defaults.get(&node.name) {
            Some(value) => lines.push(format!("Default: {}\n", code(&value.expression(&node.name)))),
            None => lines.push("_No default value._\n".to_string()),
        }
        if model.defaults.has_default_constructor(&model.registry, &node.name) == Some(false) {
            lines.push("_No default constructor._\n".to_string());
        }
    }

    lines.join("\n")
}

// -- Per category ---------------------------------------------------------------

fn render_enum(payload: &EnumPayload) -> Vec<String> {
    if payload.members.is_empty() {
        return vec!["_No members._\n".to_string()];
    }
    let mut lines: Vec<String> = payload
        .members
        .iter()
        .map(|m| format!("* {} = {}", code(&m.name), code(&m.literal_value)))
        .collect();
    lines.push(String::new());
    lines
}

fn render_flags(payload: &FlagsPayload) -> Vec<String> {
    vec![format!("Bits: {}\n", toc::render_toc_link(&payload.enum_name))]
}

fn render_handle(payload: &HandlePayload) -> Vec<String> {
    let mut lines = Vec::new();
    if payload.dispatchable {
        lines.push("Dispatchable.\n".to_string());
    }
    if !payload.commands.is_empty() {
        lines.push("#### Methods\n".to_string());
        lines.extend(payload.commands.iter().map(|c| toc::render_toc_item(c)));
        lines.push(String::new());
    }
    lines
}

fn render_scalar(payload: &ScalarPayload) -> Vec<String> {
    vec![format!("Underlying type: {}\n", code(&payload.underlying))]
}

fn render_struct(payload: &StructPayload) -> Vec<String> {
    let mut lines = Vec::new();
    if payload.returned_only {
        lines.push("Returned only.\n".to_string());
    }
    lines.push("| Member | Type | Array | Length | Optional |".to_string());
    lines.push("|---|---|---|---|---|".to_string());
    for m in &payload.members {
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            code(&m.name),
            code(&m.raw_type),
            m.array_size.as_deref().map(code).unwrap_or_default(),
            m.length_expr.as_deref().map(code).unwrap_or_default(),
            if m.optional { "yes" } else { "" },
        ));
    }
    lines.push(String::new());
    lines
}

fn render_command(command: &CommandPayload, analysis: &CommandAnalysis) -> Vec<String> {
    let mut lines = vec![format!("Returns {}.\n", code(&analysis.external_return_type.to_string()))];
    match command.handle {
        Some(ref handle) => lines.push(format!("Method of {}.\n", toc::render_toc_link(handle))),
        None => lines.push("Free function.\n".to_string()),
    }
    if !command.success_codes.is_empty() {
        let codes: Vec<String> = command.success_codes.iter().map(|c| code(c)).collect();
        lines.push(format!("Success codes: {}\n", codes.join(", ")));
    }
    if analysis.is_two_step {
        lines.push("Two-step enumeration.\n".to_string());
    }

    if !command.parameters.is_empty() {
        lines.push("| # | Parameter | Type | Role |".to_string());
        lines.push("|---|---|---|---|".to_string());
        for (i, param) in command.parameters.iter().enumerate() {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                i,
                code(&param.name),
                code(&param.raw_type),
                parameter_roles(command, analysis, i).join(", "),
            ));
        }
        lines.push(String::new());
    }
    lines
}

/// What parameter `index` is in the enhanced signature. Empty for plain
/// pass-through parameters.
fn parameter_roles(command: &CommandPayload, analysis: &CommandAnalysis, index: usize) -> Vec<String> {
    let mut roles = Vec::new();
    if command.is_method && index == 0 {
        roles.push("receiver".to_string());
    }
    for (array, count) in analysis.vector_pairs() {
        if count == index {
            roles.push(format!("count of {}", code(&command.parameters[array].name)));
        }
    }
    if analysis.vector_params.contains_key(&index) {
        roles.push("array".to_string());
    }
    if analysis.return_param == Some(index) {
        roles.push("return".to_string());
    }
    if analysis.template_param == Some(index) {
        roles.push("template".to_string());
    }
    roles
}

fn code(text: &str) -> String {
    format!("`{}`", text)
}

//! Command signature analysis.
//!
//! Classifies the parameters of a command (arrays and their counts, the
//! output parameter, the generic data parameter) and derives the return
//! type a binding exposes.

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result, Section};
use crate::model::{Category, CommandPayload, Registry};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info};

/// Length expressions that name no parameter of the command.
const NON_MEMBER_LENGTHS: &[&str] = &[
    "dataSize/4",
    "null-terminated",
    "pAllocateInfo->descriptorSetCount",
    "pAllocateInfo->commandBufferCount",
];

/// Element type exposed for an untyped (`void`) output buffer.
const BYTE_TYPE: &str = "uint8_t";

/// Externally visible return type of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum TypeExpr {
    Void,
    Named(String),
    Sequence(String),
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Void => f.write_str("void"),
            TypeExpr::Named(t) => f.write_str(t),
            TypeExpr::Sequence(t) => write!(f, "sequence<{}>", t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandAnalysis {
    /// Array parameter index → index of its count parameter. `None` when
    /// the length is one of the non-member expressions.
    pub vector_params: BTreeMap<usize, Option<usize>>,
    pub return_param: Option<usize>,
    pub template_param: Option<usize>,
    /// Parameters a binding does not expose: counts, the output parameter
    /// and the receiver of a method.
    pub skipped_params: BTreeSet<usize>,
    pub is_two_step: bool,
    pub external_return_type: TypeExpr,
}

impl CommandAnalysis {
    /// `(array, count)` pairs in array order.
    pub fn vector_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.vector_params
            .iter()
            .filter_map(|(&array, &count)| count.map(|c| (array, c)))
    }

    pub fn is_count_param(&self, index: usize) -> bool {
        self.vector_params.values().any(|c| *c == Some(index))
    }
}

// -- Public API ---------------------------------------------------------------

pub fn analyze_command(
    name: &str,
    command: &CommandPayload,
    config: &RegistryConfig,
) -> Result<CommandAnalysis> {
    let params = &command.parameters;

    let mut vector_params = BTreeMap::new();
    for (i, param) in params.iter().enumerate() {
        let Some(len) = param.length_expr.as_deref().filter(|l| !l.is_empty()) else {
            continue;
        };
        match params.iter().position(|p| p.name == len) {
            Some(count) if count != i => {
                vector_params.insert(i, Some(count));
            }
            _ if NON_MEMBER_LENGTHS.contains(&len) => {
                vector_params.insert(i, None);
            }
            _ => {
                return Err(RegistryError::malformed(
                    Section::Commands,
                    name,
                    format!("length `{}` of `{}` names no parameter", len, param.name),
                ))
            }
        }
    }
    let is_count = |i: usize| vector_params.values().any(|c| *c == Some(i));

    let mut outputs = params
        .iter()
        .enumerate()
        .filter(|(i, p)| p.is_mutable_pointer() && !is_count(*i))
        .map(|(i, _)| i);
    let return_param = outputs.next();
    if let (Some(first), Some(extra)) = (return_param, outputs.next()) {
        return Err(RegistryError::ambiguous(
            name,
            format!(
                "both `{}` and `{}` are output pointers",
                params[first].name, params[extra].name
            ),
        ));
    }

    let template_param = params
        .iter()
        .enumerate()
        .find(|(i, p)| config.is_generic_data_param(&p.name) && vector_params.contains_key(i))
        .map(|(i, _)| i);

    let external_return_type = synthesize_return_type(
        name,
        command,
        return_param,
        return_param.is_some_and(|r| vector_params.contains_key(&r)),
        config,
    )?;

    let mut skipped_params: BTreeSet<usize> = vector_params.values().flatten().copied().collect();
    skipped_params.extend(return_param);
    if command.is_method {
        skipped_params.insert(0);
    }

    Ok(CommandAnalysis {
        vector_params,
        return_param,
        template_param,
        skipped_params,
        is_two_step: command.is_two_step,
        external_return_type,
    })
}

/// Analyze every command, keyed by command name.
pub fn analyze_commands(
    registry: &Registry,
    config: &RegistryConfig,
) -> Result<BTreeMap<String, CommandAnalysis>> {
    let mut analyses = BTreeMap::new();
    for node in registry.nodes.iter().filter(|n| n.category == Category::Command) {
        let Some(command) = registry.commands.get(&node.name) else {
            continue;
        };
        let analysis = analyze_command(&node.name, command, config)?;
        debug!(command = %node.name, returns = %analysis.external_return_type, "analyzed");
        analyses.insert(node.name.clone(), analysis);
    }
    info!(count = analyses.len(), "analyzed commands");
    Ok(analyses)
}

// -- Return type --------------------------------------------------------------

fn synthesize_return_type(
    name: &str,
    command: &CommandPayload,
    return_param: Option<usize>,
    returns_sequence: bool,
    config: &RegistryConfig,
) -> Result<TypeExpr> {
    let raw = command.return_type.as_str();
    let returns_nothing = raw == config.void_type;
    let returns_status = raw == config.status_type;
    let success_count = command.success_codes.len();

    if let Some(index) = return_param {
        if returns_nothing || (returns_status && success_count < 2) {
            let param = &command.parameters[index];
            if returns_sequence {
                let element = if param.pure_type == config.void_type {
                    BYTE_TYPE.to_string()
                } else {
                    param.pure_type.clone()
                };
                return Ok(TypeExpr::Sequence(element));
            }
            let pointee = param.pointee_type().ok_or_else(|| {
                RegistryError::ambiguous(name, format!("output `{}` is not a pointer", param.name))
            })?;
            return Ok(TypeExpr::Named(pointee.to_string()));
        }
    }

    if (returns_status && success_count == 1) || returns_nothing {
        Ok(TypeExpr::Void)
    } else {
        Ok(TypeExpr::Named(raw.to_string()))
    }
}

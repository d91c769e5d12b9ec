//! The validator (C6): an eight-pass pipeline producing a [`Report`] for a parsed tree against a
//! target DOCSIS version.

use crate::registry::SpecRegistry;
use crate::tlv::Tlv;
use crate::types::DocsisVersion;
use crate::value::{self, FormatOptions};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Finding {
    pub kind: &'static str,
    pub tlv_type: u8,
    pub subtlv_type: Option<u8>,
    pub message: String,
    pub severity: Severity,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Valid,
    Warning,
    Invalid,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub config_completeness: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub status: Status,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub info: Vec<Finding>,
    pub summary: Summary,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ValidateOptions {
    pub docsis_version: DocsisVersion,
    pub strict: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        ValidateOptions {
            docsis_version: DocsisVersion::default(),
            strict: false,
        }
    }
}

pub fn validate(tree: &[Tlv], registry: &SpecRegistry, opts: ValidateOptions) -> Report {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let info = Vec::new();

    // Passes 2-5: type recognition, length check, value format, and sub-TLV recursion, applied
    // top-down and recursively to every nesting level.
    for node in tree {
        check_node(node, registry, opts, None, &mut errors, &mut warnings);
    }

    // Pass 6: dependencies.
    let top_level_types: Vec<u8> = tree.iter().map(|n| n.r#type).collect();
    for (present_type, required) in registry.dependencies() {
        if top_level_types.contains(present_type) {
            for req in required {
                if !top_level_types.contains(req) {
                    errors.push(Finding {
                        kind: "missing_dependency",
                        tlv_type: *present_type,
                        subtlv_type: None,
                        message: format!(
                            "TLV {} requires TLV {} to also be present at the top level",
                            present_type, req
                        ),
                        severity: Severity::Error,
                    });
                }
            }
        }
    }

    // Pass 7: version compatibility.
    let allowed = registry.version_allowed_types(opts.docsis_version);
    for node in tree {
        if !allowed.contains(&node.r#type) && node.r#type != 255 {
            errors.push(Finding {
                kind: "version_incompatible",
                tlv_type: node.r#type,
                subtlv_type: None,
                message: format!(
                    "TLV {} is not in the allowed range for DOCSIS {}",
                    node.r#type, opts.docsis_version
                ),
                severity: Severity::Error,
            });
        }
    }

    // Pass 8: completeness.
    let required = registry.required_basic();
    let present_required: Vec<&u8> = required.iter().filter(|t| top_level_types.contains(t)).collect();
    if present_required.len() < required.len() {
        let missing: Vec<String> = required
            .iter()
            .filter(|t| !top_level_types.contains(t))
            .map(|t| t.to_string())
            .collect();
        warnings.push(Finding {
            kind: "incomplete_config",
            tlv_type: 0,
            subtlv_type: None,
            message: format!(
                "configuration is missing required basic TLV(s) {}; a complete configuration should include them",
                missing.join(", ")
            ),
            severity: Severity::Warning,
        });
    }

    let config_completeness = if required.is_empty() {
        1.0
    } else {
        present_required.len() as f64 / required.len() as f64
    };

    let status = if errors.iter().any(|f| f.severity >= Severity::Error) {
        tracing::debug!(errors = errors.len(), "validation failed");
        Status::Invalid
    } else if !warnings.is_empty() {
        Status::Warning
    } else {
        Status::Valid
    };

    Report {
        status,
        errors,
        warnings,
        info,
        summary: Summary { config_completeness },
    }
}

fn check_node(
    node: &Tlv,
    registry: &SpecRegistry,
    opts: ValidateOptions,
    parent_type: Option<u8>,
    errors: &mut Vec<Finding>,
    warnings: &mut Vec<Finding>,
) {
    let entry = match parent_type {
        Some(parent) => registry.lookup_subtlv(parent, node.r#type),
        None => registry.lookup_tlv(node.r#type, opts.docsis_version),
    };

    match entry {
        None if node.r#type != 255 => {
            let kind = if parent_type.is_some() { "unknown_subtlv_type" } else { "unknown_tlv_type" };
            warnings.push(Finding {
                kind,
                tlv_type: parent_type.unwrap_or(node.r#type),
                subtlv_type: parent_type.map(|_| node.r#type),
                message: format!("TLV type {} is not recognized by the registry", node.r#type),
                severity: Severity::Warning,
            });
        }
        Some(e) => {
            if let Some(max) = e.max_length {
                if node.length > max {
                    errors.push(Finding {
                        kind: "exceeds_max_length",
                        tlv_type: parent_type.unwrap_or(node.r#type),
                        subtlv_type: parent_type.map(|_| node.r#type),
                        message: format!("TLV {} length {} exceeds the maximum {}", node.r#type, node.length, max),
                        severity: Severity::Error,
                    });
                }
            }

            if let Some(bytes) = node.as_leaf_bytes() {
                if bytes.len() != node.length {
                    let severity = if opts.strict { Severity::Error } else { Severity::Warning };
                    let finding = Finding {
                        kind: "length_mismatch",
                        tlv_type: parent_type.unwrap_or(node.r#type),
                        subtlv_type: parent_type.map(|_| node.r#type),
                        message: format!(
                            "declared length {} does not match {} actual value bytes",
                            node.length,
                            bytes.len()
                        ),
                        severity,
                    };
                    if opts.strict {
                        errors.push(finding);
                    } else {
                        warnings.push(finding);
                    }
                }

                if value::format_value(&node.value_type, bytes, &FormatOptions::default()).is_err() {
                    errors.push(Finding {
                        kind: "invalid_value_format",
                        tlv_type: parent_type.unwrap_or(node.r#type),
                        subtlv_type: parent_type.map(|_| node.r#type),
                        message: format!("TLV {} value does not decode as {}", node.r#type, node.value_type.name()),
                        severity: Severity::Error,
                    });
                }
            }
        }
        None => {}
    }

    if let Some(children) = node.children() {
        for child in children {
            check_node(child, registry, opts, Some(node.r#type), errors, warnings);
        }
    }
}

/// Billing Code Lookup Tool
///
/// Exact lookup of a single code within one coding system. A miss is a normal
/// informational result, not an error.

use serde_json::Value;
use tracing::debug;

use super::LOOKUP_DISCLAIMER;
use super::args::required_str;
use crate::catalog::{Catalog, CodeRecord, CodeSystem};
use crate::core::error::ToolError;
use crate::core::server::{MCPTool, TextContent, ToolHandler, ToolRegistry};

pub const NAME: &str = "lookup_billing_code";

/// Register the lookup tool with the tool registry.
///
/// # Arguments
/// * `registry` - Mutable reference to the tool registry where the tool will be registered
/// * `catalog` - Catalog the handler reads from for the life of the server
pub fn register(registry: &mut ToolRegistry, catalog: &'static Catalog) {
    let tool = MCPTool {
        name: NAME.to_string(),
        description: "Look up information about a medical billing code (CPT, ICD-10, HCPCS)"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "code_type": {
                    "type": "string",
                    "enum": ["CPT", "ICD10", "HCPCS"],
                    "description": "Type of billing code"
                },
                "code": {
                    "type": "string",
                    "description": "The billing code to look up"
                }
            },
            "required": ["code_type", "code"]
        }),
    };

    let handler: ToolHandler = Box::new(move |args: Value| lookup(catalog, &args));

    registry.register(tool, handler);
}

/// Run a lookup against `catalog`.
///
/// A `code_type` outside the schema enum is not rejected; it simply has no
/// table, so the result is the usual "not found" block.
pub fn lookup(catalog: &Catalog, args: &Value) -> Result<Vec<TextContent>, ToolError> {
    let code_type = required_str(args, "code_type")?;
    let code = required_str(args, "code")?;

    let record = code_type
        .parse::<CodeSystem>()
        .ok()
        .and_then(|system| catalog.get(system, code));

    let text = match record {
        Some(record) => {
            debug!(code_type, code, "code found");
            format_record(code_type, code, record)
        }
        None => {
            debug!(code_type, code, "code not found");
            format!(
                "Code {} not found in {} database. This is a sample database with limited codes.",
                code, code_type
            )
        }
    };

    Ok(vec![TextContent::text(text)])
}

fn format_record(code_type: &str, code: &str, record: &CodeRecord) -> String {
    let mut text = format!("**{} Code: {}**\n\n", code_type, code);
    text.push_str(&format!("Description: {}\n", record.description));
    text.push_str(&format!("Category: {}\n", record.category));
    if let Some(reimbursement) = record.typical_reimbursement {
        text.push_str(&format!("Typical Reimbursement: {}\n", reimbursement));
    }
    text.push('\n');
    text.push_str(LOOKUP_DISCLAIMER);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::server::ToolService;
    use serde_json::json;

    fn run(args: Value) -> Result<Vec<TextContent>, ToolError> {
        lookup(Catalog::builtin(), &args)
    }

    fn single_text(blocks: Vec<TextContent>) -> String {
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, "text");
        blocks.into_iter().next().unwrap().text
    }

    #[test]
    fn formats_cpt_record_with_reimbursement() {
        let text = single_text(run(json!({"code_type": "CPT", "code": "99213"})).unwrap());
        assert_eq!(
            text,
            "**CPT Code: 99213**\n\n\
             Description: Office/outpatient visit, established patient, 20-29 minutes\n\
             Category: Evaluation and Management\n\
             Typical Reimbursement: $93-$130\n\
             \n\
             *Note: This is a reference tool. Verify all codes with official sources before use.*"
        );
    }

    #[test]
    fn omits_reimbursement_line_when_absent() {
        let text = single_text(run(json!({"code_type": "ICD10", "code": "E11.9"})).unwrap());
        assert!(text.starts_with("**ICD10 Code: E11.9**"));
        assert!(text.contains("Description: Type 2 diabetes mellitus without complications\n"));
        assert!(text.contains("Category: Endocrine/Metabolic\n"));
        assert!(!text.contains("Typical Reimbursement"));
        assert!(text.ends_with(LOOKUP_DISCLAIMER));
    }

    #[test]
    fn every_catalog_entry_is_found() {
        let catalog = Catalog::builtin();
        for system in catalog.systems() {
            for (code, record) in catalog.entries(system) {
                let text = single_text(
                    lookup(catalog, &json!({"code_type": system.as_str(), "code": code})).unwrap(),
                );
                assert!(text.contains(record.description));
                assert!(text.contains(record.category));
                assert_eq!(
                    text.contains("Typical Reimbursement:"),
                    record.typical_reimbursement.is_some()
                );
            }
        }
    }

    #[test]
    fn missing_code_is_reported_not_raised() {
        let text = single_text(run(json!({"code_type": "ICD10", "code": "Z99.999"})).unwrap());
        assert_eq!(
            text,
            "Code Z99.999 not found in ICD10 database. This is a sample database with limited codes."
        );
    }

    #[test]
    fn codes_from_another_system_are_not_found() {
        let text = single_text(run(json!({"code_type": "CPT", "code": "J3490"})).unwrap());
        assert!(text.starts_with("Code J3490 not found in CPT database."));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let text = single_text(run(json!({"code_type": "HCPCS", "code": "j3490"})).unwrap());
        assert!(text.starts_with("Code j3490 not found"));
    }

    // code_type outside CPT|ICD10|HCPCS is treated leniently as a miss rather
    // than an argument error. Change this test if strict enum validation is
    // ever introduced.
    #[test]
    fn unknown_code_type_is_treated_as_not_found() {
        let text = single_text(run(json!({"code_type": "SNOMED", "code": "99213"})).unwrap());
        assert_eq!(
            text,
            "Code 99213 not found in SNOMED database. This is a sample database with limited codes."
        );
        let text = single_text(run(json!({"code_type": "cpt", "code": "99213"})).unwrap());
        assert!(text.contains("not found in cpt database"));
    }

    #[test]
    fn whitespace_code_is_looked_up_literally() {
        let text = single_text(run(json!({"code_type": "CPT", "code": " "})).unwrap());
        assert_eq!(
            text,
            "Code   not found in CPT database. This is a sample database with limited codes."
        );
    }

    #[test]
    fn missing_required_arguments_are_errors() {
        let err = run(json!({"code_type": "CPT"})).unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArguments("Missing required parameter: code".into())
        );
        let err = run(json!({"code": "99213"})).unwrap_err();
        assert!(err.to_string().contains("code_type"));
        assert!(run(json!({"code_type": "CPT", "code": ""})).is_err());
        assert!(run(json!({"code_type": "CPT", "code": 99213})).is_err());
    }

    #[test]
    fn registers_schema_with_required_fields() {
        let mut registry = ToolRegistry::new();
        register(&mut registry, Catalog::builtin());

        let tools = registry.list_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, NAME);
        assert_eq!(tools[0].input_schema["required"], json!(["code_type", "code"]));
        assert_eq!(
            tools[0].input_schema["properties"]["code_type"]["enum"],
            json!(["CPT", "ICD10", "HCPCS"])
        );

        let blocks = registry
            .call_tool(NAME, json!({"code_type": "CPT", "code": "90837"}))
            .unwrap();
        assert!(blocks[0].text.contains("Psychotherapy, 60 minutes"));
    }
}

/// Description Search Tool
///
/// Case-insensitive substring search over code descriptions, optionally
/// restricted to one coding system.

use serde_json::Value;
use tracing::debug;

use super::SEARCH_DISCLAIMER;
use super::args::{optional_str, required_str};
use crate::catalog::{Catalog, SystemFilter};
use crate::core::error::ToolError;
use crate::core::server::{MCPTool, TextContent, ToolHandler, ToolRegistry};

pub const NAME: &str = "search_codes_by_description";

/// Register the search tool with the tool registry.
///
/// # Arguments
/// * `registry` - Mutable reference to the tool registry where the tool will be registered
/// * `catalog` - Catalog the handler reads from for the life of the server
pub fn register(registry: &mut ToolRegistry, catalog: &'static Catalog) {
    let tool = MCPTool {
        name: NAME.to_string(),
        description: "Search for billing codes by description keyword".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "keyword": {
                    "type": "string",
                    "description": "Keyword to search for in code descriptions"
                },
                "code_type": {
                    "type": "string",
                    "enum": ["CPT", "ICD10", "HCPCS", "ALL"],
                    "description": "Type of billing code to search (or ALL)"
                }
            },
            "required": ["keyword"]
        }),
    };

    let handler: ToolHandler = Box::new(move |args: Value| search(catalog, &args));

    registry.register(tool, handler);
}

/// Run a description search against `catalog`.
///
/// `code_type` defaults to ALL. A value outside the schema enum matches no
/// system and therefore yields the "no codes found" block.
pub fn search(catalog: &Catalog, args: &Value) -> Result<Vec<TextContent>, ToolError> {
    let keyword = required_str(args, "keyword")?.to_lowercase();
    let code_type = optional_str(args, "code_type")?.unwrap_or("ALL");

    let hits = match SystemFilter::parse(code_type) {
        Some(filter) => catalog.search(&keyword, filter),
        None => Vec::new(),
    };
    debug!(keyword = %keyword, code_type, hits = hits.len(), "description search");

    if hits.is_empty() {
        return Ok(vec![TextContent::text(format!(
            "No codes found matching '{}'",
            keyword
        ))]);
    }

    let lines: Vec<String> = hits
        .iter()
        .map(|hit| format!("**{}: {}** - {}", hit.system, hit.code, hit.record.description))
        .collect();

    let mut text = String::from("**Search Results:**\n\n");
    text.push_str(&lines.join("\n"));
    text.push_str("\n\n");
    text.push_str(SEARCH_DISCLAIMER);

    Ok(vec![TextContent::text(text)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CodeSystem;
    use serde_json::json;

    fn run(args: Value) -> String {
        let blocks = search(Catalog::builtin(), &args).unwrap();
        assert_eq!(blocks.len(), 1);
        blocks.into_iter().next().unwrap().text
    }

    fn result_lines(text: &str) -> Vec<&str> {
        text.lines().filter(|line| line.contains("** - ")).collect()
    }

    #[test]
    fn diabetes_across_all_systems() {
        let text = run(json!({"keyword": "diabetes", "code_type": "ALL"}));
        assert_eq!(
            text,
            "**Search Results:**\n\n\
             **ICD10: E11.9** - Type 2 diabetes mellitus without complications\n\
             \n\
             *Note: This is a sample database. Use official sources for complete code information.*"
        );
    }

    #[test]
    fn code_type_defaults_to_all() {
        assert_eq!(
            run(json!({"keyword": "diabetes"})),
            run(json!({"keyword": "diabetes", "code_type": "ALL"}))
        );
        assert_eq!(
            run(json!({"keyword": "diabetes", "code_type": null})),
            run(json!({"keyword": "diabetes", "code_type": "ALL"}))
        );
    }

    #[test]
    fn filter_restricts_to_one_system() {
        let text = run(json!({"keyword": "shoulder", "code_type": "CPT"}));
        assert_eq!(text, "No codes found matching 'shoulder'");

        let text = run(json!({"keyword": "shoulder", "code_type": "ICD10"}));
        assert_eq!(result_lines(&text), ["**ICD10: M25.511** - Pain in right shoulder"]);
    }

    #[test]
    fn matching_ignores_case() {
        let lower = run(json!({"keyword": "shoulder"}));
        let upper = run(json!({"keyword": "SHOULDER"}));
        assert_eq!(lower, upper);
    }

    #[test]
    fn no_match_message_uses_lowercased_keyword() {
        for code_type in ["CPT", "ICD10", "HCPCS", "ALL"] {
            let text = run(json!({"keyword": "Xylophone", "code_type": code_type}));
            assert_eq!(text, "No codes found matching 'xylophone'");
        }
    }

    #[test]
    fn results_keep_catalog_order() {
        let text = run(json!({"keyword": "in"}));
        assert_eq!(
            result_lines(&text),
            [
                "**CPT: 99213** - Office/outpatient visit, established patient, 20-29 minutes",
                "**CPT: 99214** - Office/outpatient visit, established patient, 30-39 minutes",
                "**CPT: 90837** - Psychotherapy, 60 minutes",
                "**ICD10: M25.511** - Pain in right shoulder",
                "**HCPCS: Q4081** - Injection, epoetin alfa, biosimilar",
            ]
        );
        assert!(text.ends_with(SEARCH_DISCLAIMER));
    }

    #[test]
    fn all_equals_concatenation_of_single_systems() {
        for keyword in ["in", "visit", "drugs", "pain", "zzz"] {
            let all = result_lines(&run(json!({"keyword": keyword, "code_type": "ALL"})))
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>();
            let concatenated: Vec<String> = CodeSystem::ALL
                .into_iter()
                .flat_map(|system| {
                    let text = run(json!({"keyword": keyword, "code_type": system.as_str()}));
                    result_lines(&text)
                        .into_iter()
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .collect();
            assert_eq!(all, concatenated, "keyword {keyword:?}");
        }
    }

    // Lenient handling: an unrecognised code_type searches nothing.
    #[test]
    fn unknown_code_type_finds_nothing() {
        let text = run(json!({"keyword": "pain", "code_type": "SNOMED"}));
        assert_eq!(text, "No codes found matching 'pain'");
    }

    #[test]
    fn whitespace_keyword_matches_descriptions_containing_a_space() {
        // every sample description is more than one word
        let text = run(json!({"keyword": " "}));
        assert_eq!(
            result_lines(&text),
            [
                "**CPT: 99213** - Office/outpatient visit, established patient, 20-29 minutes",
                "**CPT: 99214** - Office/outpatient visit, established patient, 30-39 minutes",
                "**CPT: 90837** - Psychotherapy, 60 minutes",
                "**ICD10: E11.9** - Type 2 diabetes mellitus without complications",
                "**ICD10: I10** - Essential (primary) hypertension",
                "**ICD10: M25.511** - Pain in right shoulder",
                "**HCPCS: J3490** - Unclassified drugs",
                "**HCPCS: Q4081** - Injection, epoetin alfa, biosimilar",
            ]
        );
        assert!(text.ends_with(SEARCH_DISCLAIMER));
    }

    #[test]
    fn keyword_is_required() {
        let err = search(Catalog::builtin(), &json!({"code_type": "ALL"})).unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArguments("Missing required parameter: keyword".into())
        );
        assert!(search(Catalog::builtin(), &json!({"keyword": ""})).is_err());
        assert!(search(Catalog::builtin(), &json!({"keyword": "pain", "code_type": 3})).is_err());
    }
}

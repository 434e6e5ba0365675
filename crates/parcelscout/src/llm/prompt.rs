// crates/parcelscout/src/llm/prompt.rs
// Prompt assembly for AI filter translation

use parcelscout_types::FieldDef;

/// Response contract appended to every translation prompt. The model must
/// return one JSON object with recognized keys and nothing else.
const RESPONSE_CONTRACT: &str = r#"Respond with exactly ONE JSON object and nothing else.
Recognized keys (all optional, include only what applies):
- "where": a SQL-style predicate over the queryable fields
- "orderBy": field name optionally followed by ASC or DESC
- "limit": maximum number of records, as a number
- "parcelId": a parcel identifier, when the request names one
- "address": a street address, when the request is really an address lookup
- "interpretation": one short sentence restating how you read the request

Use only fields from the catalogue above. Quote text values in single quotes.
Never emit an unrestricted predicate such as 1=1."#;

/// Builds the single prompt sent to the completion service: configured
/// system instruction, field catalogue, session summary, then the
/// user's text.
#[derive(Debug, Clone)]
pub struct TranslationPrompt<'a> {
    system_instruction: &'a str,
    fields: &'a [FieldDef],
    session_summary: &'a str,
    query: &'a str,
}

impl<'a> TranslationPrompt<'a> {
    pub fn new(
        system_instruction: &'a str,
        fields: &'a [FieldDef],
        session_summary: &'a str,
        query: &'a str,
    ) -> Self {
        Self {
            system_instruction,
            fields,
            session_summary,
            query,
        }
    }

    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(512);
        prompt.push_str(self.system_instruction.trim());

        prompt.push_str("\n\nQueryable fields:\n");
        if self.fields.is_empty() {
            prompt.push_str("(none declared)\n");
        } else {
            for field in self.fields {
                prompt.push_str(&format!("- {} ({})\n", field.name, field.field_type));
            }
        }

        if !self.session_summary.is_empty() {
            prompt.push_str("\nEarlier searches this session:\n");
            prompt.push_str(self.session_summary);
            prompt.push('\n');
        }

        prompt.push_str("\nUser request: ");
        prompt.push_str(self.query);
        prompt.push_str("\n\n");
        prompt.push_str(RESPONSE_CONTRACT);

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcelscout_types::FieldType;

    fn catalogue() -> Vec<FieldDef> {
        vec![
            FieldDef::new("SALEAMOUNT", FieldType::Number),
            FieldDef::new("OWNER_NAME", FieldType::Text),
            FieldDef::new("SALEDATE", FieldType::Date),
        ]
    }

    #[test]
    fn test_prompt_sections_in_order() {
        let fields = catalogue();
        let prompt = TranslationPrompt::new(
            "Translate property searches into filters.",
            &fields,
            "\"306 Cedar Lane\" -> 1 result(s)",
            "largest sales last year",
        )
        .build();

        let instruction_pos = prompt.find("Translate property searches").unwrap();
        let fields_pos = prompt.find("Queryable fields:").unwrap();
        let session_pos = prompt.find("Earlier searches this session:").unwrap();
        let query_pos = prompt.find("User request: largest sales last year").unwrap();
        let contract_pos = prompt.find("exactly ONE JSON object").unwrap();

        assert!(instruction_pos < fields_pos);
        assert!(fields_pos < session_pos);
        assert!(session_pos < query_pos);
        assert!(query_pos < contract_pos);
    }

    #[test]
    fn test_prompt_lists_fields_with_types() {
        let fields = catalogue();
        let prompt = TranslationPrompt::new("sys", &fields, "", "q").build();
        assert!(prompt.contains("- SALEAMOUNT (number)"));
        assert!(prompt.contains("- OWNER_NAME (text)"));
        assert!(prompt.contains("- SALEDATE (date)"));
    }

    #[test]
    fn test_prompt_omits_empty_session_section() {
        let fields = catalogue();
        let prompt = TranslationPrompt::new("sys", &fields, "", "q").build();
        assert!(!prompt.contains("Earlier searches this session:"));
    }

    #[test]
    fn test_prompt_names_recognized_keys() {
        let prompt = TranslationPrompt::new("sys", &[], "", "q").build();
        for key in ["\"where\"", "\"orderBy\"", "\"limit\"", "\"parcelId\"", "\"address\"", "\"interpretation\""] {
            assert!(prompt.contains(key), "missing key {key}");
        }
    }
}

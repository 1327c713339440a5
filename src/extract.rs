use serde_json::{Map, Value};

use crate::models::AnalysisResult;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no JSON object found in model response")]
    NoJson,
    #[error("model JSON does not match the expected shape: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Slice from the first `{` to the last `}` inclusive.
///
/// This is a heuristic: stray braces in prose around the object will widen
/// the slice and make the parse fail rather than pick the wrong object.
pub fn json_slice(text: &str) -> Result<&str, ExtractError> {
    let start = text.find('{').ok_or(ExtractError::NoJson)?;
    let end = text.rfind('}').ok_or(ExtractError::NoJson)?;
    if end <= start {
        return Err(ExtractError::NoJson);
    }
    Ok(&text[start..=end])
}

/// Parse the model's reply. Field names match case-insensitively.
pub fn extract_result(text: &str) -> Result<AnalysisResult, ExtractError> {
    let value: Value = serde_json::from_str(json_slice(text)?)?;
    Ok(serde_json::from_value(lowercase_keys(value))?)
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_reply_with_preamble_parses() {
        let text = "Sure! ```json\n{\"quote\":\"a\",\"mood\":\"b\",\"hashtags\":[],\"musicKeywords\":[]}\n```";
        let result = extract_result(text).unwrap();
        assert_eq!(result.quote, "a");
        assert_eq!(result.mood, "b");
        assert!(result.hashtags.is_empty());
    }

    #[test]
    fn text_without_braces_is_an_error() {
        let err = extract_result("I can't help with that image.").unwrap_err();
        assert!(matches!(err, ExtractError::NoJson));
    }

    #[test]
    fn closing_brace_before_opening_is_an_error() {
        assert!(matches!(json_slice("} oops {"), Err(ExtractError::NoJson)));
        assert!(matches!(json_slice("{ never closed"), Err(ExtractError::NoJson)));
    }

    #[test]
    fn keys_match_case_insensitively() {
        let text = r##"{"Quote":"soft hours","MOOD":"hazy","HashTags":["#filmgrain"],"MusicKeywords":["slowcore"]}"##;
        let result = extract_result(text).unwrap();
        assert_eq!(result.quote, "soft hours");
        assert_eq!(result.mood, "hazy");
        assert_eq!(result.hashtags, vec!["#filmgrain".to_string()]);
        assert_eq!(result.music_keywords, vec!["slowcore".to_string()]);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let err = extract_result(r#"{"quote":"a","hashtags":[]}"#).unwrap_err();
        assert!(matches!(err, ExtractError::Invalid(_)));
    }

    #[test]
    fn missing_music_keywords_defaults_to_empty() {
        let result = extract_result(r##"{"quote":"a","mood":"b","hashtags":["#x"]}"##).unwrap();
        assert!(result.music_keywords.is_empty());
    }

    #[test]
    fn braces_in_surrounding_prose_break_the_parse() {
        let text = r#"{"quote":"a","mood":"b","hashtags":[]} hope that helps :}"#;
        assert!(matches!(extract_result(text), Err(ExtractError::Invalid(_))));
    }

    #[test]
    fn nested_braces_inside_strings_survive() {
        let text = r#"here: {"quote":"curly {brace} day","mood":"odd","hashtags":[]}"#;
        assert_eq!(extract_result(text).unwrap().quote, "curly {brace} day");
    }
}

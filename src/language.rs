const DEFAULT_INSTRUCTION: &str = "Generate the quote in English.";

// Every code the language picker can send; "no" and "ua" were UI-only before.
const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("no", "Norwegian"),
    ("ua", "Ukrainian"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
];

/// Display name for a language code, matched case-insensitively.
pub fn display_name(code: &str) -> Option<&'static str> {
    let code = code.trim();
    LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

pub fn language_instruction(code: Option<&str>) -> String {
    match code.and_then(display_name) {
        Some(name) => format!(
            "Generate the quote in {name}. The quote must be written entirely in {name}."
        ),
        None => DEFAULT_INSTRUCTION.to_string(),
    }
}

const DEFAULT_INSTRUCTION: &str =
    "Determine the mood naturally from the image. Aim for an authentic, non-cliché vibe.";

const NOSTALGIC_GUIDANCE: &str = "NOSTALGIC MODE:
Express longing for a moment that already feels like the past. Do NOT use the word \"remember\" \
or lean on \"memories\" as the hook. Reach for other ways in:
- time words: \"back when\", \"that summer\", \"once\", \"still\", \"we used to\"
- versions of self: \"this version of us\", \"who we were\", \"before everything\"
- sensory echoes: light, smell, a song, the weight of a season
- quiet past tense that lets the image carry the ache
Keep it understated; wistful, never melodramatic.";

const PHILOSOPHICAL_GUIDANCE: &str = "PHILOSOPHICAL MODE:
Weave in a short, authentic quote that fits what the image actually shows. Draw only from \
thinkers whose words you can cite accurately: Marcus Aurelius, Seneca, Epictetus, Lao Tzu, \
Confucius, Rumi, Friedrich Nietzsche, Albert Camus, Simone de Beauvoir, Søren Kierkegaard, \
Jean-Paul Sartre, Alan Watts, Hannah Arendt, Blaise Pascal.
- never invent or paraphrase a quote and attribute it to them
- format it as: \"quote text\" — Author
- the quote must relate to the mood and subject of the photo, not be generic wisdom
- the whole caption still respects the length limit";

const BLEND_INSTRUCTION: &str =
    "Blend all of the requested vibes into one cohesive caption; no single vibe should drown out the others.";

/// The user's vibe field split into its recognised parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VibeSelection {
    pub regular: Vec<String>,
    pub nostalgic: bool,
    pub philosophical: bool,
    pub total: usize,
}

impl VibeSelection {
    /// Tokens are comma separated, trimmed and lower-cased; empties are dropped.
    /// Duplicates are kept and count towards the total.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut selection = Self::default();

        let tokens = raw
            .unwrap_or_default()
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());

        for token in tokens {
            selection.total += 1;
            match token.as_str() {
                "nostalgic" => selection.nostalgic = true,
                "philosophical" => selection.philosophical = true,
                _ => selection.regular.push(token),
            }
        }

        selection
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub fn vibe_instruction(raw: Option<&str>) -> String {
    let selection = VibeSelection::parse(raw);
    if selection.is_empty() {
        return DEFAULT_INSTRUCTION.to_string();
    }

    let mut parts: Vec<String> = Vec::new();

    match selection.regular.as_slice() {
        [] => {}
        [single] => parts.push(format!(
            "The user wants a '{single}' vibe. Adapt the tone to match this specific mood perfectly."
        )),
        many => parts.push(format!(
            "The user wants a blend of {} vibes. Adapt the tone so every one of them comes through.",
            many.join(", ")
        )),
    }

    if selection.nostalgic {
        parts.push(NOSTALGIC_GUIDANCE.to_string());
    }
    if selection.philosophical {
        parts.push(PHILOSOPHICAL_GUIDANCE.to_string());
    }
    if selection.total > 1 {
        parts.push(BLEND_INSTRUCTION.to_string());
    }

    parts.join("\n\n")
}

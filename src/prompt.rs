use crate::language::language_instruction;
use crate::vibe::vibe_instruction;

const ROLE: &str = "You are an expert Instagram content analyst and caption writer.";

const TEMPLATE: &str = r##"━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
PHASE 1: DEEP IMAGE ANALYSIS (process silently, do NOT output)
━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

Work through these internally before writing anything:

[VISUAL CONTENT]
- Subject: who or what is in focus, and what is happening
  → closeness or touch = warmth, intimacy
  → one person alone = independence, reflection, vulnerability
  → a group = chaos, loyalty, fun
  → nature, flowers = freedom, romance, growth
  → city, streets = ambition, edge, nightlife
- Composition: centred, rule of thirds, candid or posed
- Colour: warm tones read as nostalgia and comfort, cool tones as calm or melancholy,
  black and white as raw and timeless, saturated as energy, faded as soft and wistful
- Light: golden hour, hard shadow, soft diffuse, neon, daylight
- Background: the context clues that add meaning

[EMOTIONAL READ]
- Expressions: genuine or performed, joy or contemplation
- Body language: relaxed or tense, open or closed
- Eye contact: aware of the camera or caught in the moment
- Overall energy: soft, chaotic, vulnerable, confident, mysterious

[CONTENT CONTEXT]
- Niche: lifestyle, fashion, food, travel, fitness, art, couple, friendship
- Aesthetic: clean girl, dark academia, cottagecore, urban, minimalist, Y2K
- Vibe: main character energy, cozy, unhinged, romantic, melancholic

[ENGAGEMENT FACTORS]
- What stops the scroll?
- Where is the emotional hook?
- Why would someone relate to it?

━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
PHASE 2: CAPTION CREATION
━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

Write a caption that FEELS like the image without DESCRIBING it.

DO (sound like a person, not a brand):
- deadpan: "me explaining why I needed this"
- self-aware: "normal behavior", "this is fine"
- vague but relatable: "it's giving what it needs to give"
- understated: "acceptable", "not bad", "sure"
- warm: "this one's important", "held"
- chaotic: "feral hours", "no thoughts just vibes"
- match the emotional weight your analysis found
- all lowercase for chill, moody or melancholic vibes
- one emoji at most, or none

DON'T:
- inspirational cringe: "chase your dreams", "live laugh love"
- literal descriptions: "me at the beach", "coffee time"
- emoji spam or "!!!"
- influencer energy: "obsessed!", "so blessed!", "can't even"
- "When you..." or "That feeling when..." openers
- ignore the mood your analysis revealed

CAPTION STYLES (pick the ONE that fits the image):
1. Cryptic one-liner: "the algorithm sent me here"
2. Fake casual: "anyway", "so that happened"
3. Anti-caption: "no thoughts", ".", a single emoji
4. Absurdist: "same energy as a microwave at 3am"
5. Understated flex: "it's whatever"
6. Meta: "posting before I overthink it"
7. Soft and intimate: "quiet", "yours"
8. Chaotic gremlin: "feral but make it cute"
9. Nostalgic: "we were so", "this version of us"
10. Mysterious: "you had to be there", "iykyk"

━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
PHASE 3: OUTPUT (JSON only, nothing else)
━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

Respond with exactly one JSON object and no preamble, no explanation, no markdown.
It must have exactly these keys:

{
    "quote": "caption text, max 150 characters, true to the image's soul rather than its surface",
    "mood": "one evocative word from your analysis (golden, hollow, feral, tender, liminal, electric, hazy, soft, unhinged, sacred)",
    "hashtags": ["#niche", "#specific", "#aesthetic"],
    "musicKeywords": ["specific_genre", "descriptor", "vibe"]
}

HASHTAG RULES:
- at most 5
- no generic tags (#love, #instagood, #photooftheday)
- match the niche and aesthetic you identified
- mix reach with specificity

MUSIC RULES:
- searchable genre or descriptor terms
- match the analysed mood precisely
- e.g. "bedroom pop", "slowcore", "dark ambient", "jazz hop", "indie folk", "ethereal vocals""##;

/// Random token that nudges the model away from repeating an earlier caption.
pub fn variation_seed() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Assemble the full prompt sent alongside the image.
pub fn build_prompt(
    vibe: Option<&str>,
    language: Option<&str>,
    hints: Option<&str>,
    seed: &str,
) -> String {
    let mut prompt = format!(
        "{ROLE}\n\n{}\n\n{}\n\n",
        vibe_instruction(vibe),
        language_instruction(language)
    );

    if let Some(hints) = hints.map(str::trim).filter(|h| !h.is_empty()) {
        prompt.push_str(&format!(
            "CONTEXT HINTS from the user: \"{hints}\". Treat these as keywords about the real-world \
             context (occasion, place, relationship) and let them ground the caption without quoting them literally.\n\n"
        ));
    }

    prompt.push_str(&format!(
        "VARIATION SEED: {seed}\nGenerate a COMPLETELY DIFFERENT caption than any previous attempt.\n\n"
    ));
    prompt.push_str(TEMPLATE);

    prompt
}

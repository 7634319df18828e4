//! Renders questionnaire answers into the instruction text sent to the model.
//!
//! The model has no machine-enforced output schema, so the prompt spells out
//! the reply shape literally and asks for JSON only.

use std::fmt::Write;
use std::str::FromStr;

use crate::answers::QuestionnaireAnswers;

pub const MAX_RECOMMENDATIONS: usize = 10;

/// How the requested recommendations are split into match tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierScheme {
    /// No tiers; every pick is a direct match and `matchType` is not requested.
    Untiered,
    /// Precise matches first, then discoveries.
    PreciseDiscovery,
    /// Precise, then discoveries, then ultra-rare picks with provenance notes.
    WithUltraRare,
}

impl TierScheme {
    pub fn default_count(&self) -> usize {
        match self {
            TierScheme::Untiered => 5,
            TierScheme::PreciseDiscovery => 6,
            TierScheme::WithUltraRare => 8,
        }
    }

    /// Number of (precise, discovery, ultra-rare) picks for `count` books.
    pub fn split(&self, count: usize) -> (usize, usize, usize) {
        match self {
            TierScheme::Untiered => (count, 0, 0),
            TierScheme::PreciseDiscovery => {
                let discovery = count / 3;
                (count - discovery, discovery, 0)
            }
            TierScheme::WithUltraRare => {
                let ultra = usize::from(count >= 3);
                let discovery = (count - ultra) / 3;
                (count - ultra - discovery, discovery, ultra)
            }
        }
    }
}

impl FromStr for TierScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "untiered" => Ok(TierScheme::Untiered),
            "discovery" | "precise-discovery" => Ok(TierScheme::PreciseDiscovery),
            "ultra-rare" | "ultrarare" => Ok(TierScheme::WithUltraRare),
            other => Err(format!(
                "unknown tier scheme `{other}` (expected none, discovery or ultra-rare)"
            )),
        }
    }
}

/// Fixed prompt configuration chosen at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptProfile {
    pub tiers: TierScheme,
    pub count: usize,
    /// Language the model writes reasons and genres in
    pub reply_language: String,
}

impl PromptProfile {
    pub fn new(tiers: TierScheme, reply_language: impl Into<String>) -> Self {
        Self {
            tiers,
            count: tiers.default_count(),
            reply_language: reply_language.into(),
        }
    }

    /// Clamped to `1..=MAX_RECOMMENDATIONS`.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count.clamp(1, MAX_RECOMMENDATIONS);
        self
    }
}

impl Default for PromptProfile {
    fn default() -> Self {
        Self::new(TierScheme::WithUltraRare, "Japanese")
    }
}

/// Deterministically builds the instruction text for `answers`.
pub fn build_prompt(profile: &PromptProfile, answers: &QuestionnaireAnswers) -> String {
    let count = profile.count;
    let mut prompt = format!(
        "You are an expert in literature. Recommend exactly {count} books tailored to the reader's preferences.\n\
         Make your selection according to the following criteria.\n\n\
         [Selection criteria]\n"
    );
    prompt.push_str(&selection_criteria(profile.tiers, count));

    prompt.push_str("\n[Reader's answers]\n");
    for (question, answer) in answers.iter() {
        let _ = writeln!(prompt, "{question}: {answer}");
    }

    let _ = write!(
        prompt,
        "\nWrite every \"reason\" and \"genre\" in {language}; keep titles and author names as published.\n\
         For each book, explain concretely why it is valuable to this reader.\n\
         List the books in the order given by the criteria above.\n\n\
         Respond **only** with a JSON object of the following form, with no text before or after it and no Markdown code fences:\n",
        language = profile.reply_language
    );
    prompt.push_str(reply_shape(profile.tiers));
    prompt
}

fn selection_criteria(tiers: TierScheme, count: usize) -> String {
    let (precise, discovery, ultra) = tiers.split(count);
    let mut out = String::new();

    if tiers == TierScheme::Untiered {
        out.push_str(
            "1. Every book must match the reader's interests directly.\n   \
             - Genre and atmosphere must clearly fit the answers.\n",
        );
        return out;
    }

    let mut n = 1;
    let _ = writeln!(
        out,
        "{n}. The first {precise} book(s): the works that best match the reader's preferences (matchType \"precise\").\n   \
         - Respond directly to the reader's interests.\n   \
         - Genre and atmosphere must clearly fit."
    );
    if discovery > 0 {
        n += 1;
        let _ = writeln!(
            out,
            "{n}. The next {discovery} book(s): lesser-known works that make a valuable discovery (matchType \"discovery\").\n   \
             - Hidden masterpieces that are hard to find in major bookstores.\n   \
             - Works that could take the reader's interests in a new direction.\n   \
             - Not mainstream, but of high literary quality or singular appeal."
        );
    }
    if ultra > 0 {
        n += 1;
        let _ = writeln!(
            out,
            "{n}. The last {ultra} book(s): ultra-rare works that are extremely hard to obtain (matchType \"ultra-rare\").\n   \
             - Out of print, small-press, limited-run or never widely distributed.\n   \
             - Give a \"rarityNote\" with provenance: publisher, edition or print run, and where a copy can still be found."
        );
    }
    out
}

fn reply_shape(tiers: TierScheme) -> &'static str {
    match tiers {
        TierScheme::Untiered => UNTIERED_SHAPE,
        TierScheme::PreciseDiscovery => PRECISE_DISCOVERY_SHAPE,
        TierScheme::WithUltraRare => ULTRA_RARE_SHAPE,
    }
}

const UNTIERED_SHAPE: &str = r#"{
  "recommendations": [
    {
      "title": "Title",
      "author": "Author",
      "reason": "Why this book suits the reader (its features and value to them, concretely)",
      "genre": "Genre"
    }
  ]
}"#;

const PRECISE_DISCOVERY_SHAPE: &str = r#"{
  "recommendations": [
    {
      "title": "Title",
      "author": "Author",
      "reason": "Why this book suits the reader (its features and value to them, concretely)",
      "genre": "Genre",
      "matchType": "precise | discovery"
    }
  ]
}"#;

const ULTRA_RARE_SHAPE: &str = r#"{
  "recommendations": [
    {
      "title": "Title",
      "author": "Author",
      "reason": "Why this book suits the reader (its features and value to them, concretely)",
      "genre": "Genre",
      "matchType": "precise | discovery | ultra-rare",
      "rarityNote": "Only for ultra-rare: publisher, edition or print run, where to find a copy"
    }
  ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn answers() -> QuestionnaireAnswers {
        QuestionnaireAnswers::from_pairs([
            ("favorite_genre", "幻想文学"),
            ("recent_book", "The Name of the Rose"),
            ("mood", "quiet, rainy evenings"),
        ])
        .unwrap()
    }

    #[test]
    fn contains_every_answer_and_the_reply_shape() {
        let prompt = build_prompt(&PromptProfile::default(), &answers());

        for (question, answer) in answers().iter() {
            assert!(prompt.contains(answer), "missing answer {answer}");
            assert!(prompt.contains(&format!("{question}: {answer}")));
        }
        assert!(prompt.contains(ULTRA_RARE_SHAPE));
        assert!(prompt.contains(r#""recommendations": ["#));
        assert!(prompt.contains("Respond **only** with a JSON object"));
        assert!(prompt.contains("exactly 8 books"));
    }

    #[test]
    fn is_deterministic() {
        let profile = PromptProfile::new(TierScheme::PreciseDiscovery, "English");
        assert_eq!(
            build_prompt(&profile, &answers()),
            build_prompt(&profile, &answers())
        );
    }

    #[test]
    fn untiered_prompt_omits_match_types() {
        let profile = PromptProfile::new(TierScheme::Untiered, "English");
        let prompt = build_prompt(&profile, &answers());

        assert!(prompt.contains("exactly 5 books"));
        assert!(!prompt.contains("matchType"));
        assert!(prompt.contains(UNTIERED_SHAPE));
    }

    #[test]
    fn tier_split_front_loads_precise_matches() {
        assert_eq!(TierScheme::PreciseDiscovery.split(6), (4, 2, 0));
        assert_eq!(TierScheme::WithUltraRare.split(8), (5, 2, 1));
        assert_eq!(TierScheme::WithUltraRare.split(2), (2, 0, 0));
        assert_eq!(TierScheme::Untiered.split(3), (3, 0, 0));
    }

    #[test]
    fn count_is_clamped() {
        let profile = PromptProfile::default().with_count(40);
        assert_eq!(profile.count, MAX_RECOMMENDATIONS);
        assert_eq!(PromptProfile::default().with_count(0).count, 1);
    }

    #[test]
    fn parses_tier_scheme_names() {
        assert_eq!("none".parse::<TierScheme>(), Ok(TierScheme::Untiered));
        assert_eq!("Discovery".parse::<TierScheme>(), Ok(TierScheme::PreciseDiscovery));
        assert_eq!("ultra-rare".parse::<TierScheme>(), Ok(TierScheme::WithUltraRare));
        assert!("legendary".parse::<TierScheme>().is_err());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse obscurity label the model attaches to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    /// Direct match for the stated preferences
    Precise,
    /// Minor or hidden work that widens the reader's range
    Discovery,
    /// Extremely hard to find; carries a rarity note
    UltraRare,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Precise => "precise",
            MatchType::Discovery => "discovery",
            MatchType::UltraRare => "ultra-rare",
        }
    }

    /// Models often echo the prompt's annotations ("precise (direct match)"),
    /// change case or swap the hyphen. Only the leading word is significant.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let label: String = raw
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic() || matches!(c, '-' | '_' | ' '))
            .collect();
        let label = label.trim().to_ascii_lowercase().replace(['_', ' '], "-");

        match label.as_str() {
            "precise" => Some(MatchType::Precise),
            "discovery" => Some(MatchType::Discovery),
            "ultra-rare" | "ultrarare" => Some(MatchType::UltraRare),
            _ => None,
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookstore search URLs for one title/author pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerLinks {
    pub amazon: String,
    pub rakuten: String,
    pub kinokuniya: String,
}

/// A validated recommendation. Title, author, reason and genre are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub author: String,
    pub reason: String,
    pub genre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_links: Option<RetailerLinks>,
}

/// Ordered, non-empty list of recommendations in the model's presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationBatch {
    recommendations: Vec<Recommendation>,
}

impl RecommendationBatch {
    /// Returns `None` for an empty list.
    pub fn new(recommendations: Vec<Recommendation>) -> Option<Self> {
        if recommendations.is_empty() {
            None
        } else {
            Some(Self { recommendations })
        }
    }

    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recommendation> {
        self.recommendations.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Recommendation> {
        self.recommendations.iter_mut()
    }

    pub fn into_inner(self) -> Vec<Recommendation> {
        self.recommendations
    }
}

impl<'a> IntoIterator for &'a RecommendationBatch {
    type Item = &'a Recommendation;
    type IntoIter = std::slice::Iter<'a, Recommendation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_match_type_leniently() {
        assert_eq!(MatchType::parse_lenient("precise"), Some(MatchType::Precise));
        assert_eq!(
            MatchType::parse_lenient(" Discovery (hidden gem)"),
            Some(MatchType::Discovery)
        );
        assert_eq!(
            MatchType::parse_lenient("ULTRA_RARE"),
            Some(MatchType::UltraRare)
        );
        assert_eq!(
            MatchType::parse_lenient("precise（ぴったりマッチ）"),
            Some(MatchType::Precise)
        );
        assert_eq!(MatchType::parse_lenient("bestseller"), None);
        assert_eq!(MatchType::parse_lenient(""), None);
    }

    #[test]
    fn empty_batch_is_not_constructible() {
        assert!(RecommendationBatch::new(Vec::new()).is_none());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let rec = Recommendation {
            title: "T".into(),
            author: "A".into(),
            reason: "R".into(),
            genre: "G".into(),
            match_type: Some(MatchType::UltraRare),
            rarity_note: Some("private press, 200 copies".into()),
            purchase_links: None,
        };
        let batch = RecommendationBatch::new(vec![rec]).unwrap();
        let value = serde_json::to_value(&batch).unwrap();

        assert_eq!(value["recommendations"][0]["matchType"], "ultra-rare");
        assert_eq!(
            value["recommendations"][0]["rarityNote"],
            "private press, 200 copies"
        );
        assert!(value["recommendations"][0].get("purchaseLinks").is_none());
    }
}

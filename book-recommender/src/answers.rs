use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswersError {
    #[error("no questionnaire answers were provided")]
    Empty,

    #[error("answer to `{0}` must be a string")]
    NotText(String),
}

/// Answers to the reading-preference questionnaire, keyed by question id.
///
/// Always non-empty. Iteration is sorted by question id so that the same
/// answers always render the same prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionnaireAnswers {
    entries: BTreeMap<String, String>,
}

impl QuestionnaireAnswers {
    pub fn new(entries: BTreeMap<String, String>) -> Result<Self, AnswersError> {
        if entries.is_empty() {
            return Err(AnswersError::Empty);
        }
        Ok(Self { entries })
    }

    /// Build from question/answer pairs. Later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, AnswersError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(q, a)| (q.into(), a.into()))
                .collect(),
        )
    }

    /// Build from a decoded JSON object body. Every value must be a string.
    pub fn from_json_object(object: Map<String, Value>) -> Result<Self, AnswersError> {
        let entries = object
            .into_iter()
            .map(|(question, answer)| match answer {
                Value::String(text) => Ok((question, text)),
                _ => Err(AnswersError::NotText(question)),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Self::new(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_empty_answers() {
        assert_eq!(
            QuestionnaireAnswers::new(BTreeMap::new()),
            Err(AnswersError::Empty)
        );
        assert_eq!(
            QuestionnaireAnswers::from_json_object(Map::new()),
            Err(AnswersError::Empty)
        );
    }

    #[test]
    fn pairs_must_not_be_empty() {
        assert_eq!(
            QuestionnaireAnswers::from_pairs(Vec::<(String, String)>::new()),
            Err(AnswersError::Empty)
        );

        let answers = QuestionnaireAnswers::from_pairs([("mood", "calm"), ("mood", "tense")]).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.iter().next(), Some(("mood", "tense")));
    }

    #[test]
    fn rejects_non_text_answer() {
        let Value::Object(object) = json!({ "mood": "calm", "pages": 300 }) else {
            unreachable!()
        };
        assert_eq!(
            QuestionnaireAnswers::from_json_object(object),
            Err(AnswersError::NotText("pages".into()))
        );
    }

    #[test]
    fn iterates_in_question_order() {
        let Value::Object(object) = json!({ "q2": "mystery", "q1": "slow burn" }) else {
            unreachable!()
        };
        let answers = QuestionnaireAnswers::from_json_object(object).unwrap();
        let keys: Vec<_> = answers.iter().map(|(q, _)| q).collect();
        assert_eq!(keys, vec!["q1", "q2"]);
        assert_eq!(answers.len(), 2);
    }
}

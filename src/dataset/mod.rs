//! In-memory form of the article count dataset
//!
//! The dataset is made of two parts that are loaded together:
//!
//! - Long-format records, one per (language, subtopic) pair, giving the
//!   number of climate change articles of a Wikipedia edition that were
//!   classified into a subtopic.
//! - The keywords that were used to classify articles, per subtopic and
//!   language. These are only displayed, never computed upon.
//!
//! Once loaded, a dataset is never modified.

pub mod cache;
pub mod loader;

use crate::{ArticleCount, LanguageCode, Subtopic};
use serde::Deserialize;
use std::collections::HashMap;

/// Row of the tabular dataset
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq)]
pub struct Record {
    /// Wikipedia edition, e.g. "en"
    pub language_code: LanguageCode,

    /// Subtopic that the articles were classified into
    pub subtopic: Subtopic,

    /// Number of articles
    pub article_count: ArticleCount,
}
//
impl Record {
    /// Build a record by hand
    pub fn new(
        language_code: impl Into<LanguageCode>,
        subtopic: impl Into<Subtopic>,
        article_count: ArticleCount,
    ) -> Self {
        Self {
            language_code: language_code.into(),
            subtopic: subtopic.into(),
            article_count,
        }
    }
}

/// Keywords that articles were classified with, by subtopic then language
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct KeywordMapping(HashMap<Subtopic, HashMap<LanguageCode, Vec<Box<str>>>>);
//
impl KeywordMapping {
    /// Truth that some keywords are known for this subtopic
    pub fn has_subtopic(&self, subtopic: &str) -> bool {
        self.0.contains_key(subtopic)
    }

    /// Keywords used to classify articles of a language into a subtopic
    pub fn keywords(&self, subtopic: &str, language_code: &str) -> Option<&[Box<str>]> {
        self.0
            .get(subtopic)
            .and_then(|languages| languages.get(language_code))
            .map(Vec::as_slice)
    }
}
//
impl FromIterator<(Subtopic, LanguageCode, Vec<Box<str>>)> for KeywordMapping {
    fn from_iter<I: IntoIterator<Item = (Subtopic, LanguageCode, Vec<Box<str>>)>>(iter: I) -> Self {
        let mut mapping = HashMap::<_, HashMap<_, _>>::new();
        for (subtopic, language_code, keywords) in iter {
            mapping
                .entry(subtopic)
                .or_default()
                .insert(language_code, keywords);
        }
        Self(mapping)
    }
}

/// Everything that the dashboard loads from disk
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dataset {
    /// Records, in file order
    records: Box<[Record]>,

    /// Keyword definitions
    mapping: KeywordMapping,

    /// Distinct language codes, in order of first appearance
    language_codes: Box<[LanguageCode]>,

    /// Distinct subtopics, in order of first appearance
    subtopics: Box<[Subtopic]>,
}
//
impl Dataset {
    /// Assemble a dataset from its parts
    pub fn new(records: Vec<Record>, mapping: KeywordMapping) -> Self {
        let mut language_codes = Vec::<LanguageCode>::new();
        let mut subtopics = Vec::<Subtopic>::new();
        for record in &records {
            if !language_codes.contains(&record.language_code) {
                language_codes.push(record.language_code.clone());
            }
            if !subtopics.contains(&record.subtopic) {
                subtopics.push(record.subtopic.clone());
            }
        }
        Self {
            records: records.into(),
            mapping,
            language_codes: language_codes.into(),
            subtopics: subtopics.into(),
        }
    }

    /// Records, in file order
    pub fn records(&self) -> &[Record] {
        &self.records[..]
    }

    /// Keyword definitions
    pub fn mapping(&self) -> &KeywordMapping {
        &self.mapping
    }

    /// Distinct language codes, in order of first appearance
    pub fn language_codes(&self) -> &[LanguageCode] {
        &self.language_codes[..]
    }

    /// Distinct subtopics, in order of first appearance
    pub fn subtopics(&self) -> &[Subtopic] {
        &self.subtopics[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let dataset = Dataset::new(
            vec![
                Record::new("de", "Science", 4),
                Record::new("en", "Policy", 2),
                Record::new("de", "Policy", 1),
                Record::new("en", "Science", 0),
            ],
            KeywordMapping::default(),
        );
        assert_eq!(dataset.records().len(), 4);
        assert_eq!(dataset.language_codes(), [LanguageCode::from("de"), "en".into()]);
        assert_eq!(dataset.subtopics(), [Subtopic::from("Science"), "Policy".into()]);
    }

    #[test]
    fn keyword_lookup() {
        let entry = |subtopic: &str, code: &str, keywords: &[&str]| -> (Subtopic, LanguageCode, Vec<Box<str>>) {
            (subtopic.into(), code.into(), keywords.iter().map(|&k| k.into()).collect())
        };
        let mapping = [
            entry("Policy", "en", &["policy", "law"]),
            entry("Policy", "fr", &["politique"]),
        ]
        .into_iter()
        .collect::<KeywordMapping>();
        assert!(mapping.has_subtopic("Policy"));
        assert!(!mapping.has_subtopic("Science"));
        assert_eq!(
            mapping.keywords("Policy", "en"),
            Some(&[Box::<str>::from("policy"), "law".into()][..])
        );
        assert_eq!(mapping.keywords("Policy", "de"), None);
    }
}

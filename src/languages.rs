//! Wikipedia language editions known to the dashboard

use crate::{selection::Choice, LanguageCode};
use dialoguer::FuzzySelect;

/// Label of the language selector entry that selects every language
pub const ALL_LANGUAGES: &str = "All Languages";

/// What we know about a Wikipedia language edition
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LanguageInfo {
    /// Short code, as in the dataset and in Wikipedia subdomains
    pub code: &'static str,

    /// Human-readable name
    pub name: &'static str,
}

/// Language catalog, in canonical display order
///
/// This is the order of the top 10 Wikipedia editions that the dataset was
/// built from, and the default order of the chart axis.
pub fn catalog() -> &'static [LanguageInfo] {
    const CATALOG: &[LanguageInfo] = &[
        LanguageInfo { code: "en", name: "English" },
        LanguageInfo { code: "ar", name: "Arabic" },
        LanguageInfo { code: "fr", name: "French" },
        LanguageInfo { code: "es", name: "Spanish" },
        LanguageInfo { code: "de", name: "German" },
        LanguageInfo { code: "pt", name: "Portuguese" },
        LanguageInfo { code: "zh", name: "Chinese" },
        LanguageInfo { code: "ru", name: "Russian" },
        LanguageInfo { code: "uk", name: "Ukrainian" },
        LanguageInfo { code: "it", name: "Italian" },
    ];
    CATALOG
}

/// Get information about a language edition, if it's in the catalog
pub fn get(code: &str) -> Option<LanguageInfo> {
    catalog().iter().copied().find(|lang| lang.code == code)
}

/// Position of a language in the canonical order, if any
pub fn canonical_rank(code: &str) -> Option<usize> {
    catalog().iter().position(|lang| lang.code == code)
}

/// Human-readable name of a language, falling back to the raw code for
/// languages that are not in the catalog
pub fn display_name(code: &str) -> &str {
    get(code).map_or(code, |lang| lang.name)
}

/// Selector label of a language, e.g. "English (en)"
pub fn label(code: &str) -> String {
    format!("{} ({code})", display_name(code))
}

/// Extract the language code from a selector label
///
/// The code is whatever sits between the first opening parenthesis and the
/// next closing one. Returns `None` if there is no such pair.
pub fn code_from_label(label: &str) -> Option<&str> {
    let (_name, rest) = label.split_once('(')?;
    let (code, _rest) = rest.split_once(')')?;
    Some(code.trim())
}

/// Ask the user to select a language among those present in the dataset
pub fn prompt(available: &[LanguageCode]) -> dialoguer::Result<Choice<LanguageCode>> {
    let options = std::iter::once(ALL_LANGUAGES.to_owned())
        .chain(available.iter().map(|code| label(code)))
        .collect::<Vec<_>>();
    let idx = FuzzySelect::new()
        .with_prompt("Select Language to Display")
        .items(&options)
        .default(0)
        .max_length(usize::MAX)
        .interact()?;
    Ok(match idx {
        0 => Choice::All,
        idx => Choice::one(available[idx - 1].clone()),
    })
}

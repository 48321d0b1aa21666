//! User selections and their resolution against the loaded dataset

use crate::{
    dataset::Dataset, error::DashboardError, languages, subtopics, LanguageCode, Subtopic,
};
use dialoguer::Select;
use std::{fmt, str::FromStr};
use unicase::UniCase;

/// Selection of either every item present in the dataset, or a subset of them
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Choice<T> {
    /// Every item observed in the dataset, in first-seen order
    All,

    /// Explicit items, possibly none at all
    Subset(Vec<T>),
}
//
impl<T> Choice<T> {
    /// Select a single item
    pub fn one(item: T) -> Self {
        Self::Subset(vec![item])
    }
}
//
impl<T> Default for Choice<T> {
    fn default() -> Self {
        Self::All
    }
}
//
impl<T: Clone + PartialEq> Choice<T> {
    /// Turn this choice into a concrete list of items
    ///
    /// `All` expands to whatever is available in the dataset. Explicit items
    /// go through `normalize`, then duplicates are dropped.
    pub fn resolve(&self, available: &[T], mut normalize: impl FnMut(&T) -> T) -> Vec<T> {
        match self {
            Self::All => available.to_vec(),
            Self::Subset(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items.iter().map(&mut normalize) {
                    if !resolved.contains(&item) {
                        resolved.push(item);
                    }
                }
                resolved
            }
        }
    }
}

/// Truth that a raw selector value means "everything"
fn is_all(raw: &str, all_label: &str) -> bool {
    let raw = UniCase::new(raw.trim());
    raw == UniCase::new(all_label) || raw == UniCase::new("all")
}

/// Split a raw selector value into its comma-separated items
fn items(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Parse a raw language selector value
///
/// Items can be bare codes ("en") or selector labels ("English (en)").
pub fn parse_languages(raw: &str) -> Result<Choice<LanguageCode>, DashboardError> {
    if is_all(raw, languages::ALL_LANGUAGES) {
        return Ok(Choice::All);
    }
    let codes = items(raw)
        .map(|item| {
            if item.contains('(') || item.contains(')') {
                languages::code_from_label(item)
                    .map(LanguageCode::from)
                    .ok_or_else(|| DashboardError::InvalidOption {
                        selector: "language",
                        value: item.to_owned(),
                        expected: format!("\"{}\", a code or \"Name (code)\"", languages::ALL_LANGUAGES),
                    })
            } else {
                Ok(item.into())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Choice::Subset(codes))
}

/// Parse a raw subtopic selector value
///
/// The spelling of subtopics is only fixed later on, when resolving the
/// selection against the dataset.
pub fn parse_subtopics(raw: &str) -> Choice<Subtopic> {
    if is_all(raw, subtopics::ALL_SUBTOPICS) {
        return Choice::All;
    }
    Choice::Subset(items(raw).map(Subtopic::from).collect())
}

/// Order in which languages are laid out on the chart axis
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum SortMode {
    /// Canonical top-10 order
    #[default]
    Default,

    /// By decreasing total article count
    TotalDescending,

    /// By increasing total article count
    TotalAscending,
}

/// Layout of the chart's bars
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum ChartMode {
    /// One bar per language, subtopics stacked on top of each other
    #[default]
    Stacked,

    /// One bar per (language, subtopic) pair, grouped by language
    Grouped,

    /// Like `Stacked`, but with each bar normalized to 100%
    PercentStacked,
}

/// Selector options, with their UI label and accepted short names
trait SelectorOption: Copy + Eq + 'static {
    /// Name of the selector, for error messages
    const SELECTOR: &'static str;

    /// Every option in UI order, with its label and short name
    const OPTIONS: &'static [(Self, &'static str, &'static str)];

    fn label(self) -> &'static str {
        Self::OPTIONS
            .iter()
            .find(|(option, _label, _short)| *option == self)
            .map(|(_option, label, _short)| *label)
            .expect("every option should be listed")
    }

    fn parse(raw: &str) -> Result<Self, DashboardError> {
        let wanted = UniCase::new(raw.trim());
        Self::OPTIONS
            .iter()
            .find(|(_option, label, short)| {
                wanted == UniCase::new(*label) || wanted == UniCase::new(*short)
            })
            .map(|(option, _label, _short)| *option)
            .ok_or_else(|| DashboardError::InvalidOption {
                selector: Self::SELECTOR,
                value: raw.to_owned(),
                expected: Self::OPTIONS
                    .iter()
                    .map(|(_option, label, _short)| format!("{label:?}"))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    fn prompt(prompt: &str, current: Self) -> dialoguer::Result<Self> {
        let labels = Self::OPTIONS
            .iter()
            .map(|(_option, label, _short)| *label)
            .collect::<Vec<_>>();
        let default = Self::OPTIONS
            .iter()
            .position(|(option, _label, _short)| *option == current)
            .unwrap_or(0);
        let idx = Select::new()
            .with_prompt(prompt)
            .items(&labels)
            .default(default)
            .interact()?;
        Ok(Self::OPTIONS[idx].0)
    }
}
//
impl SelectorOption for SortMode {
    const SELECTOR: &'static str = "sort";
    const OPTIONS: &'static [(Self, &'static str, &'static str)] = &[
        (Self::Default, "Default Order", "default"),
        (Self::TotalDescending, "Total Articles (Descending)", "desc"),
        (Self::TotalAscending, "Total Articles (Ascending)", "asc"),
    ];
}
//
impl SelectorOption for ChartMode {
    const SELECTOR: &'static str = "chart";
    const OPTIONS: &'static [(Self, &'static str, &'static str)] = &[
        (Self::Stacked, "Stacked Bar", "stacked"),
        (Self::Grouped, "Grouped Bar", "grouped"),
        (Self::PercentStacked, "Percentage Stacked", "percent"),
    ];
}

macro_rules! impl_selector_traits {
    ($($mode:ty),*) => {$(
        impl FromStr for $mode {
            type Err = DashboardError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$mode as SelectorOption>::parse(s)
            }
        }
        //
        impl fmt::Display for $mode {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    )*};
}
impl_selector_traits!(SortMode, ChartMode);

/// What the user asked for, before confrontation with the dataset
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectionRequest {
    pub languages: Choice<LanguageCode>,
    pub subtopics: Choice<Subtopic>,
    pub sort_mode: SortMode,
    pub chart_mode: ChartMode,
}
//
impl SelectionRequest {
    /// Parse raw selector values, as they come from the command line
    pub fn parse(
        languages: &str,
        subtopics: &str,
        sort_mode: &str,
        chart_mode: &str,
    ) -> Result<Self, DashboardError> {
        Ok(Self {
            languages: parse_languages(languages)?,
            subtopics: parse_subtopics(subtopics),
            sort_mode: sort_mode.parse()?,
            chart_mode: chart_mode.parse()?,
        })
    }

    /// Ask the user for a new selection, starting from this one
    pub fn prompt(&self, dataset: &Dataset) -> dialoguer::Result<Self> {
        Ok(Self {
            languages: languages::prompt(dataset.language_codes())?,
            subtopics: subtopics::prompt(dataset.subtopics())?,
            chart_mode: ChartMode::prompt("Chart Type", self.chart_mode)?,
            sort_mode: SortMode::prompt("Sort Languages By", self.sort_mode)?,
        })
    }

    /// Resolve this request against the dataset
    pub fn resolve(&self, dataset: &Dataset) -> FilterSelection {
        let available_subtopics = dataset.subtopics();
        let selection = FilterSelection {
            languages: self
                .languages
                .resolve(dataset.language_codes(), |code| code.trim().into()),
            subtopics: self
                .subtopics
                .resolve(available_subtopics, |name| subtopics::resolve(name, available_subtopics)),
            sort_mode: self.sort_mode,
            chart_mode: self.chart_mode,
        };
        log::debug!("Resolved {self:?} into {selection:?}");
        selection
    }
}

/// Concrete filtering and layout parameters for one render cycle
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterSelection {
    /// Selected language codes, without duplicates
    pub languages: Vec<LanguageCode>,

    /// Selected subtopics, without duplicates
    pub subtopics: Vec<Subtopic>,

    pub sort_mode: SortMode,
    pub chart_mode: ChartMode,
}

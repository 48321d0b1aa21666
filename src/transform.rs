//! Filter → order → pivot → aggregate pipeline
//!
//! This is where long-format records become the shapes that the chart and the
//! summary tables need. Every function here is pure: the same records and
//! selection always give the same output, and nothing is cached.

use crate::{
    dataset::Record,
    error::DashboardError,
    languages,
    selection::{ChartMode, FilterSelection, SortMode},
    ArticleCount, LanguageCode, Subtopic,
};
use std::{
    cmp::Reverse,
    collections::{hash_map, HashMap, HashSet},
};

/// Result of running the pipeline on a selection
#[derive(Clone, Debug, PartialEq)]
pub enum Transformed {
    /// The user deselected every language or every subtopic
    ///
    /// This is a normal state, which should be reported as a notice rather
    /// than as an error.
    Empty(EmptySelection),

    /// There is something to display
    Ready(View),
}

/// Which part of the selection is empty
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum EmptySelection {
    NoLanguages,
    NoSubtopics,
}

/// Everything the presentation layer needs to know about a selection
#[derive(Clone, Debug, PartialEq)]
pub struct View {
    /// Records that pass the filter, in axis order then column order
    pub records: Vec<Record>,

    /// Article counts in wide format
    pub frame: WideFrame,

    /// Share of each subtopic within each language, for percentage charts
    pub percentages: Option<PercentFrame>,

    /// Sum of the article counts of all filtered records
    pub total_articles: ArticleCount,
}
//
impl View {
    /// Ordered languages of the chart axis and table rows
    pub fn axis(&self) -> &[LanguageCode] {
        self.frame.languages()
    }
}

/// Run the whole pipeline
pub fn transform(
    records: &[Record],
    selection: &FilterSelection,
) -> Result<Transformed, DashboardError> {
    // Nothing to do if the user deselected everything
    if selection.languages.is_empty() {
        return Ok(Transformed::Empty(EmptySelection::NoLanguages));
    }
    if selection.subtopics.is_empty() {
        return Ok(Transformed::Empty(EmptySelection::NoSubtopics));
    }

    // Filter, then lay out the languages that are left
    let filtered = filter(records, selection);
    let totals = language_totals(&filtered);
    let present = selection
        .languages
        .iter()
        .filter(|code| totals.contains_key(&***code))
        .cloned()
        .collect::<Vec<_>>();
    let axis = order_languages(&present, selection.sort_mode, &totals);
    log::debug!("Laid out languages as {axis:?} for {:?}", selection.sort_mode);

    // Reshape into wide format
    let frame = pivot(&filtered, &axis)?;
    let percentages = (selection.chart_mode == ChartMode::PercentStacked)
        .then(|| PercentFrame::new(&frame));
    let records = frame.sort_records(filtered);
    let total_articles = records.iter().map(|record| record.article_count).sum::<ArticleCount>();
    log::debug!(
        "Selection kept {} records ({total_articles} articles) over {} languages and {} subtopics",
        records.len(),
        frame.languages().len(),
        frame.subtopics().len(),
    );
    Ok(Transformed::Ready(View {
        records,
        frame,
        percentages,
        total_articles,
    }))
}

/// Keep the records whose language and subtopic are both selected
pub fn filter<'records>(
    records: &'records [Record],
    selection: &FilterSelection,
) -> Vec<&'records Record> {
    let languages = selection.languages.iter().map(|code| &**code).collect::<HashSet<_>>();
    let subtopics = selection.subtopics.iter().map(|name| &**name).collect::<HashSet<_>>();
    records
        .iter()
        .filter(|record| {
            languages.contains(&*record.language_code) && subtopics.contains(&*record.subtopic)
        })
        .collect()
}

/// Total article count of each language
pub fn language_totals<'records>(records: &[&'records Record]) -> HashMap<&'records str, ArticleCount> {
    let mut totals = HashMap::new();
    for record in records {
        *totals.entry(&*record.language_code).or_insert(0) += record.article_count;
    }
    totals
}

/// Order languages for display
///
/// The default order is the canonical catalog order, with languages that are
/// not in the catalog coming last in input order. Sorting by total article
/// count is stable with respect to this default order, so ties keep their
/// catalog order. Languages without a total count as zero.
pub fn order_languages(
    languages: &[LanguageCode],
    sort_mode: SortMode,
    totals: &HashMap<&str, ArticleCount>,
) -> Vec<LanguageCode> {
    let mut ordered = languages.to_vec();
    ordered.sort_by_key(|code| languages::canonical_rank(code).unwrap_or(usize::MAX));
    let total = |code: &LanguageCode| totals.get(&**code).copied().unwrap_or(0);
    match sort_mode {
        SortMode::Default => {}
        SortMode::TotalDescending => ordered.sort_by_key(|code| Reverse(total(code))),
        SortMode::TotalAscending => ordered.sort_by_key(total),
    }
    ordered
}

/// Article counts in wide format: one row per language, one column per
/// subtopic
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WideFrame {
    /// Row labels
    languages: Vec<LanguageCode>,

    /// Column labels
    subtopics: Vec<Subtopic>,

    /// Article counts, in row-major order
    counts: Box<[ArticleCount]>,
}
//
impl WideFrame {
    /// Row labels, i.e. the ordered language axis
    pub fn languages(&self) -> &[LanguageCode] {
        &self.languages
    }

    /// Column labels, in alphabetical order
    pub fn subtopics(&self) -> &[Subtopic] {
        &self.subtopics
    }

    /// Article counts of one row
    pub fn row(&self, row: usize) -> &[ArticleCount] {
        let width = self.subtopics.len();
        &self.counts[row * width..(row + 1) * width]
    }

    /// Iterate over rows along with their language
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[ArticleCount])> + '_ {
        (self.languages.iter()).enumerate().map(|(idx, code)| (&**code, self.row(idx)))
    }

    /// Article count of a (language, subtopic) pair, zero if the pair is not
    /// part of the frame
    #[cfg(test)]
    pub fn get(&self, language_code: &str, subtopic: &str) -> ArticleCount {
        let row = self.languages.iter().position(|code| &**code == language_code);
        let col = self.subtopics.iter().position(|name| &**name == subtopic);
        match (row, col) {
            (Some(row), Some(col)) => self.row(row)[col],
            _ => 0,
        }
    }

    /// Row-wise sums, i.e. the "Total" column
    pub fn row_totals(&self) -> Vec<ArticleCount> {
        (0..self.languages.len()).map(|row| self.row(row).iter().sum()).collect()
    }

    /// Sort records by row, then by column
    fn sort_records(&self, records: Vec<&Record>) -> Vec<Record> {
        let rank = |record: &Record| {
            let row = self.languages.iter().position(|code| *code == record.language_code);
            let col = self.subtopics.iter().position(|name| *name == record.subtopic);
            (row, col)
        };
        let mut records = records.into_iter().cloned().collect::<Vec<_>>();
        records.sort_by_key(rank);
        records
    }
}

/// Reshape records into wide format
///
/// Rows follow `axis`, and records of languages outside of it are ignored.
/// Columns are the subtopics of the remaining records, in alphabetical order.
/// Each (language, subtopic) pair may only appear once.
pub fn pivot(records: &[&Record], axis: &[LanguageCode]) -> Result<WideFrame, DashboardError> {
    let rows = (axis.iter().enumerate())
        .map(|(idx, code)| (&**code, idx))
        .collect::<HashMap<_, _>>();

    // Collect cells, rejecting duplicates
    let mut cells = HashMap::<(usize, &str), ArticleCount>::new();
    let mut seen_subtopics = Vec::<&str>::new();
    for record in records {
        let Some(&row) = rows.get(&*record.language_code) else {
            continue;
        };
        match cells.entry((row, &*record.subtopic)) {
            hash_map::Entry::Occupied(_) => {
                return Err(DashboardError::DuplicateKey {
                    language_code: record.language_code.clone(),
                    subtopic: record.subtopic.clone(),
                })
            }
            hash_map::Entry::Vacant(v) => {
                v.insert(record.article_count);
            }
        }
        if !seen_subtopics.contains(&&*record.subtopic) {
            seen_subtopics.push(&record.subtopic);
        }
    }

    // Lay cells out, filling holes with zeros
    let mut subtopics = seen_subtopics;
    subtopics.sort_unstable();
    let counts = (0..axis.len())
        .flat_map(|row| {
            let cells = &cells;
            subtopics
                .iter()
                .map(move |subtopic| cells.get(&(row, *subtopic)).copied().unwrap_or(0))
        })
        .collect();
    Ok(WideFrame {
        languages: axis.to_vec(),
        subtopics: subtopics.into_iter().map(Subtopic::from).collect(),
        counts,
    })
}

/// Share of each subtopic within each language of a [`WideFrame`], in
/// percent, rounded to one decimal
#[derive(Clone, Debug, PartialEq)]
pub struct PercentFrame {
    /// Number of columns
    width: usize,

    /// Percentages, in row-major order
    shares: Box<[f64]>,
}
//
impl PercentFrame {
    /// Compute percentages from article counts
    ///
    /// Languages with no articles at all get 0% everywhere.
    pub fn new(frame: &WideFrame) -> Self {
        let shares = (0..frame.languages().len())
            .flat_map(|row| {
                let counts = frame.row(row);
                let total = counts.iter().sum::<ArticleCount>();
                counts.iter().map(move |&count| percentage(count, total))
            })
            .collect();
        Self {
            width: frame.subtopics().len(),
            shares,
        }
    }

    /// Percentages of one row
    pub fn row(&self, row: usize) -> &[f64] {
        &self.shares[row * self.width..(row + 1) * self.width]
    }
}

/// Share of `count` in `total`, in percent, rounded to one decimal
///
/// Ties are rounded to even, so 1.25% becomes 1.2% and 0.25% becomes 0.2%.
pub fn percentage(count: ArticleCount, total: ArticleCount) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = count as f64 / total as f64 * 100.0;
    (percent * 10.0).round_ties_even() / 10.0
}

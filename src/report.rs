//! Text rendering of the dashboard page

use crate::{
    chart::ChartSpec,
    dataset::KeywordMapping,
    languages,
    selection::FilterSelection,
    transform::{EmptySelection, Transformed, View},
    ArticleCount,
};
use comfy_table::{presets::UTF8_FULL_CONDENSED, CellAlignment, Table};
use std::fmt::{self, Write};

/// Collapsible page sections that the user asked to expand
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Sections {
    /// Articles by language and subtopic, with totals
    pub details: bool,

    /// Keywords used to classify articles into subtopics
    pub keywords: bool,

    /// Filtered records
    pub raw: bool,
}

/// Page header, shown once at startup
pub fn header() -> String {
    "\
Climate Change Subtopic Emphasis by Language
Analyzing Wikipedia's Coverage of Climate Change Across Languages

Research Question: How do different language editions of Wikipedia emphasize
various climate change subtopics (Policy, Adaptation, Environment, Science,
Sustainability)?

Data Source: This analysis examines climate change-related articles across the
top 10 language editions of Wikipedia. Articles were categorized into subtopics
based on keyword matching of titles and content.
"
    .to_owned()
}

/// Summary figures of a selection
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Metrics {
    /// Articles across all filtered records
    pub total_articles: ArticleCount,

    /// Number of selected languages
    pub languages: usize,

    /// Number of selected subtopics
    pub subtopics: usize,
}
//
impl Metrics {
    /// Compute summary figures
    pub fn new(selection: &FilterSelection, transformed: &Transformed) -> Self {
        Self {
            total_articles: match transformed {
                Transformed::Ready(view) => view.total_articles,
                Transformed::Empty(_) => 0,
            },
            languages: selection.languages.len(),
            subtopics: selection.subtopics.len(),
        }
    }
}

/// Notice shown in place of the chart when the selection is empty
pub fn empty_notice(empty: EmptySelection) -> &'static str {
    match empty {
        EmptySelection::NoLanguages => "Please select at least one language to display.",
        EmptySelection::NoSubtopics => "Please select at least one subtopic to display.",
    }
}

/// Format an integer with thousands separators, e.g. "12,345"
pub fn thousands(value: ArticleCount) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// Articles by language and subtopic, with a total per language
pub fn breakdown_table(view: &View) -> Table {
    let frame = &view.frame;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        std::iter::once("Language")
            .chain(frame.subtopics().iter().map(|name| &**name))
            .chain(std::iter::once("Total")),
    );
    for ((code, counts), total) in frame.rows().zip(frame.row_totals()) {
        table.add_row(
            std::iter::once(languages::label(code))
                .chain(counts.iter().map(ToString::to_string))
                .chain(std::iter::once(total.to_string())),
        );
    }
    for column in table.column_iter_mut().skip(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

/// Keywords of each selected subtopic, for each selected language
///
/// Subtopics and languages without keywords are left out.
pub fn keyword_listing<'a>(
    mapping: &'a KeywordMapping,
    selection: &'a FilterSelection,
) -> Vec<(&'a str, Vec<(&'a str, String)>)> {
    (selection.subtopics.iter())
        .filter(|subtopic| mapping.has_subtopic(subtopic))
        .map(|subtopic| {
            let keywords = (selection.languages.iter())
                .filter_map(|code| {
                    let keywords = mapping.keywords(subtopic, code)?;
                    Some((languages::display_name(code), keywords.join(", ")))
                })
                .collect();
            (&**subtopic, keywords)
        })
        .collect()
}

/// Filtered records, one per line
pub fn raw_table(view: &View) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(["language_name", "language_code", "subtopic", "article_count"]);
    for record in &view.records {
        table.add_row([
            languages::display_name(&record.language_code).to_owned(),
            record.language_code.to_string(),
            record.subtopic.to_string(),
            record.article_count.to_string(),
        ]);
    }
    if let Some(column) = table.column_mut(3) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

/// Render one dashboard page for the current selection
pub fn render(
    mapping: &KeywordMapping,
    selection: &FilterSelection,
    transformed: &Transformed,
    sections: Sections,
    chart_width: usize,
) -> String {
    const RULE: &str = "────────────────────────────────────────";
    let mut out = String::new();

    push_line(&mut out, RULE);
    push_line(
        &mut out,
        format_args!(
            "Languages: {} | Subtopics: {} | Chart: {} | Sort: {}",
            list_or_none(selection.languages.iter().map(|code| languages::label(code))),
            list_or_none(selection.subtopics.iter().map(ToString::to_string)),
            selection.chart_mode,
            selection.sort_mode,
        ),
    );
    push_line(&mut out, RULE);
    match transformed {
        Transformed::Ready(view) => {
            let spec = ChartSpec::new(view, selection.chart_mode);
            out.push_str(&spec.render_text(chart_width));
        }
        Transformed::Empty(empty) => {
            push_line(&mut out, format_args!("Warning: {}", empty_notice(*empty)));
        }
    }

    let metrics = Metrics::new(selection, transformed);
    push_line(&mut out, RULE);
    push_line(
        &mut out,
        format_args!("Total Articles:      {}", thousands(metrics.total_articles)),
    );
    push_line(&mut out, format_args!("Languages Analyzed:  {}", metrics.languages));
    push_line(&mut out, format_args!("Subtopics Analyzed:  {}", metrics.subtopics));

    if sections.details {
        push_line(&mut out, "\nArticles by Language and Subtopic");
        if let Transformed::Ready(view) = transformed {
            push_line(&mut out, breakdown_table(view));
        }
    }
    if sections.keywords {
        push_line(&mut out, "\nSubtopic Classification Keywords");
        push_line(
            &mut out,
            "Articles were categorized into subtopics based on the presence of these keywords in their titles:",
        );
        for (subtopic, keywords) in keyword_listing(mapping, selection) {
            push_line(&mut out, format_args!("\n{subtopic}:"));
            for (language, keywords) in keywords {
                push_line(&mut out, format_args!("  {language}: {keywords}"));
            }
        }
    }
    if sections.raw {
        push_line(&mut out, "\nRaw Data");
        if let Transformed::Ready(view) = transformed {
            push_line(&mut out, raw_table(view));
        }
    }
    out
}

/// Append a line of text
pub fn push_line(out: &mut String, line: impl fmt::Display) {
    writeln!(out, "{line}").expect("writing to a String cannot fail");
}

/// Comma-separated list, or "none" if empty
fn list_or_none(items: impl Iterator<Item = String>) -> String {
    let items = items.collect::<Vec<_>>();
    if items.is_empty() {
        "none".to_owned()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::{Dataset, Record},
        selection::{ChartMode, SortMode},
        transform::transform,
        LanguageCode, Subtopic,
    };

    fn dataset() -> Dataset {
        let mapping = serde_json::from_str::<KeywordMapping>(
            r#"{
                "Policy": { "en": ["policy", "law"], "de": ["Politik"] },
                "Science": { "en": ["science"] }
            }"#,
        )
        .unwrap();
        Dataset::new(
            vec![
                Record::new("en", "Policy", 1200),
                Record::new("en", "Science", 34),
                Record::new("de", "Policy", 56),
                Record::new("zz", "Science", 7),
            ],
            mapping,
        )
    }

    fn selection(dataset: &Dataset) -> FilterSelection {
        FilterSelection {
            languages: dataset.language_codes().to_vec(),
            subtopics: dataset.subtopics().to_vec(),
            sort_mode: SortMode::TotalDescending,
            chart_mode: ChartMode::Stacked,
        }
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn metrics_count_the_selection() {
        let dataset = dataset();
        let mut selection = selection(&dataset);
        let transformed = transform(dataset.records(), &selection).unwrap();
        assert_eq!(
            Metrics::new(&selection, &transformed),
            Metrics { total_articles: 1297, languages: 3, subtopics: 2 }
        );

        selection.subtopics.clear();
        let transformed = transform(dataset.records(), &selection).unwrap();
        assert_eq!(
            Metrics::new(&selection, &transformed),
            Metrics { total_articles: 0, languages: 3, subtopics: 0 }
        );
    }

    #[test]
    fn breakdown_rows_follow_the_axis() {
        let dataset = dataset();
        let selection = selection(&dataset);
        let Transformed::Ready(view) = transform(dataset.records(), &selection).unwrap() else {
            panic!("selection should not be empty");
        };
        let table = breakdown_table(&view).to_string();
        let english = table.find("English (en)").unwrap();
        let german = table.find("German (de)").unwrap();
        let unknown = table.find("zz (zz)").unwrap();
        assert!(english < german && german < unknown);
        assert!(table.contains("1234"));
        assert!(table.contains("Total"));
    }

    #[test]
    fn keywords_are_listed_for_selected_items() {
        let dataset = dataset();
        let mut selection = selection(&dataset);
        selection.languages = vec![LanguageCode::from("en")];
        let listing = keyword_listing(dataset.mapping(), &selection);
        assert_eq!(
            listing,
            [
                ("Policy", vec![("English", "policy, law".to_owned())]),
                ("Science", vec![("English", "science".to_owned())]),
            ]
        );

        selection.subtopics = vec![Subtopic::from("Adaptation"), "Policy".into()];
        selection.languages = vec!["de".into(), "fr".into()];
        let listing = keyword_listing(dataset.mapping(), &selection);
        assert_eq!(listing, [("Policy", vec![("German", "Politik".to_owned())])]);
    }

    #[test]
    fn empty_selection_shows_a_notice() {
        let dataset = dataset();
        let mut selection = selection(&dataset);
        selection.languages.clear();
        let transformed = transform(dataset.records(), &selection).unwrap();
        let all = Sections { details: true, keywords: true, raw: true };
        let page = render(dataset.mapping(), &selection, &transformed, all, 20);
        assert!(page.contains("Warning: Please select at least one language to display."));
        assert!(page.contains("Total Articles:      0"));
        assert!(page.contains("Languages: none"));
    }

    #[test]
    fn full_page() {
        let dataset = dataset();
        let selection = selection(&dataset);
        let transformed = transform(dataset.records(), &selection).unwrap();
        let page = render(dataset.mapping(), &selection, &transformed, Sections::default(), 20);
        assert!(page.contains("Climate Change Articles by Language and Subtopic"));
        assert!(page.contains("Total Articles:      1,297"));
        assert!(!page.contains("Raw Data"));

        let all = Sections { details: true, keywords: true, raw: true };
        let page = render(dataset.mapping(), &selection, &transformed, all, 20);
        assert!(page.contains("Articles by Language and Subtopic"));
        assert!(page.contains("  German: Politik"));
        assert!(page.contains("Raw Data"));
        assert!(page.contains("article_count"));
    }
}

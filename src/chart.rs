//! Chart specification for the article distribution
//!
//! The dashboard does not draw charts itself. It describes them in a
//! serializable [`ChartSpec`] that an external charting library can render,
//! and it can also sketch them as text bars for terminal output.

use crate::{
    languages,
    report::push_line,
    selection::ChartMode,
    subtopics,
    transform::View,
    Subtopic,
};
use serde::Serialize;

/// Chart height, in the charting library's units
const HEIGHT: u32 = 500;

/// Fill glyph of each series in text renderings
const GLYPHS: &[char] = &['█', '▓', '▒', '░', '▚', '▞', '■', '▪'];

/// How bars of different series relate to each other
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    /// On top of each other
    Stack,

    /// Side by side
    Group,
}

/// Where bar labels go
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    Inside,
}

/// Bar chart of article counts by language, colored by subtopic
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub legend_title: &'static str,
    pub bar_mode: BarMode,
    pub height: u32,

    /// Language names of the x axis, in display order
    pub categories: Vec<String>,

    /// One series per subtopic, in legend order
    pub series: Vec<Series>,
}

/// Bars of one subtopic
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub name: Subtopic,
    pub color: &'static str,
    pub points: Vec<Point>,
}
//
impl Series {
    /// Bar of a language, if there is one
    fn point(&self, category: &str) -> Option<&Point> {
        self.points.iter().find(|point| point.x == category)
    }
}

/// Bar of one (language, subtopic) pair
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Point {
    /// Language name
    pub x: String,

    /// Article count or percentage
    pub y: f64,

    /// Text drawn on the bar, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_position: Option<LabelPosition>,
}

impl ChartSpec {
    /// Describe the chart of a transformed selection
    ///
    /// Only (language, subtopic) pairs that have a record get a bar. For
    /// percentage charts, `view` must have been computed with percentages.
    pub fn new(view: &View, chart_mode: ChartMode) -> Self {
        let (title, y_label, bar_mode) = match chart_mode {
            ChartMode::Stacked => (
                "Climate Change Articles by Language and Subtopic",
                "Number of Articles",
                BarMode::Stack,
            ),
            ChartMode::Grouped => (
                "Climate Change Articles by Language and Subtopic (Grouped)",
                "Number of Articles",
                BarMode::Group,
            ),
            ChartMode::PercentStacked => (
                "Climate Change Article Distribution (Percentage) by Language",
                "Percentage of Articles",
                BarMode::Stack,
            ),
        };
        let frame = &view.frame;
        let percentages = match chart_mode {
            ChartMode::PercentStacked => view.percentages.as_ref(),
            ChartMode::Stacked | ChartMode::Grouped => None,
        };
        debug_assert!(
            chart_mode != ChartMode::PercentStacked || percentages.is_some(),
            "percentage charts need percentages"
        );

        let series = subtopics::colors(frame.subtopics().iter().map(|name| &**name))
            .into_iter()
            .enumerate()
            .map(|(col, (subtopic, color))| {
                let points = (view.records.iter())
                    .filter(|record| &*record.subtopic == subtopic)
                    .filter_map(|record| {
                        let row = frame.languages().iter().position(|code| *code == record.language_code)?;
                        let x = languages::display_name(&record.language_code).to_owned();
                        Some(match percentages {
                            Some(percentages) => {
                                let share = percentages.row(row)[col];
                                Point {
                                    x,
                                    y: share,
                                    label: Some(format!("{share:.1}%")),
                                    label_position: Some(LabelPosition::Inside),
                                }
                            }
                            None => Point {
                                x,
                                y: record.article_count as f64,
                                label: None,
                                label_position: None,
                            },
                        })
                    })
                    .collect();
                Series {
                    name: subtopic.into(),
                    color,
                    points,
                }
            })
            .collect();

        Self {
            title,
            x_label: "Language",
            y_label,
            legend_title: "Subtopic",
            bar_mode,
            height: HEIGHT,
            categories: (frame.languages().iter())
                .map(|code| languages::display_name(code).to_owned())
                .collect(),
            series,
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Sketch the chart as text bars, `width` characters wide at most
    pub fn render_text(&self, width: usize) -> String {
        let mut out = String::new();
        push_line(&mut out, self.title);
        let name_width = self.categories.iter().map(|name| name.chars().count()).max().unwrap_or(0);
        let scale = |y: f64, max: f64| {
            if max > 0.0 {
                (y / max * width as f64).round() as usize
            } else {
                0
            }
        };

        match self.bar_mode {
            BarMode::Stack => {
                let is_percent = self.series.iter().flat_map(|s| &s.points).any(|p| p.label.is_some());
                let sums = (self.categories.iter())
                    .map(|category| {
                        (self.series.iter())
                            .filter_map(|series| series.point(category))
                            .map(|point| point.y)
                            .sum::<f64>()
                    })
                    .collect::<Vec<_>>();
                let max = if is_percent {
                    100.0
                } else {
                    sums.iter().copied().fold(0.0, f64::max)
                };
                for (category, sum) in self.categories.iter().zip(&sums) {
                    let mut bar = String::new();
                    let mut labels = Vec::new();
                    for (idx, series) in self.series.iter().enumerate() {
                        if let Some(point) = series.point(category) {
                            bar.extend(std::iter::repeat(glyph(idx)).take(scale(point.y, max)));
                            labels.extend(point.label.clone());
                        }
                    }
                    let annotation = if is_percent {
                        labels.join(" ")
                    } else {
                        format!("{sum:.0}")
                    };
                    push_line(
                        &mut out,
                        format_args!("{category:>name_width$} │{bar} {annotation}"),
                    );
                }
            }
            BarMode::Group => {
                let max = (self.series.iter())
                    .flat_map(|series| &series.points)
                    .map(|point| point.y)
                    .fold(0.0, f64::max);
                let series_width = self.series.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
                for category in &self.categories {
                    let mut first = true;
                    for (idx, series) in self.series.iter().enumerate() {
                        let Some(point) = series.point(category) else {
                            continue;
                        };
                        let shown = if first { category.as_str() } else { "" };
                        first = false;
                        let bar = std::iter::repeat(glyph(idx))
                            .take(scale(point.y, max))
                            .collect::<String>();
                        push_line(
                            &mut out,
                            format_args!(
                                "{shown:>name_width$} {:<series_width$} │{bar} {:.0}",
                                series.name, point.y
                            ),
                        );
                    }
                }
            }
        }

        let legend = (self.series.iter().enumerate())
            .map(|(idx, series)| format!(" {} {} ({})", glyph(idx), series.name, series.color))
            .collect::<String>();
        push_line(&mut out, format_args!("{}:{legend}", self.legend_title));
        out
    }
}

/// Fill glyph of a series
fn glyph(series_idx: usize) -> char {
    GLYPHS[series_idx % GLYPHS.len()]
}

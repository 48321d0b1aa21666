//! Climate change subtopics and their fixed chart colors

use crate::{selection::Choice, Subtopic};
use dialoguer::FuzzySelect;
use unicase::UniCase;

/// Label of the subtopic selector entry that selects every subtopic
pub const ALL_SUBTOPICS: &str = "All Subtopics";

/// Subtopics that articles were classified into, with their chart colors
const CANONICAL: &[(&str, &str)] = &[
    ("Policy", "#1f77b4"),
    ("Adaptation", "#ff7f0e"),
    ("Environment", "#2ca02c"),
    ("Science", "#d62728"),
    ("Sustainability", "#9467bd"),
];

/// Colors handed out to subtopics outside of the canonical set, in order of
/// first appearance, cycling if there are more of them than colors
const OVERFLOW_PALETTE: &[&str] = &["#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf"];

/// Assign a color to each subtopic of a chart
///
/// Canonical subtopics always get the same color, whatever else is on the
/// chart. Other subtopics get overflow colors by order of appearance.
pub fn colors<'a>(subtopics: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, &'static str)> {
    let mut overflow = OVERFLOW_PALETTE.iter().copied().cycle();
    subtopics
        .into_iter()
        .map(|subtopic| {
            let color = match CANONICAL.iter().find(|(name, _color)| *name == subtopic) {
                Some((_name, color)) => *color,
                None => overflow.next().expect("cycling a non-empty palette never ends"),
            };
            (subtopic, color)
        })
        .collect()
}

/// Find the spelling of a user-provided subtopic name in the dataset
///
/// Matching is case-insensitive. If nothing matches, the user input is kept
/// as-is, and will simply not match any record.
pub fn resolve(name: &str, available: &[Subtopic]) -> Subtopic {
    let wanted = UniCase::new(name.trim());
    available
        .iter()
        .find(|subtopic| UniCase::new(&**subtopic) == wanted)
        .cloned()
        .unwrap_or_else(|| name.trim().into())
}

/// Ask the user to select a subtopic among those present in the dataset
pub fn prompt(available: &[Subtopic]) -> dialoguer::Result<Choice<Subtopic>> {
    let options = std::iter::once(ALL_SUBTOPICS)
        .chain(available.iter().map(|subtopic| &**subtopic))
        .collect::<Vec<_>>();
    let idx = FuzzySelect::new()
        .with_prompt("Select Subtopic to Display")
        .items(&options)
        .default(0)
        .interact()?;
    Ok(match idx {
        0 => Choice::All,
        idx => Choice::one(available[idx - 1].clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_subtopics_keep_their_color() {
        let assigned = colors(["Science", "Policy"]);
        assert_eq!(assigned, [("Science", "#d62728"), ("Policy", "#1f77b4")]);
    }

    #[test]
    fn unknown_subtopics_get_overflow_colors_by_appearance() {
        let names = ["Energy", "Policy", "Health", "A", "B", "C", "D"];
        let assigned = colors(names);
        assert_eq!(assigned[0], ("Energy", "#8c564b"));
        assert_eq!(assigned[1], ("Policy", "#1f77b4"));
        assert_eq!(assigned[2], ("Health", "#e377c2"));
        // Sixth unknown subtopic wraps around the overflow palette
        assert_eq!(assigned[6], ("D", "#8c564b"));
    }

    #[test]
    fn resolution_is_case_insensitive() {
        let available: Vec<Subtopic> = vec!["Policy".into(), "Science".into()];
        assert_eq!(&*resolve("science", &available), "Science");
        assert_eq!(&*resolve(" POLICY ", &available), "Policy");
        assert_eq!(&*resolve("Energy", &available), "Energy");
    }
}

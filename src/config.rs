//! Dashboard configuration

use crate::{error::DashboardError, report::Sections, selection::SelectionRequest, Args};
use std::{num::NonZeroUsize, path::PathBuf};

/// Final process configuration
///
/// This is the result of validating and digesting [`Args`]. Please refer to
/// [`Args`] to know more about individual fields.
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Input files
    pub input: InputConfig,

    /// Selection of the first render cycle
    pub initial_selection: SelectionRequest,

    /// Page sections that are expanded
    pub sections: Sections,

    // Other fields have the same meaning as in Args
    pub interactive: bool,
    pub chart_json: Option<PathBuf>,
    pub width: NonZeroUsize,
}
//
impl Config {
    /// Determine process configuration from CLI arguments
    pub(crate) fn new(args: Args) -> Result<Self, DashboardError> {
        let Args {
            data,
            mapping,
            language,
            subtopic,
            chart,
            sort,
            interactive,
            details,
            keywords,
            raw,
            all_sections,
            chart_json,
            width,
        } = args;
        Ok(Self {
            input: InputConfig {
                data_path: data,
                mapping_path: mapping,
            },
            initial_selection: SelectionRequest::parse(&language, &subtopic, &sort, &chart)?,
            sections: Sections {
                details: details || all_sections,
                keywords: keywords || all_sections,
                raw: raw || all_sections,
            },
            interactive,
            chart_json,
            width,
        })
    }
}

/// Location of the dataset files
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct InputConfig {
    /// Tabular dataset (CSV, optionally gzipped)
    pub data_path: PathBuf,

    /// Keyword mapping (JSON)
    pub mapping_path: PathBuf,
}

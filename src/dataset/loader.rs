//! Loading of the dataset files from disk

use super::{Dataset, KeywordMapping, Record};
use crate::error::DashboardError;
use async_compression::tokio::bufread::GzipDecoder;
use csv_async::{AsyncReaderBuilder, Trim};
use futures::TryStreamExt;
use std::path::Path;
use tokio::{
    fs::File,
    io::{AsyncRead, BufReader},
};

/// Columns that the tabular file must provide, in any order
pub const REQUIRED_COLUMNS: [&str; 3] = ["language_code", "subtopic", "article_count"];

/// Load the tabular dataset and the keyword mapping
pub async fn load(data_path: &Path, mapping_path: &Path) -> Result<Dataset, DashboardError> {
    let records = load_records(data_path).await?;
    let mapping = load_mapping(mapping_path).await?;
    log::info!(
        "Loaded {} records from {} and keywords for {} subtopics from {}",
        records.len(),
        data_path.display(),
        mapping.0.len(),
        mapping_path.display(),
    );
    Ok(Dataset::new(records, mapping))
}

/// Load records from a CSV file, which may be gzipped
pub async fn load_records(path: &Path) -> Result<Vec<Record>, DashboardError> {
    // Open the file, decompressing it on the fly if needed
    log::debug!("Opening tabular dataset {}", path.display());
    let file = File::open(path)
        .await
        .map_err(|e| DashboardError::from_io(path, e))?;
    let bytes = BufReader::new(file);
    let csv_bytes: Box<dyn AsyncRead + Send + Unpin> =
        if path.extension().is_some_and(|ext| ext == "gz") {
            log::debug!("Decompressing {} as gzip", path.display());
            Box::new(GzipDecoder::new(bytes))
        } else {
            Box::new(bytes)
        };

    // Check that the header has every column we need before decoding rows,
    // so that users get told about all missing columns at once
    let mut reader = AsyncReaderBuilder::new()
        .trim(Trim::All)
        .create_deserializer(csv_bytes);
    let headers = reader
        .headers()
        .await
        .map_err(|e| DashboardError::format(path, e))?;
    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .copied()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(DashboardError::format(
            path,
            format!("missing required column(s) {}", missing.join(", ")),
        ));
    }

    // Decode rows
    let records = reader
        .into_deserialize::<Record>()
        .try_collect::<Vec<_>>()
        .await
        .map_err(|e| DashboardError::format(path, e))?;
    log::trace!("Decoded records {records:#?}");
    Ok(records)
}

/// Load the keyword mapping from a JSON file
pub async fn load_mapping(path: &Path) -> Result<KeywordMapping, DashboardError> {
    log::debug!("Opening keyword mapping {}", path.display());
    let json = tokio::fs::read(path)
        .await
        .map_err(|e| DashboardError::from_io(path, e))?;
    serde_json::from_slice(&json).map_err(|e| DashboardError::format(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_compression::tokio::write::GzipEncoder;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;

    const CSV: &str = "\
language_code,subtopic,article_count
en,Policy,120
en,Science,80
fr,Policy,40
";

    const JSON: &str = r#"{
        "Policy": { "en": ["policy", "law"], "fr": ["politique"] },
        "Science": { "en": ["science"] }
    }"#;

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn loads_records_and_mapping() {
        let dir = TempDir::new().unwrap();
        let data = write(&dir, "data.csv", CSV.as_bytes());
        let mapping = write(&dir, "mapping.json", JSON.as_bytes());

        let dataset = load(&data, &mapping).await.unwrap();
        assert_eq!(
            dataset.records(),
            [
                Record::new("en", "Policy", 120),
                Record::new("en", "Science", 80),
                Record::new("fr", "Policy", 40),
            ]
        );
        assert_eq!(
            dataset.mapping().keywords("Policy", "fr"),
            Some(&[Box::<str>::from("politique")][..])
        );
    }

    #[tokio::test]
    async fn columns_can_come_in_any_order_with_extras() {
        let dir = TempDir::new().unwrap();
        let data = write(
            &dir,
            "data.csv",
            b"article_count,notes,subtopic,language_code\n7, n/a ,Adaptation,de\n",
        );
        let records = load_records(&data).await.unwrap();
        assert_eq!(records, [Record::new("de", "Adaptation", 7)]);
    }

    #[tokio::test]
    async fn gzipped_tables_are_decompressed() {
        let mut encoder = GzipEncoder::new(Vec::new());
        encoder.write_all(CSV.as_bytes()).await.unwrap();
        encoder.shutdown().await.unwrap();
        let dir = TempDir::new().unwrap();
        let plain = write(&dir, "data.csv", CSV.as_bytes());
        let gzipped = write(&dir, "data.csv.gz", &encoder.into_inner());

        assert_eq!(
            load_records(&gzipped).await.unwrap(),
            load_records(&plain).await.unwrap()
        );
    }

    #[tokio::test]
    async fn missing_files_are_reported() {
        let dir = TempDir::new().unwrap();
        let data = write(&dir, "data.csv", CSV.as_bytes());
        let nowhere = dir.path().join("nowhere.json");

        let err = load(&data, &nowhere).await.unwrap_err();
        assert!(matches!(err, DashboardError::DataNotFound { path } if path == nowhere));
        let err = load(&nowhere, &data).await.unwrap_err();
        assert!(matches!(err, DashboardError::DataNotFound { .. }));
    }

    #[tokio::test]
    async fn missing_columns_are_format_errors() {
        let dir = TempDir::new().unwrap();
        let data = write(&dir, "data.csv", b"language_code,count\nen,3\n");
        let err = load_records(&data).await.unwrap_err();
        match err {
            DashboardError::DataFormat { reason, .. } => {
                assert!(reason.contains("subtopic"));
                assert!(reason.contains("article_count"));
            }
            other => panic!("expected a format error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_counts_are_format_errors() {
        let dir = TempDir::new().unwrap();
        let data = write(
            &dir,
            "data.csv",
            b"language_code,subtopic,article_count\nen,Policy,-3\n",
        );
        let err = load_records(&data).await.unwrap_err();
        assert!(matches!(err, DashboardError::DataFormat { .. }));
    }

    #[tokio::test]
    async fn malformed_mapping_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        let bad_mappings: [&[u8]; 2] = [b"{ not json", br#"{"Policy": ["flat", "list"]}"#];
        for bad in bad_mappings {
            let mapping = write(&dir, "mapping.json", bad);
            let err = load_mapping(&mapping).await.unwrap_err();
            assert!(matches!(err, DashboardError::DataFormat { .. }));
        }
    }
}

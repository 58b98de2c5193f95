use crate::domain::ports::Storage;
use crate::domain::table::Dataset;
use crate::utils::error::{EtlError, Result};
use std::io::Write;
use std::str::FromStr;
use zip::write::{FileOptions, ZipWriter};

pub const SUPPORTED_FORMATS: [&str; 3] = ["csv", "tsv", "json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            other => Err(EtlError::InvalidConfigValueError {
                field: "export.formats".to_string(),
                value: other.to_string(),
                reason: format!("Unsupported format. Valid formats: {}", SUPPORTED_FORMATS.join(", ")),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub formats: Vec<OutputFormat>,
    pub base_name: String,
    /// Pack every rendered file into this archive instead of writing them separately.
    pub zip_archive: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            formats: vec![OutputFormat::Csv],
            base_name: "shelter_dataset".to_string(),
            zip_archive: None,
        }
    }
}

pub fn render_delimited(dataset: &Dataset, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(dataset.positional_row(row).map(|value| value.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

pub fn render_json(dataset: &Dataset) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(dataset)?)
}

pub fn render(dataset: &Dataset, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => render_delimited(dataset, b','),
        OutputFormat::Tsv => render_delimited(dataset, b'\t'),
        OutputFormat::Json => render_json(dataset),
    }
}

fn pack_zip(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Writes a finished dataset through a [`Storage`] backend.
pub struct DatasetExporter<S: Storage> {
    storage: S,
    options: ExportOptions,
}

impl<S: Storage> DatasetExporter<S> {
    pub fn new(storage: S, options: ExportOptions) -> Self {
        Self { storage, options }
    }

    /// Returns the storage-relative paths written.
    pub async fn export(&self, dataset: &Dataset) -> Result<Vec<String>> {
        let mut files = Vec::with_capacity(self.options.formats.len());
        for format in &self.options.formats {
            let name = format!("{}.{}", self.options.base_name, format.extension());
            files.push((name, render(dataset, *format)?));
        }

        if let Some(archive) = &self.options.zip_archive {
            tracing::debug!("Packing {} files into {}", files.len(), archive);
            let data = pack_zip(&files)?;
            self.storage.write_file(archive, &data).await?;
            return Ok(vec![archive.clone()]);
        }

        let mut written = Vec::with_capacity(files.len());
        for (name, data) in files {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(&name, &data).await?;
            written.push(name);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ANIMAL_ID;
    use crate::domain::model::{FieldValue, Record};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get_file(path).await.ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![ANIMAL_ID.to_string(), "name".to_string(), "days_in_shelter".to_string()],
            vec![
                Record::new()
                    .with(ANIMAL_ID, FieldValue::text("A1"))
                    .with("name", FieldValue::text("Rex, Jr."))
                    .with("days_in_shelter", FieldValue::Integer(10)),
                Record::new()
                    .with(ANIMAL_ID, FieldValue::text("A2"))
                    .with("name", FieldValue::Unknown)
                    .with("days_in_shelter", FieldValue::Unknown),
            ],
        )
    }

    #[test]
    fn test_render_csv_quotes_and_sentinel() {
        let csv = String::from_utf8(render(&dataset(), OutputFormat::Csv).unwrap()).unwrap();
        assert_eq!(
            csv,
            "animal_id,name,days_in_shelter\nA1,\"Rex, Jr.\",10\nA2,unknown,unknown\n"
        );
    }

    #[test]
    fn test_render_tsv() {
        let tsv = String::from_utf8(render(&dataset(), OutputFormat::Tsv).unwrap()).unwrap();
        assert!(tsv.starts_with("animal_id\tname\tdays_in_shelter\n"));
        assert!(tsv.contains("A1\tRex, Jr.\t10\n"));
    }

    #[test]
    fn test_render_json_values() {
        let json: serde_json::Value =
            serde_json::from_slice(&render(&dataset(), OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[0]["days_in_shelter"], 10);
        assert_eq!(json[1]["days_in_shelter"], "unknown");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(" json ".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("parquet".parse::<OutputFormat>().is_err());
    }

    #[tokio::test]
    async fn test_export_writes_each_format() {
        let storage = MockStorage::default();
        let exporter = DatasetExporter::new(
            storage.clone(),
            ExportOptions {
                formats: vec![OutputFormat::Csv, OutputFormat::Json],
                ..ExportOptions::default()
            },
        );

        let written = exporter.export(&dataset()).await.unwrap();

        assert_eq!(written, vec!["shelter_dataset.csv", "shelter_dataset.json"]);
        assert!(storage.get_file("shelter_dataset.csv").await.is_some());
        assert!(storage.get_file("shelter_dataset.json").await.is_some());
    }

    #[tokio::test]
    async fn test_export_zip_archive() {
        let storage = MockStorage::default();
        let exporter = DatasetExporter::new(
            storage.clone(),
            ExportOptions {
                formats: vec![OutputFormat::Csv, OutputFormat::Tsv],
                base_name: "dashboard".to_string(),
                zip_archive: Some("dashboard.zip".to_string()),
            },
        );

        let written = exporter.export(&dataset()).await.unwrap();
        assert_eq!(written, vec!["dashboard.zip"]);

        let data = storage.get_file("dashboard.zip").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["dashboard.csv", "dashboard.tsv"]);
        assert!(storage.get_file("dashboard.csv").await.is_none());
    }
}

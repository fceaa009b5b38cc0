//! CSV dataset loader.
//!
//! Reads the resource into memory (file or HTTP), optionally gunzips it,
//! then parses every row into a [`Record`] according to a [`ColumnSchema`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Read as _;

use game_viz_dataset_models::{ColumnSchema, Dataset, Record};

use crate::LoadError;
use crate::parsing::{parse_measure, parse_position};
use crate::resource::DataResource;

/// Loads one dataset resource.
///
/// Each call to [`Self::load`] is a single attempt. Failures are returned to
/// the caller as-is; there is no retry.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    resource: DataResource,
    /// Whether the body is gzip-compressed.
    is_gzipped: bool,
    /// Field delimiter byte (defaults to `,`).
    delimiter: u8,
}

impl DatasetLoader {
    /// Creates a loader for `resource` with default settings
    /// (comma-delimited, not gzipped).
    #[must_use]
    pub const fn new(resource: DataResource) -> Self {
        Self {
            resource,
            is_gzipped: false,
            delimiter: b',',
        }
    }

    /// Marks the resource as gzip-compressed.
    #[must_use]
    pub const fn with_gzip(mut self, gzipped: bool) -> Self {
        self.is_gzipped = gzipped;
        self
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The resource this loader reads.
    #[must_use]
    pub const fn resource(&self) -> &DataResource {
        &self.resource
    }

    /// Fetches and parses the resource.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the resource cannot be read, decompressed,
    /// or parsed, or if a declared column is absent from the header row.
    pub async fn load(&self, schema: &ColumnSchema) -> Result<Dataset, LoadError> {
        let bytes = self.fetch_bytes().await?;
        log::debug!("Read {} bytes from {}", bytes.len(), self.resource);

        let csv_bytes = if self.is_gzipped {
            let mut decoder = flate2::read::GzDecoder::new(bytes.as_slice());
            let mut decompressed = Vec::new();
            decoder.read_to_end(&mut decompressed)?;
            log::debug!("Decompressed to {} bytes", decompressed.len());
            decompressed
        } else {
            bytes
        };

        parse_dataset(
            &csv_bytes,
            schema,
            self.delimiter,
            &self.resource.to_string(),
        )
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>, LoadError> {
        match &self.resource {
            DataResource::File(path) => Ok(tokio::fs::read(path).await?),
            DataResource::Url(url) => {
                let response = reqwest::get(url).await?.error_for_status()?;
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

/// Parses delimited text into a [`Dataset`].
///
/// Numeric cells that fail to parse are stored as missing and counted per
/// column in [`Dataset::malformed`]. Cells that are not valid UTF-8 are
/// decoded lossily and the row is counted in [`Dataset::malformed_rows`].
/// Rows shorter than the header are accepted; absent cells are treated as
/// blank.
///
/// # Errors
///
/// Returns [`LoadError`] on CSV syntax errors, an empty header row, or a
/// declared column missing from the header.
pub fn parse_dataset(
    bytes: &[u8],
    schema: &ColumnSchema,
    delimiter: u8,
    label: &str,
) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| {
            String::from_utf8_lossy(h)
                .trim()
                .trim_start_matches('\u{feff}')
                .to_owned()
        })
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(LoadError::NoHeader {
            resource: label.to_owned(),
        });
    }

    let index_of = |column: &str| -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| LoadError::MissingColumn {
                column: column.to_owned(),
                resource: label.to_owned(),
            })
    };

    let text_cols = schema
        .text
        .iter()
        .map(|c| Ok((c.as_str(), index_of(c)?)))
        .collect::<Result<Vec<_>, LoadError>>()?;
    let numeric_cols = schema
        .numeric
        .iter()
        .map(|c| Ok((c.as_str(), index_of(c)?)))
        .collect::<Result<Vec<_>, LoadError>>()?;
    let lat_col = schema.latitude.as_deref().map(&index_of).transpose()?;
    let lng_col = schema.longitude.as_deref().map(&index_of).transpose()?;

    let mut records = Vec::new();
    let mut malformed: BTreeMap<String, u64> = BTreeMap::new();
    let mut malformed_rows = 0_u64;

    for result in reader.byte_records() {
        let row = result?;
        let decoded: Vec<Cow<'_, str>> = row.iter().map(String::from_utf8_lossy).collect();
        if decoded.iter().any(|c| matches!(c, Cow::Owned(_))) {
            malformed_rows += 1;
            log::debug!(
                "[{label}] Row {} contains invalid UTF-8",
                records.len() + 1
            );
        }
        let cell = |i: usize| decoded.get(i).map_or("", |c| c.trim());

        let mut record = Record::new(records.len());

        for (column, i) in &text_cols {
            record.text.insert((*column).to_owned(), cell(*i).to_owned());
        }

        for (column, i) in &numeric_cols {
            let raw = cell(*i);
            let value = parse_measure(raw);
            if value.is_none() && !raw.is_empty() {
                *malformed.entry((*column).to_owned()).or_default() += 1;
            }
            record.numeric.insert((*column).to_owned(), value);
        }

        if let (Some(lat), Some(lng)) = (lat_col, lng_col) {
            record.position = parse_position(Some(cell(lat)), Some(cell(lng)));
        }

        records.push(record);
    }

    if malformed_rows > 0 {
        log::warn!("[{label}] {malformed_rows} row(s) with invalid UTF-8 decoded lossily");
    }
    for (column, count) in &malformed {
        log::warn!("[{label}] {count} non-numeric value(s) in column '{column}'");
    }
    let unpositioned = records.iter().filter(|r| r.position.is_none()).count();
    if lat_col.is_some() && unpositioned > 0 {
        log::warn!("[{label}] {unpositioned} record(s) without a valid position");
    }
    log::info!("[{label}] Parsed {} records", records.len());

    Ok(Dataset {
        headers,
        records,
        malformed,
        malformed_rows,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    const CSV: &str = "\
State_Name,Type,Mean,Weekly_Avg_Video_Game_Hours,Lat,Lon
Alabama,City,38000,4.5,33.5,-86.8
Alabama,Town,not-a-number,6.0,33.6,-86.7
Texas,City,52000,,31.0,-99.0
Texas,CDP,61000,9.25,,
";

    fn schema() -> ColumnSchema {
        ColumnSchema {
            text: vec!["State_Name".to_string(), "Type".to_string()],
            numeric: vec![
                "Mean".to_string(),
                "Weekly_Avg_Video_Game_Hours".to_string(),
            ],
            latitude: Some("Lat".to_string()),
            longitude: Some("Lon".to_string()),
        }
    }

    #[test]
    fn parses_rows_and_coerces_numbers() {
        let ds = parse_dataset(CSV.as_bytes(), &schema(), b',', "test").unwrap();
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.records[0].measure("Mean"), Some(38_000.0));
        assert_eq!(ds.records[0].text("State_Name"), Some("Alabama"));
        assert_eq!(ds.records[3].measure("Weekly_Avg_Video_Game_Hours"), Some(9.25));
    }

    #[test]
    fn bad_numbers_become_missing_and_are_counted() {
        let ds = parse_dataset(CSV.as_bytes(), &schema(), b',', "test").unwrap();
        assert_eq!(ds.records[1].measure("Mean"), None);
        assert_eq!(ds.records[2].measure("Weekly_Avg_Video_Game_Hours"), None);
        assert_eq!(ds.malformed.get("Mean"), Some(&1));
        // Blank cells are missing but not malformed.
        assert_eq!(ds.malformed.get("Weekly_Avg_Video_Game_Hours"), None);
    }

    #[test]
    fn invalid_utf8_row_is_kept_and_counted() {
        let schema = ColumnSchema {
            text: vec!["County".to_string()],
            numeric: vec!["Hours".to_string()],
            ..ColumnSchema::default()
        };
        let ds = parse_dataset(
            b"County,Hours\nAlameda,3.0\nFres\xffno,4.0\nKern,5.0\n",
            &schema,
            b',',
            "test",
        )
        .unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.malformed_rows, 1);
        assert_eq!(ds.records[1].text("County"), Some("Fres\u{fffd}no"));
        assert_eq!(ds.records[1].measure("Hours"), Some(4.0));
        assert_eq!(ds.records[2].text("County"), Some("Kern"));

        let clean = parse_dataset(CSV.as_bytes(), &self::schema(), b',', "test").unwrap();
        assert_eq!(clean.malformed_rows, 0);
    }

    #[test]
    fn rows_without_coordinates_have_no_position() {
        let ds = parse_dataset(CSV.as_bytes(), &schema(), b',', "test").unwrap();
        assert!(ds.records[0].position.is_some());
        assert!(ds.records[3].position.is_none());
    }

    #[test]
    fn missing_declared_column_fails() {
        let mut schema = schema();
        schema.numeric.push("fastest_speed_down".to_string());
        let err = parse_dataset(CSV.as_bytes(), &schema, b',', "test").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column, .. } if column == "fastest_speed_down"));
    }

    #[test]
    fn header_only_file_is_empty_dataset() {
        let ds = parse_dataset(
            b"State_Name,Type,Mean,Weekly_Avg_Video_Game_Hours,Lat,Lon\n",
            &schema(),
            b',',
            "test",
        )
        .unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = parse_dataset(b"", &ColumnSchema::default(), b',', "test").unwrap_err();
        assert!(matches!(err, LoadError::NoHeader { .. }));
    }

    #[test]
    fn honours_custom_delimiter() {
        let tsv = "County\tWeekly_Avg_Exercise_Hours\nFresno\t3.5\n";
        let schema = ColumnSchema {
            text: vec!["County".to_string()],
            numeric: vec!["Weekly_Avg_Exercise_Hours".to_string()],
            ..ColumnSchema::default()
        };
        let ds = parse_dataset(tsv.as_bytes(), &schema, b'\t', "test").unwrap();
        assert_eq!(ds.records[0].measure("Weekly_Avg_Exercise_Hours"), Some(3.5));
    }

    #[tokio::test]
    async fn loads_gzipped_file() {
        let dir = std::env::temp_dir().join(format!("game_viz_loader_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("income.csv.gz");

        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(CSV.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let ds = DatasetLoader::new(DataResource::File(path))
            .with_gzip(true)
            .load(&schema())
            .await
            .unwrap();
        assert_eq!(ds.len(), 4);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let loader = DatasetLoader::new(DataResource::File(
            std::env::temp_dir().join("game_viz_does_not_exist.csv"),
        ));
        assert!(matches!(
            loader.load(&schema()).await,
            Err(LoadError::Io(_))
        ));
    }
}

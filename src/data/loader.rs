use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use crate::engine::SegmentScores;
use crate::mapping::{EmotionLabel, EmotionScoreVector};

use super::features::MusicalFeatures;
use super::model::AnalysisInput;

const START_COLUMN: &str = "start_time";
const END_COLUMN: &str = "end_time";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an analysis input from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – the analyzer's record: `overall_emotions`, `segments`,
///                optional `features`
/// * `.csv`     – one segment per row: `start_time`, `end_time`, one column
///                per emotion label
/// * `.parquet` – same columns as CSV
pub fn load_file(path: &Path) -> Result<AnalysisInput> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let input = match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    input.validate()?;
    log::info!(
        "loaded {} segments ({:.1}s) from {}",
        input.segments.len(),
        input.duration(),
        path.display()
    );
    Ok(input)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct JsonInput {
    overall_emotions: Option<EmotionScoreVector>,
    #[serde(default)]
    segments: Vec<SegmentScores>,
    features: Option<MusicalFeatures>,
}

/// Expected JSON schema:
///
/// ```json
/// {
///   "overall_emotions": {"happy": 0.4, "sad": 0.1, ...},
///   "segments": [
///     {"start_time": 0.0, "end_time": 3.0, "emotions": {"happy": 0.5, ...}},
///     ...
///   ],
///   "features": {"tempo": 120.0, "mode": "major", "energy": 0.004, "spectral_centroid": 1800.0}
/// }
/// ```
///
/// `overall_emotions` may be left out when `features` is present.
fn load_json(path: &Path) -> Result<AnalysisInput> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let raw: JsonInput = serde_json::from_str(&text).context("parsing JSON")?;

    match (raw.overall_emotions, raw.features) {
        (Some(overall_emotions), features) => Ok(AnalysisInput {
            overall_emotions,
            segments: raw.segments,
            features,
        }),
        (None, Some(features)) => Ok(AnalysisInput::from_features(features, raw.segments)),
        (None, None) => bail!("JSON input needs 'overall_emotions' or 'features'"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row, `start_time` and `end_time` columns, and one
/// numeric column per emotion label. Columns that name no emotion are
/// ignored.
fn load_csv(path: &Path) -> Result<AnalysisInput> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let start_idx = headers
        .iter()
        .position(|h| h == START_COLUMN)
        .context("CSV missing 'start_time' column")?;
    let end_idx = headers
        .iter()
        .position(|h| h == END_COLUMN)
        .context("CSV missing 'end_time' column")?;
    let label_cols = label_columns(headers.iter().map(String::as_str));

    let mut segments = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize, col: &str| -> Result<f64> {
            let raw = record.get(idx).unwrap_or("").trim();
            raw.parse::<f64>()
                .with_context(|| format!("Row {row_no}, {col}: '{raw}' is not a number"))
        };

        let start_time = cell(start_idx, START_COLUMN)?;
        let end_time = cell(end_idx, END_COLUMN)?;
        let mut pairs = Vec::with_capacity(label_cols.len());
        for &(idx, label) in &label_cols {
            pairs.push((label.as_str(), cell(idx, label.as_str())?));
        }
        let emotions =
            EmotionScoreVector::from_pairs(pairs).with_context(|| format!("Row {row_no}"))?;

        segments.push(SegmentScores {
            start_time,
            end_time,
            emotions,
        });
    }

    Ok(AnalysisInput::from_segments(segments))
}

/// `(column index, label)` for every header naming an emotion.
fn label_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<(usize, EmotionLabel)> {
    headers
        .enumerate()
        .filter_map(|(i, h)| h.parse::<EmotionLabel>().ok().map(|l| (i, l)))
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet segment table.
///
/// Expected schema:
/// - `start_time`, `end_time`: numeric
/// - one numeric column per emotion label (Float64, Float32, Int64 or Int32)
/// - any other columns are ignored
fn load_parquet(path: &Path) -> Result<AnalysisInput> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut segments = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let start_idx = schema
            .index_of(START_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'start_time' column"))?;
        let end_idx = schema
            .index_of(END_COLUMN)
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'end_time' column"))?;
        let label_cols = label_columns(schema.fields().iter().map(|f| f.name().as_str()));

        for row in 0..batch.num_rows() {
            let start_time = extract_number(batch.column(start_idx), row)
                .with_context(|| format!("Row {row}: failed to read '{START_COLUMN}'"))?;
            let end_time = extract_number(batch.column(end_idx), row)
                .with_context(|| format!("Row {row}: failed to read '{END_COLUMN}'"))?;

            let mut pairs = Vec::with_capacity(label_cols.len());
            for &(idx, label) in &label_cols {
                let score = extract_number(batch.column(idx), row)
                    .with_context(|| format!("Row {row}: failed to read '{label}'"))?;
                pairs.push((label.as_str(), score));
            }
            let emotions =
                EmotionScoreVector::from_pairs(pairs).with_context(|| format!("Row {row}"))?;

            segments.push(SegmentScores {
                start_time,
                end_time,
                emotions,
            });
        }
    }

    Ok(AnalysisInput::from_segments(segments))
}

// -- Arrow helpers --

/// Read one numeric cell as `f64`.
fn extract_number(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    value.context("column data does not match its declared type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn json_with_overall_scores() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "track.json",
            r#"{"overall_emotions": {"happy": 0.7, "tense": 0.3},
                "segments": [{"start_time": 0, "end_time": 3, "emotions": {"happy": 1}}]}"#,
        );
        let input = load_file(&path).unwrap();
        assert_eq!(input.overall_emotions.get(EmotionLabel::Happy), 0.7);
        assert_eq!(input.segments.len(), 1);
    }

    #[test]
    fn json_with_features_only_derives_scores() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "track.json",
            r#"{"features": {"tempo": 60, "mode": "minor", "energy": 0.0001, "spectral_centroid": 400}}"#,
        );
        let input = load_file(&path).unwrap();
        assert_eq!(input.overall_emotions.dominant(), Some(EmotionLabel::Sad));
        assert!(input.features.is_some());
    }

    #[test]
    fn json_without_scores_or_features_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "track.json", r#"{"segments": []}"#);
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn json_with_negative_score_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "track.json", r#"{"overall_emotions": {"calm": -1}}"#);
        let err = format!("{:#}", load_file(&path).unwrap_err());
        assert!(err.contains("calm"), "{err}");
    }

    #[test]
    fn csv_ignores_unknown_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "segments.csv",
            "start_time,end_time,happy,sad,note\n0,3,0.9,0.1,intro\n3,6,0.2,0.8,verse\n",
        );
        let input = load_file(&path).unwrap();
        assert_eq!(input.segments.len(), 2);
        assert_eq!(input.segments[1].emotions.get(EmotionLabel::Sad), 0.8);
        assert!((input.overall_emotions.get(EmotionLabel::Happy) - 0.55).abs() < 1e-12);
    }

    #[test]
    fn csv_with_bad_number_reports_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "segments.csv", "start_time,end_time,calm\n0,3,lots\n");
        let err = format!("{:#}", load_file(&path).unwrap_err());
        assert!(err.contains("Row 0"), "{err}");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "track.wav", "");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn parquet_segment_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segments.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("start_time", DataType::Float64, false),
            Field::new("end_time", DataType::Float64, false),
            Field::new("calm", DataType::Float32, false),
            Field::new("tense", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![0.0, 3.0])),
                Arc::new(Float64Array::from(vec![3.0, 6.0])),
                Arc::new(Float32Array::from(vec![0.5, 0.25])),
                Arc::new(Int64Array::from(vec![0, 1])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let input = load_file(&path).unwrap();
        assert_eq!(input.segments.len(), 2);
        assert_eq!(input.segments[0].emotions.get(EmotionLabel::Calm), 0.5);
        assert_eq!(input.segments[1].emotions.get(EmotionLabel::Tense), 1.0);
        assert_eq!(input.duration(), 6.0);
    }
}

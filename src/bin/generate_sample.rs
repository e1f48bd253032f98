use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

use emotion_volume::data::model::AnalysisInput;
use emotion_volume::engine::{segment_windows, SegmentScores};
use emotion_volume::mapping::{EmotionLabel, EmotionScoreVector};

const TRACK_SECONDS: f64 = 62.0;
const WINDOW_SECONDS: f64 = 3.0;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Scores drift from segment to segment so the time series has some shape.
fn drifting_segments(rng: &mut SimpleRng) -> Vec<SegmentScores> {
    let mut level = [0.6, 0.1, 0.3, 0.5, 0.1];
    segment_windows(TRACK_SECONDS, WINDOW_SECONDS)
        .into_iter()
        .map(|(start, end)| {
            for v in &mut level {
                *v = (*v + (rng.next_f64() - 0.5) * 0.2).clamp(0.0, 1.0);
            }
            let total: f64 = level.iter().sum::<f64>().max(f64::EPSILON);
            let emotions: EmotionScoreVector = EmotionLabel::ALL
                .into_iter()
                .zip(level)
                .map(|(label, v)| (label, v / total))
                .collect();
            SegmentScores {
                start_time: start,
                end_time: end,
                emotions,
            }
        })
        .collect()
}

fn segment_batch(segments: &[SegmentScores]) -> Result<RecordBatch> {
    let mut fields = vec![
        Field::new("start_time", DataType::Float64, false),
        Field::new("end_time", DataType::Float64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from_iter_values(segments.iter().map(|s| s.start_time))),
        Arc::new(Float64Array::from_iter_values(segments.iter().map(|s| s.end_time))),
    ];
    for label in EmotionLabel::ALL {
        fields.push(Field::new(label.as_str(), DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from_iter_values(
            segments.iter().map(|s| s.emotions.get(label)),
        )));
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("Failed to create RecordBatch")
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let segments = drifting_segments(&mut rng);

    let batch = segment_batch(&segments)?;
    let parquet_path = "sample_segments.parquet";
    let file = std::fs::File::create(parquet_path).context("Failed to create output file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;

    let head = batch.slice(0, batch.num_rows().min(3));
    println!("{}", pretty_format_batches(&[head])?);
    println!("Wrote {} segments to {parquet_path}", segments.len());

    let input = AnalysisInput::from_segments(segments);
    let json_path = "sample_input.json";
    std::fs::write(json_path, serde_json::to_string_pretty(&input)?)
        .context("Failed to write sample input")?;
    println!(
        "Wrote {json_path} (dominant emotion: {})",
        input
            .overall_emotions
            .dominant()
            .map(|l| l.as_str())
            .unwrap_or("none")
    );

    Ok(())
}

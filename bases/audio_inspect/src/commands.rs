use crate::config::OutputMode;
use audio_primitives::{AudioFileType, Bpm, LoudnessDescription};
use clap::Subcommand;
use color_eyre::Result;
use serde_json::{json, Value};
use std::fmt;
use std::io::Read;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Describe the file type of extensions or paths
    Classify {
        /// Extensions ("wav", ".BWF") or file paths
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Count audio file types in a directory tree
    Scan {
        /// Root directory to walk
        dir: std::path::PathBuf,

        /// Only count types that can carry metadata
        #[arg(short, long)]
        metadata_only: bool,
    },

    /// Show octave multiples and the average of tempos
    Tempo {
        /// Tempos in BPM
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },

    /// Average loudness records from a JSON array
    Loudness {
        /// JSON file, or "-" for stdin
        input: std::path::PathBuf,
    },
}

/// Classify a bare extension or a path.
///
/// A leading dot is accepted on bare extensions.
pub fn classify_input(input: &str) -> Option<AudioFileType> {
    let path = Path::new(input);
    if path.extension().is_some() {
        return AudioFileType::from_path(path);
    }

    AudioFileType::from_path_extension(input.trim_start_matches('.'))
}

fn code_string(code: Option<audio_primitives::FourCharCode>) -> Option<String> {
    code.map(|c| c.to_string())
}

pub fn describe_json(input: &str, file_type: Option<AudioFileType>) -> Value {
    match file_type {
        Some(t) => json!({
            "input": input,
            "type": t,
            "name": t.string_value(),
            "mimeType": t.mime_type(),
            "supportsMetadata": t.supports_metadata(),
            "isAudio": t.is_audio(),
            "isVideo": t.is_video(),
            "isPcm": t.is_pcm(),
            "audioFormatId": code_string(t.audio_format_id()),
            "audioFileTypeId": code_string(t.audio_file_type_id()),
            "containerUti": t.container_uti(),
        }),
        None => json!({ "input": input, "type": null }),
    }
}

/// Text rendering of one classified input
pub struct Description<'a> {
    pub input: &'a str,
    pub file_type: Option<AudioFileType>,
}

impl fmt::Display for Description<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input = self.input;
        let Some(t) = self.file_type else {
            return writeln!(f, "{input}: unclassified");
        };

        let or_na = |value: Option<String>| value.unwrap_or_else(|| "N/A".to_string());

        writeln!(f, "{input}: {} ({})", t, t.string_value())?;
        writeln!(f, "  MIME type:         {}", or_na(t.mime_type()))?;
        writeln!(f, "  Supports metadata: {}", t.supports_metadata())?;
        writeln!(f, "  Audio / video:     {} / {}", t.is_audio(), t.is_video())?;
        writeln!(f, "  PCM:               {}", t.is_pcm())?;
        writeln!(f, "  Format ID:         {}", or_na(code_string(t.audio_format_id())))?;
        writeln!(f, "  File type ID:      {}", or_na(code_string(t.audio_file_type_id())))?;
        writeln!(
            f,
            "  Container UTI:     {}",
            or_na(t.container_uti().map(str::to_string))
        )
    }
}

pub fn describe_text(input: &str, file_type: Option<AudioFileType>) -> String {
    Description { input, file_type }.to_string()
}

pub fn classify(inputs: &[String], output: OutputMode) -> String {
    match output {
        OutputMode::Json => {
            let described: Vec<Value> = inputs
                .iter()
                .map(|input| describe_json(input, classify_input(input)))
                .collect();
            Value::Array(described).to_string()
        }
        OutputMode::Text => inputs
            .iter()
            .map(|input| describe_text(input, classify_input(input)))
            .collect(),
    }
}

/// Validated tempos and their aggregate
#[derive(Debug)]
pub struct TempoReport {
    pub tempos: Vec<Bpm>,
    pub rejected: Vec<f64>,
    pub average: Option<Bpm>,
}

impl TempoReport {
    pub fn new(values: &[f64]) -> Self {
        let mut tempos = Vec::new();
        let mut rejected = Vec::new();

        for &value in values {
            match Bpm::new(value) {
                Some(bpm) => tempos.push(bpm),
                None => rejected.push(value),
            }
        }

        let average = Bpm::average(&tempos);
        Self {
            tempos,
            rejected,
            average,
        }
    }

    pub fn render(&self, output: OutputMode) -> String {
        match output {
            OutputMode::Json => json!({
                "tempos": self.tempos.iter().map(|bpm| json!({
                    "bpm": bpm,
                    "multiples": bpm.multiples(),
                    "quarterNoteSeconds": bpm.quarter_note_duration(),
                    "inTempoRange": bpm.is_in_tempo_range(),
                })).collect::<Vec<_>>(),
                "rejected": self.rejected,
                "average": self.average,
            })
            .to_string(),
            OutputMode::Text => self.to_string(),
        }
    }
}

impl fmt::Display for TempoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bpm in &self.tempos {
            let multiples: Vec<String> = bpm.multiples().iter().map(|m| m.to_string()).collect();
            writeln!(
                f,
                "{} BPM: quarter note {:.3}s, multiples [{}]{}",
                bpm,
                bpm.quarter_note_duration(),
                multiples.join(", "),
                if bpm.is_in_tempo_range() {
                    ""
                } else {
                    " (outside tempo range)"
                }
            )?;
        }
        for value in &self.rejected {
            writeln!(f, "{value}: rejected, BPM must be > 0")?;
        }
        match self.average {
            Some(average) => writeln!(f, "Average: {average} BPM"),
            None => writeln!(f, "Average: N/A"),
        }
    }
}

/// Read a JSON array of loudness records.
///
/// Individual malformed facets are dropped by the record decoder; a document
/// that is not an array of objects is an error.
pub fn read_loudness_records(reader: impl Read) -> Result<Vec<LoudnessDescription>> {
    let records: Vec<LoudnessDescription> = serde_json::from_reader(reader)?;
    tracing::debug!("Read {} loudness records", records.len());
    Ok(records)
}

pub fn load_loudness_records(input: &Path) -> Result<Vec<LoudnessDescription>> {
    if input == Path::new("-") {
        return read_loudness_records(std::io::stdin().lock());
    }

    if !input.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Loudness file does not exist: {}",
            input.display()
        ));
    }

    let file = std::fs::File::open(input)?;
    read_loudness_records(std::io::BufReader::new(file))
}

/// Per-record summaries followed by the field-wise average
pub struct LoudnessReport<'a> {
    pub records: &'a [LoudnessDescription],
    pub average: LoudnessDescription,
}

impl<'a> LoudnessReport<'a> {
    pub fn new(records: &'a [LoudnessDescription]) -> Self {
        Self {
            records,
            average: LoudnessDescription::average_loudness(records),
        }
    }
}

impl fmt::Display for LoudnessReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            writeln!(f, "{:>4}: {}", i + 1, record)?;
        }
        writeln!(
            f,
            "Average of {} records: {}",
            self.records.len(),
            self.average
        )
    }
}

pub fn render_loudness(records: &[LoudnessDescription], output: OutputMode) -> Result<String> {
    let report = LoudnessReport::new(records);

    match output {
        OutputMode::Json => Ok(serde_json::to_string(&report.average)?),
        OutputMode::Text => Ok(report.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_extensions_and_paths() {
        assert_eq!(classify_input("wav"), Some(AudioFileType::Wav));
        assert_eq!(classify_input(".AIF"), Some(AudioFileType::Aiff));
        assert_eq!(classify_input("mix/track01.bwf"), Some(AudioFileType::Wav));
        assert_eq!(classify_input("cover.jpg"), None);
        assert_eq!(classify_input("xyz"), None);
    }

    #[test]
    fn unclassified_text() {
        assert_eq!(
            classify(&["xyz".to_string()], OutputMode::Text),
            "xyz: unclassified\n"
        );
    }

    #[test]
    fn describes_known_type() {
        let text = describe_text("song.m4a", Some(AudioFileType::M4a));
        assert!(text.starts_with("song.m4a: m4a (Apple MPEG-4 Audio)"));
        assert!(text.contains("MIME type:         audio/x-m4a"));
        assert!(text.contains("Format ID:         aac "));
        assert!(text.contains("File type ID:      m4af"));
    }

    #[test]
    fn description_renders_every_line() {
        let text = Description {
            input: "take.caf",
            file_type: Some(AudioFileType::Caf),
        }
        .to_string();
        assert_eq!(text.lines().count(), 8);
        assert!(text.ends_with("Container UTI:     com.apple.coreaudio-format\n"));
    }

    #[test]
    fn loudness_report_omits_infinite_average() {
        let records = [LoudnessDescription {
            loudness_value: Some(f64::NEG_INFINITY),
            max_momentary_loudness: Some(f64::NEG_INFINITY),
            loudness_range: Some(2.0),
            ..Default::default()
        }];
        let rendered = render_loudness(&records, OutputMode::Json).unwrap();
        assert_eq!(rendered, r#"{"loudnessRange":2.0}"#);

        let text = LoudnessReport::new(&records).to_string();
        assert!(text.ends_with("Average of 1 records: N/A LUFS, N/A dBTP, 2.0 LRA\n"));
    }

    #[test]
    fn describes_json() {
        let value = describe_json("w64", Some(AudioFileType::W64));
        assert_eq!(value["type"], "w64");
        assert_eq!(value["name"], "Wave (BW64 for length over 4 GB)");
        assert_eq!(value["audioFileTypeId"], "W64f");
        assert_eq!(value["audioFormatId"], Value::Null);
        assert_eq!(value["isPcm"], false);

        let value = describe_json("xyz", None);
        assert_eq!(value["type"], Value::Null);
    }

    #[test]
    fn tempo_report_skips_invalid_values() {
        let report = TempoReport::new(&[60.0, -5.0, 120.0, 0.0]);
        assert_eq!(report.tempos.len(), 2);
        assert_eq!(report.rejected, vec![-5.0, 0.0]);
        assert_eq!(report.average, Bpm::new(90.0));

        let text = report.render(OutputMode::Text);
        assert!(text.contains("60 BPM: quarter note 1.000s, multiples [7.5, 15, 30, 60, 120, 240, 480]"));
        assert!(text.contains("-5: rejected"));
        assert!(text.ends_with("Average: 90 BPM\n"));
    }

    #[test]
    fn tempo_report_without_valid_values() {
        let report = TempoReport::new(&[-1.0]);
        assert_eq!(report.average, None);
        assert!(report.render(OutputMode::Text).ends_with("Average: N/A\n"));

        let value: Value = serde_json::from_str(&report.render(OutputMode::Json)).unwrap();
        assert_eq!(value["average"], Value::Null);
        assert_eq!(value["rejected"][0], -1.0);
    }

    #[test]
    fn reads_records_best_effort() {
        let json = r#"[
            {"loudnessValue": -10.0, "maxTruePeakLevel": "bad"},
            {"loudnessRange": 5.0},
            {}
        ]"#;
        let records = read_loudness_records(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].max_true_peak_level, None);

        let rendered = render_loudness(&records, OutputMode::Json).unwrap();
        assert_eq!(rendered, r#"{"loudnessValue":-10.0,"loudnessRange":5.0}"#);

        let text = render_loudness(&records, OutputMode::Text).unwrap();
        assert!(text.ends_with("Average of 3 records: -10.0 LUFS, N/A dBTP, 5.0 LRA\n"));
    }

    #[test]
    fn rejects_non_array_documents() {
        assert!(read_loudness_records(r#"{"loudnessValue": -10.0}"#.as_bytes()).is_err());
    }

    #[test]
    fn missing_loudness_file_is_an_error() {
        let result = load_loudness_records(Path::new("/definitely/not/here.json"));
        assert!(result.is_err());
    }
}

use crate::config::OutputMode;
use audio_primitives::AudioFileType;
use color_eyre::Result;
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

pub struct Statistics {
    pub total_files: usize,
    pub by_type: HashMap<AudioFileType, usize>,
    pub unclassified: usize,
    pub without_metadata_support: usize,
}

impl Statistics {
    fn new() -> Self {
        Self {
            total_files: 0,
            by_type: HashMap::new(),
            unclassified: 0,
            without_metadata_support: 0,
        }
    }

    fn update(&mut self, path: &Path, metadata_only: bool) {
        self.total_files += 1;

        let Some(file_type) = AudioFileType::from_path(path) else {
            self.unclassified += 1;
            return;
        };

        if metadata_only && !file_type.supports_metadata() {
            tracing::debug!("Skipping {} without metadata support", path.display());
            self.without_metadata_support += 1;
            return;
        }

        *self.by_type.entry(file_type).or_insert(0) += 1;
    }

    /// Counted types in declaration order, most frequent first
    pub fn sorted_counts(&self) -> Vec<(AudioFileType, usize)> {
        let mut counts: Vec<_> = AudioFileType::ALL
            .into_iter()
            .filter_map(|t| self.by_type.get(&t).map(|count| (t, *count)))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    pub fn render(&self, output: OutputMode) -> String {
        match output {
            OutputMode::Json => {
                let by_type: serde_json::Map<String, serde_json::Value> = self
                    .sorted_counts()
                    .into_iter()
                    .map(|(t, count)| (t.as_str().to_string(), json!(count)))
                    .collect();
                json!({
                    "totalFiles": self.total_files,
                    "byType": by_type,
                    "unclassified": self.unclassified,
                    "withoutMetadataSupport": self.without_metadata_support,
                })
                .to_string()
            }
            OutputMode::Text => self.to_string(),
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total files:              {}", self.total_files)?;
        for (file_type, count) in self.sorted_counts() {
            writeln!(
                f,
                "  {:34} {} ({:.1}%)",
                file_type.string_value(),
                count,
                count as f64 / self.total_files as f64 * 100.0
            )?;
        }
        if self.without_metadata_support > 0 {
            writeln!(
                f,
                "Without metadata support: {}",
                self.without_metadata_support
            )?;
        }
        writeln!(f, "Unclassified:             {}", self.unclassified)
    }
}

/// Walk `root` and classify every regular file by its extension
pub fn scan_library(root: &Path, metadata_only: bool) -> Result<Statistics> {
    if !root.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Library path does not exist: {}",
            root.display()
        ));
    }

    let mut stats = Statistics::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
    {
        if !entry.file_type().is_file() {
            continue;
        }
        stats.update(entry.path(), metadata_only);
    }

    tracing::info!(
        "Scanned {} files under {}",
        stats.total_files,
        root.display()
    );
    Ok(stats)
}

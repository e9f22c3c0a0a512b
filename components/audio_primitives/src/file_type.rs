use crate::codes::{audio_file_type, audio_format, FourCharCode};
use crate::type_identifier::{ExtensionResolver, MediaClass, TypeResolver};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FileTypeError {
    #[error("Unknown audio file type: {0}")]
    Unknown(String),
}

/// Container and codec kinds recognised by the library.
///
/// Every descriptive facet is a pure function of the variant. Facets are
/// partial: roughly half the variants have no display name, static MIME
/// type or native codes, and report `None` rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFileType {
    Aac,
    Aifc,
    Aiff,
    Au,
    Caf,
    Flac,
    Ogg,
    M4a,
    M4b,
    M4v,
    Mov,
    Mp3,
    Mp4,
    Opus,
    Snd,
    Ts,
    Wav,
    W64,
}

impl FromStr for AudioFileType {
    type Err = FileTypeError;

    /// Parse the canonical lower-case identifier. Aliases are handled by
    /// [`AudioFileType::from_path_extension`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aac" => Ok(Self::Aac),
            "aifc" => Ok(Self::Aifc),
            "aiff" => Ok(Self::Aiff),
            "au" => Ok(Self::Au),
            "caf" => Ok(Self::Caf),
            "flac" => Ok(Self::Flac),
            "ogg" => Ok(Self::Ogg),
            "m4a" => Ok(Self::M4a),
            "m4b" => Ok(Self::M4b),
            "m4v" => Ok(Self::M4v),
            "mov" => Ok(Self::Mov),
            "mp3" => Ok(Self::Mp3),
            "mp4" => Ok(Self::Mp4),
            "opus" => Ok(Self::Opus),
            "snd" => Ok(Self::Snd),
            "ts" => Ok(Self::Ts),
            "wav" => Ok(Self::Wav),
            "w64" => Ok(Self::W64),
            _ => Err(FileTypeError::Unknown(s.to_string())),
        }
    }
}

impl AudioFileType {
    pub const ALL: [AudioFileType; 18] = [
        Self::Aac,
        Self::Aifc,
        Self::Aiff,
        Self::Au,
        Self::Caf,
        Self::Flac,
        Self::Ogg,
        Self::M4a,
        Self::M4b,
        Self::M4v,
        Self::Mov,
        Self::Mp3,
        Self::Mp4,
        Self::Opus,
        Self::Snd,
        Self::Ts,
        Self::Wav,
        Self::W64,
    ];

    /// File types commonly used for metadata storage
    pub const METADATA_TYPES: [AudioFileType; 10] = [
        Self::Aac,
        Self::Aiff,
        Self::M4a,
        Self::M4b,
        Self::Mp3,
        Self::Mp4,
        Self::Wav,
        Self::Flac,
        Self::Ogg,
        Self::Opus,
    ];

    /// Create an `AudioFileType` from a filename extension (without the dot).
    ///
    /// Matching is case-insensitive and accepts the aliases `aif`, `wave`
    /// and `bwf`.
    ///
    /// # Examples
    /// ```
    /// # use audio_primitives::AudioFileType;
    /// assert_eq!(AudioFileType::from_path_extension("AIF"), Some(AudioFileType::Aiff));
    /// assert_eq!(AudioFileType::from_path_extension("bwf"), Some(AudioFileType::Wav));
    /// assert_eq!(AudioFileType::from_path_extension("xyz"), None);
    /// ```
    pub fn from_path_extension(extension: &str) -> Option<Self> {
        let raw = extension.to_lowercase();

        match raw.as_str() {
            "aif" => Some(Self::Aiff),
            "wave" | "bwf" => Some(Self::Wav),
            other => other.parse().ok(),
        }
    }

    /// Classify a path by its extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?;
        let file_type = Self::from_path_extension(extension);
        if file_type.is_none() {
            tracing::trace!("Unclassified extension: {}", extension);
        }
        file_type
    }

    /// Canonical identifier, also the canonical filename extension
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Aifc => "aifc",
            Self::Aiff => "aiff",
            Self::Au => "au",
            Self::Caf => "caf",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::M4a => "m4a",
            Self::M4b => "m4b",
            Self::M4v => "m4v",
            Self::Mov => "mov",
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
            Self::Opus => "opus",
            Self::Snd => "snd",
            Self::Ts => "ts",
            Self::Wav => "wav",
            Self::W64 => "w64",
        }
    }

    pub fn path_extension(&self) -> &'static str {
        self.as_str()
    }

    /// Human readable format name, when one is known
    pub fn file_type_name(&self) -> Option<&'static str> {
        match self {
            Self::Aac => Some("AAC"),
            Self::Aiff => Some("AIFF"),
            Self::Caf => Some("CAF"),
            Self::Flac => Some("FLAC"),
            Self::M4a => Some("Apple MPEG-4 Audio"),
            Self::M4b => Some("Apple MPEG-4 AudioBooks"),
            Self::Mp3 => Some("MPEG Layer 3"),
            Self::Mp4 => Some("MPEG-4"),
            Self::M4v => Some("Apple MPEG-4 Video"),
            Self::Mov => Some("Apple QuickTime"),
            Self::Ogg => Some("Ogg Vorbis"),
            Self::Opus => Some("Ogg Opus"),
            Self::Wav => Some("Waveform Audio"),
            Self::W64 => Some("Wave (BW64 for length over 4 GB)"),
            Self::Aifc | Self::Au | Self::Snd | Self::Ts => None,
        }
    }

    /// Display name, falling back to the raw identifier
    pub fn string_value(&self) -> &'static str {
        self.file_type_name().unwrap_or(self.as_str())
    }

    pub fn supports_metadata(&self) -> bool {
        Self::METADATA_TYPES.contains(self)
    }

    fn static_mime_type(&self) -> Option<&'static str> {
        match self {
            Self::Aac => Some("audio/aac"),
            Self::Aiff => Some("audio/aiff"),
            Self::Caf => Some("audio/x-caf"),
            Self::M4a => Some("audio/x-m4a"),
            Self::Mov => Some("video/mov"),
            Self::Mp3 => Some("audio/mpeg"),
            Self::Mp4 => Some("video/mp4"),
            Self::Wav => Some("audio/wav"),
            Self::Aifc
            | Self::Au
            | Self::Flac
            | Self::Ogg
            | Self::M4b
            | Self::M4v
            | Self::Opus
            | Self::Snd
            | Self::Ts
            | Self::W64 => None,
        }
    }

    /// MIME type from the built-in table, otherwise from the extension database
    pub fn mime_type(&self) -> Option<String> {
        self.mime_type_with(&ExtensionResolver)
    }

    pub fn mime_type_with(&self, resolver: &impl TypeResolver) -> Option<String> {
        match self.static_mime_type() {
            Some(mime) => Some(mime.to_string()),
            None => resolver.preferred_mime_type(self.path_extension()),
        }
    }

    pub fn is_audio(&self) -> bool {
        self.is_audio_with(&ExtensionResolver)
    }

    pub fn is_audio_with(&self, resolver: &impl TypeResolver) -> bool {
        resolver.conforms_to(self.path_extension(), MediaClass::Audio)
    }

    pub fn is_video(&self) -> bool {
        self.is_video_with(&ExtensionResolver)
    }

    pub fn is_video_with(&self, resolver: &impl TypeResolver) -> bool {
        resolver.conforms_to(self.path_extension(), MediaClass::Video)
    }

    pub fn is_pcm(&self) -> bool {
        self.audio_format_id() == Some(audio_format::LINEAR_PCM)
    }

    /// Native stream data format. Advisory only: unmapped types return `None`.
    pub fn audio_format_id(&self) -> Option<FourCharCode> {
        match self {
            Self::Wav | Self::Aiff | Self::Caf => Some(audio_format::LINEAR_PCM),
            Self::M4a | Self::Mp4 | Self::Aac => Some(audio_format::MPEG4_AAC),
            Self::Mp3 => Some(audio_format::MPEG_LAYER_3),
            Self::Aifc
            | Self::Au
            | Self::Flac
            | Self::Ogg
            | Self::M4b
            | Self::M4v
            | Self::Mov
            | Self::Opus
            | Self::Snd
            | Self::Ts
            | Self::W64 => None,
        }
    }

    /// Native container file type. Advisory only: unmapped types return `None`.
    pub fn audio_file_type_id(&self) -> Option<FourCharCode> {
        match self {
            Self::Aac => Some(audio_file_type::AAC_ADTS),
            Self::Aifc => Some(audio_file_type::AIFC),
            Self::Aiff => Some(audio_file_type::AIFF),
            Self::Caf => Some(audio_file_type::CAF),
            Self::Flac => Some(audio_file_type::FLAC),
            Self::M4a => Some(audio_file_type::M4A),
            Self::Mp3 => Some(audio_file_type::MP3),
            Self::Mp4 => Some(audio_file_type::MPEG4),
            Self::W64 => Some(audio_file_type::WAVE64),
            Self::Wav => Some(audio_file_type::WAVE),
            Self::Au
            | Self::Ogg
            | Self::M4b
            | Self::M4v
            | Self::Mov
            | Self::Opus
            | Self::Snd
            | Self::Ts => None,
        }
    }

    /// Uniform type identifier of the container, for writer APIs keyed by UTI
    pub fn container_uti(&self) -> Option<&'static str> {
        match self {
            Self::Aac => Some("public.mpeg-4"),
            Self::Aiff => Some("public.aiff-audio"),
            Self::Aifc => Some("public.aifc-audio"),
            Self::Au => Some("public.au-audio"),
            Self::Caf => Some("com.apple.coreaudio-format"),
            Self::M4a => Some("com.apple.m4a-audio"),
            Self::Mov => Some("com.apple.quicktime-movie"),
            Self::Mp3 => Some("public.mp3"),
            Self::Mp4 => Some("public.mpeg-4"),
            Self::Wav => Some("com.microsoft.waveform-audio"),
            Self::Flac
            | Self::Ogg
            | Self::M4b
            | Self::M4v
            | Self::Opus
            | Self::Snd
            | Self::Ts
            | Self::W64 => None,
        }
    }
}

impl fmt::Display for AudioFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

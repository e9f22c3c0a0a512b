mod bpm;
mod codes;
mod file_type;
mod loudness;
mod type_identifier;

pub use bpm::{Bpm, BpmError};
pub use codes::{audio_file_type, audio_format, FourCharCode};
pub use file_type::{AudioFileType, FileTypeError};
pub use loudness::LoudnessDescription;
pub use type_identifier::{ExtensionResolver, MediaClass, TypeResolver};

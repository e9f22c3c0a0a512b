use mime_guess::mime;

/// Broad media classification a file type can conform to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaClass {
    Audio,
    /// Video and movie types
    Video,
}

/// Resolves filename extensions against a type-identifier database.
///
/// "No answer" is a normal outcome: unknown extensions resolve to `None`
/// and conform to nothing.
pub trait TypeResolver {
    /// Preferred MIME type for files with this extension
    fn preferred_mime_type(&self, extension: &str) -> Option<String>;

    /// Whether files with this extension belong to `class`
    fn conforms_to(&self, extension: &str, class: MediaClass) -> bool;
}

/// Resolver backed by the `mime_guess` extension table
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionResolver;

impl TypeResolver for ExtensionResolver {
    fn preferred_mime_type(&self, extension: &str) -> Option<String> {
        mime_guess::from_ext(extension)
            .first()
            .map(|m| m.essence_str().to_string())
    }

    fn conforms_to(&self, extension: &str, class: MediaClass) -> bool {
        let top_level = match class {
            MediaClass::Audio => mime::AUDIO,
            MediaClass::Video => mime::VIDEO,
        };

        mime_guess::from_ext(extension)
            .iter()
            .any(|m| m.type_().as_str() == top_level.as_str())
    }
}

use std::fmt;

/// Four ASCII characters packed big-endian into a `u32`, the way native
/// audio APIs identify stream formats and container types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCharCode(u32);

impl FourCharCode {
    /// Pack four bytes, first byte most significant.
    ///
    /// # Examples
    /// ```
    /// # use audio_primitives::FourCharCode;
    /// let code = FourCharCode::from_bytes(*b"lpcm");
    /// assert_eq!(code.as_u32(), 0x6C70_636D);
    /// assert_eq!(code.to_string(), "lpcm");
    /// ```
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    pub const fn to_bytes(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for FourCharCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.to_bytes() {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }
        Ok(())
    }
}

/// Stream data formats (the general kind of data in an audio stream).
pub mod audio_format {
    use super::FourCharCode;

    pub const LINEAR_PCM: FourCharCode = FourCharCode::from_bytes(*b"lpcm");
    pub const MPEG4_AAC: FourCharCode = FourCharCode::from_bytes(*b"aac ");
    pub const MPEG_LAYER_3: FourCharCode = FourCharCode::from_bytes(*b".mp3");
}

/// Container file types.
pub mod audio_file_type {
    use super::FourCharCode;

    pub const AAC_ADTS: FourCharCode = FourCharCode::from_bytes(*b"adts");
    pub const AIFC: FourCharCode = FourCharCode::from_bytes(*b"AIFC");
    pub const AIFF: FourCharCode = FourCharCode::from_bytes(*b"AIFF");
    pub const CAF: FourCharCode = FourCharCode::from_bytes(*b"caff");
    pub const FLAC: FourCharCode = FourCharCode::from_bytes(*b"flac");
    pub const M4A: FourCharCode = FourCharCode::from_bytes(*b"m4af");
    pub const MP3: FourCharCode = FourCharCode::from_bytes(*b"MPG3");
    pub const MPEG4: FourCharCode = FourCharCode::from_bytes(*b"mp4f");
    pub const WAVE64: FourCharCode = FourCharCode::from_bytes(*b"W64f");
    pub const WAVE: FourCharCode = FourCharCode::from_bytes(*b"WAVE");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_big_endian() {
        assert_eq!(audio_file_type::WAVE.as_u32(), 0x5741_5645);
        assert_eq!(audio_file_type::WAVE.to_bytes(), *b"WAVE");
    }

    #[test]
    fn displays_trailing_space() {
        assert_eq!(audio_format::MPEG4_AAC.to_string(), "aac ");
    }

    #[test]
    fn escapes_non_printable_bytes() {
        let code = FourCharCode::from_u32(0x0000_0001);
        assert_eq!(code.to_string(), "\\x00\\x00\\x00\\x01");
    }
}

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BpmError {
    #[error("BPM must be a positive value > 0, got {0}")]
    NotPositive(f64),
}

const MULTIPLE_RATIOS: [f64; 7] = [0.125, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0];

/// Beats per minute.
///
/// Always strictly positive. Octave-related tempos (x8 down to /8) are
/// available through [`Bpm::multiples`] so that e.g. 80 BPM and 160 BPM can
/// be recognised as the same groove.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Bpm {
    raw_value: f64,
    multiples: [f64; 7],
}

impl Bpm {
    /// Lower bound of the usable tempo range. Not enforced by construction.
    pub const MIN: f64 = 1.0;

    /// Upper bound of the usable tempo range. Not enforced by construction.
    pub const MAX: f64 = 1024.0;

    /// Create a tempo, reporting why the value was rejected
    ///
    /// # Examples
    /// ```
    /// # use audio_primitives::{Bpm, BpmError};
    /// let bpm = Bpm::try_new(128.0)?;
    /// assert_eq!(bpm.raw_value(), 128.0);
    /// assert!(Bpm::try_new(0.0).is_err());
    /// # Ok::<(), BpmError>(())
    /// ```
    pub fn try_new(raw_value: f64) -> Result<Self, BpmError> {
        // NaN fails this comparison as well
        if !(raw_value > 0.0) {
            return Err(BpmError::NotPositive(raw_value));
        }

        Ok(Self {
            raw_value,
            multiples: MULTIPLE_RATIOS.map(|ratio| raw_value * ratio),
        })
    }

    /// Create a tempo, logging and returning `None` for non-positive values
    pub fn new(raw_value: f64) -> Option<Self> {
        match Self::try_new(raw_value) {
            Ok(bpm) => Some(bpm),
            Err(e) => {
                tracing::error!("{}", e);
                None
            }
        }
    }

    pub fn raw_value(&self) -> f64 {
        self.raw_value
    }

    /// The tempo at 1/8, 1/4, 1/2, 1, 2, 4 and 8 times its value
    pub fn multiples(&self) -> &[f64; 7] {
        &self.multiples
    }

    /// Seconds per quarter note
    pub fn quarter_note_duration(&self) -> f64 {
        60.0 / self.raw_value
    }

    pub fn is_whole_number(&self) -> bool {
        self.raw_value % 1.0 == 0.0
    }

    pub fn is_in_tempo_range(&self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.raw_value)
    }

    /// `"120"` for whole tempos, `"120.5"` otherwise
    pub fn string_value(&self) -> String {
        if self.is_whole_number() {
            format!("{:.0}", self.raw_value)
        } else {
            format!("{}", self.raw_value)
        }
    }

    /// Whether `rhs` is one of this tempo's octave multiples.
    ///
    /// Non-positive values are never multiples.
    pub fn is_multiple_of(&self, rhs: f64) -> bool {
        match Self::new(rhs) {
            Some(rhs) => self.is_multiple_of_bpm(&rhs),
            None => false,
        }
    }

    /// Exact membership test; independently rounded tempos may not match
    ///
    /// # Examples
    /// ```
    /// # use audio_primitives::Bpm;
    /// let bpm = Bpm::new(80.0).unwrap();
    /// assert!(bpm.is_multiple_of_bpm(&Bpm::new(160.0).unwrap()));
    /// assert!(!bpm.is_multiple_of_bpm(&Bpm::new(100.0).unwrap()));
    /// ```
    pub fn is_multiple_of_bpm(&self, rhs: &Bpm) -> bool {
        self.multiples.contains(&rhs.raw_value)
    }

    /// Mean tempo rounded to the nearest whole BPM, ties to even.
    ///
    /// Returns `None` for an empty collection.
    pub fn average<'a>(tempos: impl IntoIterator<Item = &'a Bpm>) -> Option<Bpm> {
        // Running mean, so very large tempos cannot overflow a sum
        let (mean, count) = tempos.into_iter().fold((0.0, 0usize), |(mean, count), bpm| {
            let count = count + 1;
            (mean + (bpm.raw_value - mean) / count as f64, count)
        });

        if count == 0 {
            return None;
        }

        tracing::debug!("Averaged {} tempos to {}", count, mean);
        Self::new(mean.round_ties_even())
    }
}

impl PartialEq for Bpm {
    fn eq(&self, other: &Self) -> bool {
        self.raw_value == other.raw_value
    }
}

// Construction rules out NaN, so equality on the raw value is total
impl Eq for Bpm {}

impl PartialOrd for Bpm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bpm {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw_value.total_cmp(&other.raw_value)
    }
}

impl Hash for Bpm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw_value.to_bits().hash(state);
    }
}

impl TryFrom<f64> for Bpm {
    type Error = BpmError;

    fn try_from(raw_value: f64) -> Result<Self, Self::Error> {
        Self::try_new(raw_value)
    }
}

impl From<Bpm> for f64 {
    fn from(bpm: Bpm) -> Self {
        bpm.raw_value
    }
}

impl fmt::Display for Bpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.string_value())
    }
}

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Loudness facets of a file as reported by its metadata (e.g. a BWF `bext`
/// chunk or an EBU R128 analysis).
///
/// Sources rarely report every facet, so each one is optional and absence is
/// distinct from zero. Only finite facets are encoded; decoding is best
/// effort per key (see the `Deserialize` impl).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoudnessDescription {
    /// Integrated loudness in LUFS
    #[serde(skip_serializing_if = "not_encodable")]
    pub loudness_value: Option<f64>,

    /// Loudness range in LU
    #[serde(skip_serializing_if = "not_encodable")]
    pub loudness_range: Option<f64>,

    /// Maximum true peak level in dBTP
    #[serde(skip_serializing_if = "not_encodable_f32")]
    pub max_true_peak_level: Option<f32>,

    /// Highest momentary loudness in LUFS
    #[serde(skip_serializing_if = "not_encodable")]
    pub max_momentary_loudness: Option<f64>,

    /// Highest short-term loudness in LUFS
    #[serde(skip_serializing_if = "not_encodable")]
    pub max_short_term_loudness: Option<f64>,
}

// Non-finite numbers have no JSON form and would otherwise be written as null
fn not_encodable(value: &Option<f64>) -> bool {
    value.map_or(true, |v| !v.is_finite())
}

fn not_encodable_f32(value: &Option<f32>) -> bool {
    value.map_or(true, |v| !v.is_finite())
}

/// A single decoded facet. Anything that is not a number is `Malformed`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Facet {
    Present(f64),
    Malformed(IgnoredAny),
}

impl Facet {
    fn into_f64(self) -> Option<f64> {
        match self {
            Facet::Present(value) => Some(value),
            Facet::Malformed(_) => None,
        }
    }

    /// Narrow to `f32`; finite values outside its range are malformed
    fn into_f32(self) -> Option<f32> {
        let wide = self.into_f64()?;
        let narrow = wide as f32;
        if wide.is_finite() && !narrow.is_finite() {
            return None;
        }
        Some(narrow)
    }
}

struct LoudnessVisitor;

impl<'de> Visitor<'de> for LoudnessVisitor {
    type Value = LoudnessDescription;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a loudness record")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut out = LoudnessDescription::default();

        // Repeated keys overwrite, unknown keys are skipped
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "loudnessValue" => out.loudness_value = map.next_value::<Facet>()?.into_f64(),
                "loudnessRange" => out.loudness_range = map.next_value::<Facet>()?.into_f64(),
                "maxTruePeakLevel" => {
                    out.max_true_peak_level = map.next_value::<Facet>()?.into_f32()
                }
                "maxMomentaryLoudness" => {
                    out.max_momentary_loudness = map.next_value::<Facet>()?.into_f64()
                }
                "maxShortTermLoudness" => {
                    out.max_short_term_loudness = map.next_value::<Facet>()?.into_f64()
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(out)
    }
}

impl<'de> Deserialize<'de> for LoudnessDescription {
    /// Each key decodes independently: a malformed value leaves only that
    /// facet absent instead of failing the record.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(LoudnessVisitor)
    }
}

const NOT_AVAILABLE: &str = "N/A";

fn one_decimal<T: fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

impl LoudnessDescription {
    /// True when no facet is present
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// A summary suitable for display, e.g. `"-14.2 LUFS, -1.0 dBTP, 6.3 LRA"`.
    ///
    /// A loudness range of exactly zero is shown as unavailable.
    pub fn short_description(&self) -> String {
        let loudness_range = self.loudness_range.filter(|range| *range != 0.0);

        format!(
            "{} LUFS, {} dBTP, {} LRA",
            one_decimal(self.loudness_value),
            one_decimal(self.max_true_peak_level),
            one_decimal(loudness_range),
        )
    }

    /// Compare by integrated loudness only.
    ///
    /// Records without an integrated loudness are incomparable.
    pub fn loudness_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.loudness_value, other.loudness_value) {
            (Some(lhs), Some(rhs)) => lhs.partial_cmp(&rhs),
            _ => None,
        }
    }

    pub fn is_quieter_than(&self, other: &Self) -> bool {
        self.loudness_cmp(other) == Some(Ordering::Less)
    }

    pub fn is_louder_than(&self, other: &Self) -> bool {
        self.loudness_cmp(other) == Some(Ordering::Greater)
    }

    /// Average each facet over the records that report it.
    ///
    /// Infinite integrated loudness values (e.g. from digital silence) are
    /// left out of the integrated loudness mean.
    pub fn average_loudness(descriptions: &[LoudnessDescription]) -> LoudnessDescription {
        let mut out = LoudnessDescription::default();

        if descriptions.is_empty() {
            return out;
        }

        let loudness_values: Vec<f64> = descriptions
            .iter()
            .filter_map(|d| d.loudness_value)
            .filter(|v| !v.is_infinite())
            .collect();
        out.loudness_value = mean(&loudness_values);

        let loudness_ranges: Vec<f64> = descriptions
            .iter()
            .filter_map(|d| d.loudness_range)
            .collect();
        out.loudness_range = mean(&loudness_ranges);

        let true_peaks: Vec<f32> = descriptions
            .iter()
            .filter_map(|d| d.max_true_peak_level)
            .collect();
        if !true_peaks.is_empty() {
            out.max_true_peak_level =
                Some(true_peaks.iter().sum::<f32>() / true_peaks.len() as f32);
        }

        let momentary: Vec<f64> = descriptions
            .iter()
            .filter_map(|d| d.max_momentary_loudness)
            .collect();
        out.max_momentary_loudness = mean(&momentary);

        let short_term: Vec<f64> = descriptions
            .iter()
            .filter_map(|d| d.max_short_term_loudness)
            .collect();
        out.max_short_term_loudness = mean(&short_term);

        out
    }
}

impl fmt::Display for LoudnessDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integrated(lufs: f64) -> LoudnessDescription {
        LoudnessDescription {
            loudness_value: Some(lufs),
            ..Default::default()
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn all_facets_present() {
            let loudness = LoudnessDescription {
                loudness_value: Some(-14.23),
                loudness_range: Some(6.26),
                max_true_peak_level: Some(-1.0),
                max_momentary_loudness: Some(-8.0),
                max_short_term_loudness: Some(-10.0),
            };
            assert_eq!(
                loudness.short_description(),
                "-14.2 LUFS, -1.0 dBTP, 6.3 LRA"
            );
            assert_eq!(loudness.to_string(), loudness.short_description());
        }

        #[test]
        fn absent_facets_are_not_available() {
            assert_eq!(
                LoudnessDescription::default().short_description(),
                "N/A LUFS, N/A dBTP, N/A LRA"
            );
        }

        #[test]
        fn zero_range_is_not_available() {
            let loudness = LoudnessDescription {
                loudness_value: Some(-23.0),
                loudness_range: Some(0.0),
                max_true_peak_level: Some(0.0),
                ..Default::default()
            };
            assert_eq!(
                loudness.short_description(),
                "-23.0 LUFS, 0.0 dBTP, N/A LRA"
            );
        }
    }

    mod ordering_tests {
        use super::*;

        #[test]
        fn orders_by_integrated_loudness() {
            let quiet = integrated(-23.0);
            let loud = integrated(-9.0);
            assert!(quiet.is_quieter_than(&loud));
            assert!(loud.is_louder_than(&quiet));
            assert_eq!(quiet.loudness_cmp(&loud), Some(Ordering::Less));
        }

        #[test]
        fn ignores_other_facets() {
            let a = LoudnessDescription {
                loudness_value: Some(-14.0),
                max_true_peak_level: Some(-6.0),
                ..Default::default()
            };
            let b = LoudnessDescription {
                loudness_value: Some(-14.0),
                max_true_peak_level: Some(-1.0),
                ..Default::default()
            };
            assert_eq!(a.loudness_cmp(&b), Some(Ordering::Equal));
            assert!(!a.is_quieter_than(&b));
            assert!(!b.is_quieter_than(&a));
        }

        #[test]
        fn missing_loudness_is_incomparable() {
            let known = integrated(-14.0);
            let unknown = LoudnessDescription {
                loudness_range: Some(5.0),
                ..Default::default()
            };
            assert_eq!(known.loudness_cmp(&unknown), None);
            assert!(!known.is_quieter_than(&unknown));
            assert!(!known.is_louder_than(&unknown));
            assert!(!unknown.is_quieter_than(&known));
            assert!(!unknown.is_louder_than(&known));
        }
    }

    mod average_tests {
        use super::*;

        #[test]
        fn empty_input_is_all_absent() {
            let average = LoudnessDescription::average_loudness(&[]);
            assert!(average.is_empty());
        }

        #[test]
        fn averages_present_values_only() {
            let average = LoudnessDescription::average_loudness(&[
                integrated(-10.0),
                LoudnessDescription::default(),
            ]);
            assert_eq!(average.loudness_value, Some(-10.0));
            assert_eq!(average.loudness_range, None);
        }

        #[test]
        fn excludes_infinite_integrated_loudness() {
            let average = LoudnessDescription::average_loudness(&[
                integrated(-12.0),
                integrated(f64::NEG_INFINITY),
                integrated(-16.0),
            ]);
            assert_eq!(average.loudness_value, Some(-14.0));

            let silent = LoudnessDescription::average_loudness(&[integrated(f64::NEG_INFINITY)]);
            assert_eq!(silent.loudness_value, None);
        }

        #[test]
        fn infinite_filter_applies_to_integrated_loudness_only() {
            let average = LoudnessDescription::average_loudness(&[LoudnessDescription {
                max_momentary_loudness: Some(f64::NEG_INFINITY),
                ..Default::default()
            }]);
            assert_eq!(average.max_momentary_loudness, Some(f64::NEG_INFINITY));
        }

        #[test]
        fn facets_are_averaged_independently() {
            let average = LoudnessDescription::average_loudness(&[
                LoudnessDescription {
                    loudness_value: Some(-10.0),
                    loudness_range: Some(4.0),
                    max_true_peak_level: Some(-1.0),
                    ..Default::default()
                },
                LoudnessDescription {
                    loudness_range: Some(8.0),
                    max_short_term_loudness: Some(-9.0),
                    ..Default::default()
                },
                LoudnessDescription {
                    loudness_value: Some(-20.0),
                    max_true_peak_level: Some(-3.0),
                    max_momentary_loudness: Some(-7.5),
                    ..Default::default()
                },
            ]);

            assert_eq!(
                average,
                LoudnessDescription {
                    loudness_value: Some(-15.0),
                    loudness_range: Some(6.0),
                    max_true_peak_level: Some(-2.0),
                    max_momentary_loudness: Some(-7.5),
                    max_short_term_loudness: Some(-9.0),
                }
            );
        }
    }

    mod encoding_tests {
        use super::*;

        #[test]
        fn omits_absent_facets() {
            let json = serde_json::to_string(&integrated(-14.0)).unwrap();
            assert_eq!(json, r#"{"loudnessValue":-14.0}"#);

            let json = serde_json::to_string(&LoudnessDescription::default()).unwrap();
            assert_eq!(json, "{}");
        }

        #[test]
        fn single_facet_survives_encoding() {
            let original = integrated(-14.0);
            let json = serde_json::to_string(&original).unwrap();
            let decoded: LoudnessDescription = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded, original);
        }

        #[test]
        fn uses_camel_case_keys() {
            let loudness = LoudnessDescription {
                loudness_value: Some(-14.0),
                loudness_range: Some(6.0),
                max_true_peak_level: Some(-1.0),
                max_momentary_loudness: Some(-8.0),
                max_short_term_loudness: Some(-10.0),
            };
            let value = serde_json::to_value(loudness).unwrap();
            let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
            keys.sort();
            assert_eq!(
                keys,
                vec![
                    "loudnessRange",
                    "loudnessValue",
                    "maxMomentaryLoudness",
                    "maxShortTermLoudness",
                    "maxTruePeakLevel",
                ]
            );
        }

        #[test]
        fn malformed_facet_is_dropped() {
            let json = r#"{
                "loudnessValue": "loud",
                "loudnessRange": 7.5,
                "maxTruePeakLevel": null,
                "maxShortTermLoudness": [1, 2],
                "maxMomentaryLoudness": -6
            }"#;
            let decoded: LoudnessDescription = serde_json::from_str(json).unwrap();
            assert_eq!(
                decoded,
                LoudnessDescription {
                    loudness_range: Some(7.5),
                    max_momentary_loudness: Some(-6.0),
                    ..Default::default()
                }
            );
        }

        #[test]
        fn non_finite_facets_are_omitted() {
            let loudness = LoudnessDescription {
                loudness_value: Some(f64::NEG_INFINITY),
                loudness_range: Some(6.0),
                max_true_peak_level: Some(f32::NAN),
                ..Default::default()
            };
            let json = serde_json::to_string(&loudness).unwrap();
            assert_eq!(json, r#"{"loudnessRange":6.0}"#);

            let decoded: LoudnessDescription = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded.loudness_value, None);
            assert_eq!(decoded.loudness_range, Some(6.0));
        }

        #[test]
        fn true_peak_outside_f32_range_is_dropped() {
            let json = r#"{"maxTruePeakLevel": 1e300, "loudnessValue": -14.0}"#;
            let decoded: LoudnessDescription = serde_json::from_str(json).unwrap();
            assert_eq!(decoded, integrated(-14.0));

            let decoded: LoudnessDescription =
                serde_json::from_str(r#"{"maxTruePeakLevel": -0.5}"#).unwrap();
            assert_eq!(decoded.max_true_peak_level, Some(-0.5));
        }

        #[test]
        fn repeated_key_keeps_last_value() {
            let json = r#"{"loudnessValue": -20.0, "loudnessRange": 3.0, "loudnessValue": -12.5}"#;
            let decoded: LoudnessDescription = serde_json::from_str(json).unwrap();
            assert_eq!(decoded.loudness_value, Some(-12.5));
            assert_eq!(decoded.loudness_range, Some(3.0));
        }

        #[test]
        fn rejects_non_object_documents() {
            assert!(serde_json::from_str::<LoudnessDescription>("[-14.0]").is_err());
            assert!(serde_json::from_str::<LoudnessDescription>("-14.0").is_err());
        }

        #[test]
        fn ignores_unknown_keys() {
            let json = r#"{"loudnessValue": -9.5, "version": 2}"#;
            let decoded: LoudnessDescription = serde_json::from_str(json).unwrap();
            assert_eq!(decoded, integrated(-9.5));
        }
    }
}

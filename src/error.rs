use thiserror::Error;

/// Fatal construction errors.
///
/// There is no recoverable class: any variant means the physical description
/// is broken and must be fixed at the configuration source. Every variant
/// carries the subdetector name and the quantity that failed validation.
#[derive(Debug, Error)]
pub enum CaloError {
    /// A referenced configuration constant is absent or has the wrong type.
    #[error("subdetector {detector}: configuration constant `{name}` is missing or not a {expected}")]
    Configuration {
        detector: String,
        name: String,
        expected: &'static str,
    },

    /// A computed dimension came out non-positive (envelope or slice stacking).
    #[error("subdetector {detector}: {what} = {value} must be positive; check the geometry constants")]
    GeometricInconsistency {
        detector: String,
        what: String,
        value: f64,
    },

    /// No slice in an absorber-bearing layer carries the absorber role.
    #[error("subdetector {detector}: no absorber-role slice in layer {layer}; check the stave radiator material")]
    MaterialMismatch { detector: String, layer: u32 },
}

impl CaloError {
    pub fn missing(detector: &str, name: &str, expected: &'static str) -> Self {
        Self::Configuration {
            detector: detector.to_string(),
            name: name.to_string(),
            expected,
        }
    }

    pub fn not_physical(detector: &str, what: &str, value: f64) -> Self {
        Self::GeometricInconsistency {
            detector: detector.to_string(),
            what: what.to_string(),
            value,
        }
    }
}

use crate::error::CaloError;
use std::collections::HashMap;

/// A named physical-design constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param {
    Real(f64),
    Int(i64),
}

/// Flat table of named constants for one subdetector.
///
/// This is the raw, stringly form produced by the external configuration
/// loader. It is resolved into a strongly-typed config exactly once, at the
/// construction boundary; a name referenced there but absent here is a fatal
/// configuration error.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    detector: String,
    values: HashMap<String, Param>,
}

impl ParameterSet {
    pub fn new(detector: &str) -> Self {
        Self {
            detector: detector.to_string(),
            values: HashMap::new(),
        }
    }

    pub fn detector(&self) -> &str {
        &self.detector
    }

    pub fn set_real(mut self, name: &str, value: f64) -> Self {
        self.values.insert(name.to_string(), Param::Real(value));
        self
    }

    pub fn set_int(mut self, name: &str, value: i64) -> Self {
        self.values.insert(name.to_string(), Param::Int(value));
        self
    }

    /// Resolves a real constant. Integer values coerce to real.
    pub fn real(&self, name: &str) -> Result<f64, CaloError> {
        match self.values.get(name) {
            Some(Param::Real(v)) => Ok(*v),
            Some(Param::Int(v)) => Ok(*v as f64),
            None => Err(CaloError::missing(&self.detector, name, "real")),
        }
    }

    /// Resolves an integer constant. Real values do not coerce.
    pub fn int(&self, name: &str) -> Result<i64, CaloError> {
        match self.values.get(name) {
            Some(Param::Int(v)) => Ok(*v),
            _ => Err(CaloError::missing(&self.detector, name, "integer")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let params = ParameterSet::new("test")
            .set_real("inner_radius", 1800.0)
            .set_int("tower_count", 4);
        assert_eq!(params.real("inner_radius").unwrap(), 1800.0);
        assert_eq!(params.int("tower_count").unwrap(), 4);
        // Integers coerce to reals, not the other way around.
        assert_eq!(params.real("tower_count").unwrap(), 4.0);
        assert!(params.int("inner_radius").is_err());
    }

    #[test]
    fn test_missing_constant_is_fatal() {
        let params = ParameterSet::new("test");
        let err = params.real("no_such_constant").unwrap_err();
        match err {
            CaloError::Configuration { detector, name, .. } => {
                assert_eq!(detector, "test");
                assert_eq!(name, "no_such_constant");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

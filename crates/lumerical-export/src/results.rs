//! S-parameter results as stored on disk

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::session::RawSParameters;

/// Wavelength (nm) and, per S-parameter `Sij`, the unwrapped phase `Sija`
/// and magnitude `Sijm`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SParameterResults {
    pub wavelength_nm: Vec<f64>,
    #[serde(flatten)]
    pub parameters: BTreeMap<String, Vec<f64>>,
}

impl SParameterResults {
    pub fn from_raw(raw: &RawSParameters) -> Self {
        let mut parameters = BTreeMap::new();
        for (key, samples) in &raw.parameters {
            let phase: Vec<f64> = samples.iter().map(|s| s.arg()).collect();
            parameters.insert(format!("{}a", key), unwrap_phase(&phase));
            parameters.insert(format!("{}m", key), samples.iter().map(|s| s.norm()).collect());
        }
        Self {
            wavelength_nm: raw.wavelength.iter().map(|w| w * 1e9).collect(),
            parameters,
        }
    }

    /// S-parameter names (`S11`, `S21`, ...)
    pub fn keys(&self) -> Vec<&str> {
        self.parameters
            .keys()
            .filter_map(|k| k.strip_suffix('m'))
            .collect()
    }

    pub fn magnitude(&self, key: &str) -> Option<&[f64]> {
        self.parameters.get(&format!("{}m", key)).map(Vec::as_slice)
    }

    pub fn phase(&self, key: &str) -> Option<&[f64]> {
        self.parameters.get(&format!("{}a", key)).map(Vec::as_slice)
    }

    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let text = fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ExportError::Results {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        let text = serde_json::to_string(self).map_err(|source| ExportError::Results {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Remove 2π jumps between consecutive samples. Matches `numpy.unwrap`.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let Some(&first) = phase.first() else {
        return out;
    };
    out.push(first);

    let mut correction = 0.0;
    for pair in phase.windows(2) {
        let dd = pair[1] - pair[0];
        let mut ddmod = (dd + PI).rem_euclid(2.0 * PI) - PI;
        if ddmod == -PI && dd > 0.0 {
            ddmod = PI;
        }
        if dd.abs() >= PI {
            correction += ddmod - dd;
        }
        out.push(pair[1] + correction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unwrap_removes_jumps() {
        let wrapped = [3.0, -3.0, -2.5];
        let unwrapped = unwrap_phase(&wrapped);
        assert_eq!(unwrapped[0], 3.0);
        assert!((unwrapped[1] - (-3.0 + 2.0 * PI)).abs() < 1e-12);
        assert!((unwrapped[2] - (-2.5 + 2.0 * PI)).abs() < 1e-12);
    }

    #[test]
    fn test_unwrap_linear_phase() {
        let truth: Vec<f64> = (0..50).map(|i| -0.4 * i as f64).collect();
        let wrapped: Vec<f64> = truth.iter().map(|p| Complex64::from_polar(1.0, *p).arg()).collect();
        for (got, want) in unwrap_phase(&wrapped).iter().zip(&truth) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }

    #[test]
    fn test_unwrap_small_steps_untouched() {
        let phase = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(unwrap_phase(&phase), phase.to_vec());
        assert!(unwrap_phase(&[]).is_empty());
    }

    #[test]
    fn test_from_raw_keys() {
        let raw = RawSParameters {
            wavelength: vec![1.55e-6, 1.56e-6],
            parameters: BTreeMap::from([
                ("S11".to_string(), vec![Complex64::new(0.1, 0.0); 2]),
                ("S21".to_string(), vec![Complex64::new(0.0, 0.9); 2]),
            ]),
        };
        let results = SParameterResults::from_raw(&raw);
        assert_eq!(results.keys(), vec!["S11", "S21"]);
        assert!((results.wavelength_nm[0] - 1550.0).abs() < 1e-9);
        assert!((results.magnitude("S21").unwrap()[0] - 0.9).abs() < 1e-12);
        assert!((results.phase("S21").unwrap()[1] - PI / 2.0).abs() < 1e-12);

        let json = serde_json::to_value(&results).unwrap();
        let mut keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["S11a", "S11m", "S21a", "S21m", "wavelength_nm"]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        let results = SParameterResults {
            wavelength_nm: vec![1550.0000000000002, 1560.1],
            parameters: BTreeMap::from([("S21m".to_string(), vec![0.1 + 0.2, 1.0 / 3.0])]),
        };
        results.save(&path).unwrap();
        assert_eq!(SParameterResults::load(&path).unwrap(), results);
    }
}

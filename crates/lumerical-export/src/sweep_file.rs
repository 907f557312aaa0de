//! Reader for exported S-parameter sweep files (INTERCONNECT `.dat` format)
//!
//! ```text
//! ["o1","LEFT"]
//! ["o2","RIGHT"]
//! ("o2","mode 1",1,"o1",1,"transmission")
//! (500,3)
//! 1.873702e+14 0.97 -1.2301
//! ...
//! ```
//!
//! Port lines give the port order. Each block holds one output/input pair as
//! rows of frequency (Hz), magnitude and phase (rad). Blocks become `Sij`
//! with `i` the 1-based output port and `j` the input port.

use std::fs;
use std::path::Path;

use num_complex::Complex64;

use crate::error::SessionError;
use crate::session::RawSParameters;

const SPEED_OF_LIGHT: f64 = 299_792_458.0;
const FREQUENCY_RTOL: f64 = 1e-9;

pub fn read_sweep_file(path: &Path) -> Result<RawSParameters, SessionError> {
    let text = fs::read_to_string(path).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_sweep(&text).map_err(|(line, message)| SessionError::SweepFormat {
        path: path.to_path_buf(),
        line,
        message,
    })
}

type ParseResult<T> = Result<T, (usize, String)>;

/// Split a `[...]` or `(...)` line into its comma separated fields, unquoted.
fn fields(line: &str) -> Vec<String> {
    line[1..line.len() - 1]
        .split(',')
        .map(|f| f.trim().trim_matches('"').to_string())
        .collect()
}

/// Every block must share one frequency grid, up to float formatting.
fn same_frequency(a: f64, b: f64) -> bool {
    (a - b).abs() <= FREQUENCY_RTOL * a.abs().max(b.abs())
}

pub fn parse_sweep(text: &str) -> ParseResult<RawSParameters> {
    let mut ports: Vec<String> = Vec::new();
    let mut raw = RawSParameters::default();
    let mut frequencies: Option<Vec<f64>> = None;

    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));
    while let Some((n, line)) = lines.next() {
        if line.is_empty() {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            let name = fields(line)
                .into_iter()
                .next()
                .filter(|name| !name.is_empty())
                .ok_or((n, "empty port line".to_string()))?;
            ports.push(name);
            continue;
        }
        if !(line.len() > 2 && line.starts_with('(') && line.ends_with(')')) {
            return Err((n, format!("unexpected line `{}`", line)));
        }

        let header = fields(line);
        if header.len() != 6 {
            return Err((n, format!("expected a 6 field block header, got `{}`", line)));
        }
        let index_of = |name: &str| {
            ports
                .iter()
                .position(|p| p == name)
                .map(|i| i + 1)
                .ok_or((n, format!("port `{}` not in {:?}", name, ports)))
        };
        let key = format!("S{}{}", index_of(&header[0])?, index_of(&header[3])?);

        let (n_shape, shape) = lines.next().ok_or((n, "missing block shape".to_string()))?;
        let rows: usize = Some(shape)
            .filter(|s| s.len() > 2 && s.starts_with('(') && s.ends_with(')'))
            .and_then(|s| fields(s).first().and_then(|r| r.parse().ok()))
            .ok_or((n_shape, format!("invalid block shape `{}`", shape)))?;

        let mut freq = Vec::new();
        let mut samples = Vec::new();
        for _ in 0..rows {
            let (n_row, row) = lines
                .next()
                .ok_or((n_shape, format!("block {} ended early", key)))?;
            let values: Vec<f64> = row
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .map_err(|e| (n_row, format!("{}", e)))?;
            let [f, magnitude, phase] = values[..] else {
                return Err((n_row, format!("expected 3 columns, got {}", values.len())));
            };
            freq.push(f);
            samples.push(Complex64::from_polar(magnitude, phase));
        }

        match &frequencies {
            Some(existing) if existing.len() != freq.len() => {
                return Err((n, format!("block {} has {} rows, expected {}", key, freq.len(), existing.len())));
            }
            Some(existing) => {
                if let Some(i) = existing.iter().zip(&freq).position(|(a, b)| !same_frequency(*a, *b)) {
                    return Err((
                        n,
                        format!("block {} row {} is at {} Hz, expected {} Hz", key, i + 1, freq[i], existing[i]),
                    ));
                }
            }
            None => frequencies = Some(freq),
        }
        raw.parameters.insert(key, samples);
    }

    raw.wavelength = frequencies
        .unwrap_or_default()
        .into_iter()
        .map(|f| SPEED_OF_LIGHT / f)
        .collect();
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_PORT: &str = r#"["o1","LEFT"]
["o2","RIGHT"]
("o1","mode 1",1,"o1",1,"transmission")
(2,3)
1.8737028625e+14 0.1 0.0
2.0819e+14 0.2 0.5
("o2","mode 1",1,"o1",1,"transmission")
(2,3)
1.8737028625e+14 0.9 -1.0
2.0819e+14 0.8 -2.0
"#;

    #[test]
    fn test_parse_two_port() {
        let raw = parse_sweep(TWO_PORT).unwrap();
        assert_eq!(raw.parameters.keys().collect::<Vec<_>>(), vec!["S11", "S21"]);
        assert_eq!(raw.wavelength.len(), 2);
        assert!((raw.wavelength[0] - 1.6e-6).abs() < 1e-12);

        let s21 = &raw.parameters["S21"];
        assert!((s21[1].norm() - 0.8).abs() < 1e-12);
        assert!((s21[1].arg() + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_port_in_block() {
        let text = "[\"o1\",\"LEFT\"]\n(\"o3\",\"mode 1\",1,\"o1\",1,\"transmission\")\n(0,3)\n";
        let (line, message) = parse_sweep(text).unwrap_err();
        assert_eq!(line, 2);
        assert!(message.contains("o3"));
    }

    #[test]
    fn test_truncated_block() {
        let text = "[\"o1\",\"LEFT\"]\n(\"o1\",\"mode 1\",1,\"o1\",1,\"transmission\")\n(3,3)\n1 2 3\n";
        let (_, message) = parse_sweep(text).unwrap_err();
        assert!(message.contains("ended early"));
    }

    #[test]
    fn test_huge_row_count_is_a_format_error() {
        let text = "[\"o1\",\"LEFT\"]\n(\"o1\",\"mode 1\",1,\"o1\",1,\"transmission\")\n(18446744073709551615,3)\n1 2 3\n";
        let (line, message) = parse_sweep(text).unwrap_err();
        assert_eq!(line, 3);
        assert!(message.contains("ended early"));
    }

    #[test]
    fn test_blocks_on_different_frequency_grids() {
        let text = TWO_PORT.replacen("2.0819e+14 0.8", "2.1e+14 0.8", 1);
        let (line, message) = parse_sweep(&text).unwrap_err();
        assert_eq!(line, 7);
        assert!(message.contains("S21 row 2"), "{}", message);
    }

    #[test]
    fn test_frequency_grid_tolerates_formatting() {
        let text = TWO_PORT.replacen("2.0819e+14 0.8", "208190000000000.00001 0.8", 1);
        let raw = parse_sweep(&text).unwrap();
        assert_eq!(raw.parameters.len(), 2);
    }

    #[test]
    fn test_bad_row() {
        let text = "[\"o1\",\"LEFT\"]\n(\"o1\",\"mode 1\",1,\"o1\",1,\"transmission\")\n(1,3)\n1 2\n";
        let (line, message) = parse_sweep(text).unwrap_err();
        assert_eq!(line, 4);
        assert!(message.contains("3 columns"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_sweep_file(&dir.path().join("missing.dat")).unwrap_err();
        assert!(matches!(err, SessionError::Io { .. }));
    }
}

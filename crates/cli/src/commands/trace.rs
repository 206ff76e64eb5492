//! Latency trace files: one sample in milliseconds per line

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: '{value}' is not a latency in milliseconds")]
    InvalidValue { line: usize, value: String },
}

/// Read a trace file
pub fn read_trace(path: &Path) -> Result<Vec<f64>, TraceError> {
    let content = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_trace(&content)
}

/// Parse trace text, skipping blank lines and `#` comments
pub fn parse_trace(content: &str) -> Result<Vec<f64>, TraceError> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, value)| {
            value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| TraceError::InvalidValue {
                    line,
                    value: value.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace() {
        let trace = "# latency capture\n12.0\n\n  13.5 \n2000\n";
        assert_eq!(parse_trace(trace).unwrap(), vec![12.0, 13.5, 2000.0]);
    }

    #[test]
    fn test_parse_trace_reports_line() {
        let err = parse_trace("12.0\nfast\n").unwrap_err();
        assert!(matches!(err, TraceError::InvalidValue { line: 2, .. }));
    }

    #[test]
    fn test_parse_trace_rejects_negative_and_nan() {
        assert!(parse_trace("-1.0\n").is_err());
        assert!(parse_trace("NaN\n").is_err());
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_trace(Path::new("/nonexistent/trace.txt")).unwrap_err();
        assert!(matches!(err, TraceError::Io { .. }));
    }
}

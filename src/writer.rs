use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::warn;

use crate::{errors::AdvisorError, service::Advice};

/// One JSON line per advice. A batch entry that failed is written as an error object.
pub fn write_recommendations(
    file: &Path,
    outcomes: &[Result<Advice, AdvisorError>],
) -> Result<(), AdvisorError> {
    let output_file = File::create(file).map_err(|e| AdvisorError::WriterError { source: e })?;
    let mut output_writer = BufWriter::new(output_file);
    for (line, outcome) in outcomes.iter().enumerate() {
        let value = match outcome {
            Ok(advice) => serde_json::to_value(advice),
            Err(e) => Ok(serde_json::json!({ "status": "Error", "message": e.to_string() })),
        };
        match value {
            Ok(value) => writeln!(output_writer, "{}", value)
                .map_err(|e| AdvisorError::WriterError { source: e })?,
            Err(e) => warn!("Could not serialize outcome {}: {}", line + 1, e),
        }
    }
    output_writer
        .flush()
        .map_err(|e| AdvisorError::WriterError { source: e })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::Recommendation;
    use crate::scenario::SystemBase;
    use crate::scenario::tests::inverter_query;
    use tempfile::TempDir;

    #[test]
    fn test_one_line_per_outcome() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        let outcomes = vec![
            Ok(Advice {
                query: inverter_query(),
                base: SystemBase::HighVoltage,
                recommendation: Recommendation::NoScenario,
                scenario_description: None,
            }),
            Err(AdvisorError::InconsistentQuery {
                issues: "bad".to_string(),
            }),
        ];

        write_recommendations(&path, &outcomes).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["recommendation"]["status"], "NoScenario");
        assert_eq!(first["base"], "HighVoltage");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["status"], "Error");
    }
}

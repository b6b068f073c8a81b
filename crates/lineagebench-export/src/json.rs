use serde::Serialize;

use crate::report::{SourceReport, StatementArtifact};
use crate::results::ResultRecord;
use crate::ExportError;

fn to_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<String, ExportError> {
    if compact {
        serde_json::to_string(value).map_err(|err| ExportError::Serialization(err.to_string()))
    } else {
        serde_json::to_string_pretty(value)
            .map_err(|err| ExportError::Serialization(err.to_string()))
    }
}

pub fn export_report_json(report: &SourceReport, compact: bool) -> Result<String, ExportError> {
    to_json(report, compact)
}

pub fn export_artifact_json(artifact: &StatementArtifact) -> Result<String, ExportError> {
    to_json(artifact, false)
}

pub fn export_results_json(records: &[ResultRecord], compact: bool) -> Result<String, ExportError> {
    to_json(records, compact)
}

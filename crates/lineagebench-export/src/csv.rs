use csv::WriterBuilder;

use crate::results::ResultRecord;
use crate::ExportError;

const RESULT_HEADERS: [&str; 26] = [
    "query_id",
    "query_file",
    "statement_index",
    "statement_type",
    "dialect",
    "success",
    "confidence",
    "parse_time_ms",
    "in_tables_count",
    "out_tables_count",
    "column_lineage_count",
    "error_message",
    "table_error",
    "cte_count",
    "max_cte_depth",
    "subquery_count",
    "join_count",
    "union_count",
    "window_function_count",
    "line_count",
    "char_count",
    "validation_status",
    "tables_precision",
    "tables_recall",
    "columns_precision",
    "columns_recall",
];

/// Writes one CSV row per result. Validation metrics are `0.0000` for
/// statements without an expected record.
pub fn export_results_csv(records: &[ResultRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    writer
        .write_record(RESULT_HEADERS)
        .map_err(|err| ExportError::Csv(err.to_string()))?;

    for record in records {
        let validation = record.validation_details.clone().unwrap_or_default();
        let complexity = &record.complexity;
        writer
            .write_record([
                record.query_id.clone(),
                record.query_file.clone(),
                record.statement_index.to_string(),
                record.statement_type.clone(),
                record.dialect.clone(),
                record.success.to_string(),
                format!("{:.4}", record.confidence),
                format!("{:.3}", record.parse_time_ms),
                record.in_tables.len().to_string(),
                record.out_tables.len().to_string(),
                record.column_lineage_count.to_string(),
                record.error_message.clone().unwrap_or_default(),
                record.table_error.to_string(),
                complexity.cte_count.to_string(),
                complexity.max_cte_depth.to_string(),
                complexity.subquery_count.to_string(),
                complexity.join_count.to_string(),
                complexity.union_count.to_string(),
                complexity.window_function_count.to_string(),
                complexity.line_count.to_string(),
                complexity.char_count.to_string(),
                record.validation_status.to_string(),
                format!("{:.4}", validation.tables_precision),
                format!("{:.4}", validation.tables_recall),
                format!("{:.4}", validation.columns_precision),
                format!("{:.4}", validation.columns_recall),
            ])
            .map_err(|err| ExportError::Csv(err.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.to_string()))
}

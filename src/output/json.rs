use crate::core::StorageReading;

/// Readings as a JSON array in run order. Absent values are `null`.
pub(crate) fn output_summary_json(results: &[StorageReading]) -> String {
    let output: Vec<serde_json::Value> = results
        .iter()
        .map(|reading| {
            serde_json::json!({
                "site": reading.site,
                "group": reading.group,
                "internal_free": reading.internal_free,
                "external_free": reading.external_free,
            })
        })
        .collect();
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string())
}

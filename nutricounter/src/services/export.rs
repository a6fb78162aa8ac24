//! Overview export
//!
//! Flattens the daily overview — BMI, macro totals versus goals, and the
//! logged-food list — into tabular rows and renders them as CSV for
//! download by the surrounding UI.

use std::path::Path;

use serde::Serialize;
use tokio::fs;

use crate::aggregate::{self, NutrientTotals};
use crate::error::Result;
use crate::store::models::{Goals, NutrientRecord};

/// Column headers of the export, in order.
pub const EXPORT_HEADERS: [&str; 4] = ["Category", "Item", "Value", "Unit/Target"];

/// One row of the flat overview table. Spacer rows leave every column
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub category: String,
    pub item: String,
    pub value: String,
    pub unit: String,
}

impl ExportRow {
    fn new(category: &str, item: &str, value: String, unit: String) -> Self {
        Self {
            category: category.to_string(),
            item: item.to_string(),
            value,
            unit,
        }
    }

    fn blank() -> Self {
        Self::default()
    }
}

/// Build the overview rows: one BMI row, the daily totals against their
/// goals, then every logged food (or a placeholder when the log is
/// empty).
pub fn overview_rows(
    bmi: Option<f64>,
    totals: &NutrientTotals,
    goals: &Goals,
    log: &[NutrientRecord],
) -> Vec<ExportRow> {
    let mut rows = Vec::new();

    let bmi_value = bmi
        .map(|bmi| format!("{:.1}", bmi))
        .unwrap_or_else(|| "N/A".to_string());
    rows.push(ExportRow::new("User Profile", "BMI", bmi_value, String::new()));
    rows.push(ExportRow::blank());

    rows.push(ExportRow::new(
        "Daily Totals",
        "Nutrient",
        "Consumed".to_string(),
        "Goal".to_string(),
    ));
    for stat in aggregate::overview(totals, goals) {
        rows.push(ExportRow::new(
            "Daily Totals",
            stat.name,
            format!("{}", stat.current.round() as i64),
            format!("{} {}", stat.target, stat.unit),
        ));
    }
    rows.push(ExportRow::blank());

    rows.push(ExportRow::new(
        "Logged Foods",
        "Food Name",
        "Calories".to_string(),
        "Portion".to_string(),
    ));
    if log.is_empty() {
        rows.push(ExportRow::new(
            "Logged Foods",
            "No foods logged yet.",
            String::new(),
            String::new(),
        ));
    } else {
        for food in log {
            rows.push(ExportRow::new(
                "Logged Foods",
                &food.food_name,
                format!("{}", food.calories),
                food.portion_size.clone(),
            ));
        }
    }

    rows
}

/// Render rows as CSV, header line included.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut out = String::new();
    out.push_str(&EXPORT_HEADERS.join(","));
    out.push('\n');

    for row in rows {
        let fields = [&row.category, &row.item, &row.value, &row.unit];
        let line: Vec<String> = fields.iter().map(|field| escape_csv(field)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    out
}

/// Write the rendered CSV to disk.
pub async fn write_csv_file(path: &Path, rows: &[ExportRow]) -> Result<()> {
    fs::write(path, to_csv(rows)).await?;
    tracing::info!("Exported overview to {:?}", path);
    Ok(())
}

/// Quote a field when it contains a comma, quote or newline; quotes are
/// doubled inside quoted fields.
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

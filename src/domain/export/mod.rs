//! Report export domain
//!
//! Flat transaction rows and the [`Exporter`] trait implemented by each
//! file format.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::domain::category::{Category, CategoryId};
use crate::domain::transaction::Transaction;
use crate::domain::DomainError;

/// Column headers shared by every export format, in order
pub const EXPORT_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "type",
    "category_id",
    "category_name",
    "amount",
    "date",
    "user_id",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub const SUPPORTED: [&'static str; 2] = ["csv", "xlsx"];
}

impl FromStr for ExportFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(DomainError::validation(format!(
                "Unsupported export format: {}. Supported: {}",
                other,
                Self::SUPPORTED.join(", ")
            ))),
        }
    }
}

/// One exported transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category_id: i64,
    pub category_name: String,
    pub amount: f64,
    pub date: String,
    pub user_id: i64,
}

impl ExportRow {
    pub fn from_transaction(tx: &Transaction, categories: &HashMap<CategoryId, Category>) -> Self {
        Self {
            id: tx.id().value(),
            name: tx.name().to_string(),
            kind: tx.kind().to_string(),
            category_id: tx.category_id().value(),
            category_name: categories
                .get(&tx.category_id())
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            amount: tx.amount(),
            date: tx.date().to_rfc3339_opts(SecondsFormat::Secs, true),
            user_id: tx.user_id().value(),
        }
    }

    /// Cell values in [`EXPORT_COLUMNS`] order
    pub fn cells(&self) -> [String; 8] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.kind.clone(),
            self.category_id.to_string(),
            self.category_name.clone(),
            self.amount.to_string(),
            self.date.clone(),
            self.user_id.to_string(),
        ]
    }
}

/// Serializes rows into a downloadable document
pub trait Exporter: Send + Sync {
    fn media_type(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    /// Implementations call [`ensure_rows`] first
    fn export(&self, rows: &[ExportRow]) -> Result<Vec<u8>, DomainError>;

    fn file_name(&self) -> String {
        format!("report.{}", self.extension())
    }
}

pub fn ensure_rows(rows: &[ExportRow]) -> Result<(), DomainError> {
    if rows.is_empty() {
        return Err(DomainError::validation("No data to export"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::NewCategory;
    use crate::domain::transaction::{NewTransaction, TransactionId, TransactionType};
    use crate::domain::user::UserId;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_format() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);

        let err = "pdf".parse::<ExportFormat>().unwrap_err();
        assert_eq!(
            err.message(),
            "Unsupported export format: pdf. Supported: csv, xlsx"
        );
    }

    #[test]
    fn test_row_from_transaction() {
        let category = Category::from_new(
            CategoryId::new(4),
            NewCategory {
                name: "Food".to_string(),
                description: None,
                kind: TransactionType::Expense,
            },
        );
        let categories = HashMap::from([(category.id(), category)]);
        let tx = Transaction::from_new(
            TransactionId::new(9),
            NewTransaction {
                name: "Lunch".to_string(),
                kind: TransactionType::Expense,
                category_id: CategoryId::new(4),
                amount: 12.5,
                date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
                user_id: UserId::new(2),
                group_id: None,
            },
        );

        let row = ExportRow::from_transaction(&tx, &categories);
        assert_eq!(row.category_name, "Food");
        assert_eq!(row.kind, "expense");
        assert_eq!(row.date, "2024-05-01T12:30:00Z");
        assert_eq!(row.cells()[5], "12.5");
    }

    #[test]
    fn test_ensure_rows() {
        let err = ensure_rows(&[]).unwrap_err();
        assert_eq!(err.message(), "No data to export");
    }
}

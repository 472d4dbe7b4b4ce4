//! Transaction entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::category::CategoryId;
use crate::domain::group::GroupId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(i64);

impl TransactionId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TransactionId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of money flow; also classifies categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(DomainError::validation(format!(
                "Invalid transaction type '{}'. Supported: income, expense",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub name: String,
    pub kind: TransactionType,
    pub category_id: CategoryId,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub user_id: UserId,
    pub group_id: Option<GroupId>,
}

/// A single income or expense entry owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    name: String,
    kind: TransactionType,
    category_id: CategoryId,
    amount: f64,
    date: DateTime<Utc>,
    user_id: UserId,
    group_id: Option<GroupId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn from_new(id: TransactionId, new: NewTransaction) -> Self {
        let now = Utc::now();

        Self {
            id,
            name: new.name,
            kind: new.kind,
            category_id: new.category_id,
            amount: new.amount,
            date: new.date,
            user_id: new.user_id,
            group_id: new.group_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: TransactionId,
        name: String,
        kind: TransactionType,
        category_id: CategoryId,
        amount: f64,
        date: DateTime<Utc>,
        user_id: UserId,
        group_id: Option<GroupId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            category_id,
            amount,
            date,
            user_id,
            group_id,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Signed contribution to a balance: income positive, expense negative
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    // Mutators

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_kind(&mut self, kind: TransactionType) {
        self.kind = kind;
        self.touch();
    }

    pub fn set_category(&mut self, category_id: CategoryId) {
        self.category_id = category_id;
        self.touch();
    }

    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount;
        self.touch();
    }

    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = date;
        self.touch();
    }

    pub fn set_group(&mut self, group_id: Option<GroupId>) {
        self.group_id = group_id;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: TransactionType, amount: f64) -> Transaction {
        Transaction::from_new(
            TransactionId::new(1),
            NewTransaction {
                name: "Coffee".to_string(),
                kind,
                category_id: CategoryId::new(1),
                amount,
                date: Utc::now(),
                user_id: UserId::new(1),
                group_id: None,
            },
        )
    }

    #[test]
    fn test_transaction_type_parse() {
        assert_eq!(
            "income".parse::<TransactionType>().unwrap(),
            TransactionType::Income
        );
        assert_eq!(
            " Expense ".parse::<TransactionType>().unwrap(),
            TransactionType::Expense
        );
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_transaction_type_serde() {
        let json = serde_json::to_string(&TransactionType::Expense).unwrap();
        assert_eq!(json, "\"expense\"");
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(sample(TransactionType::Income, 10.0).signed_amount(), 10.0);
        assert_eq!(sample(TransactionType::Expense, 4.5).signed_amount(), -4.5);
    }

    #[test]
    fn test_mutators_touch_updated_at() {
        let mut tx = sample(TransactionType::Expense, 3.0);
        let before = tx.updated_at();
        std::thread::sleep(std::time::Duration::from_millis(5));
        tx.set_amount(7.25);
        assert_eq!(tx.amount(), 7.25);
        assert!(tx.updated_at() > before);
    }
}

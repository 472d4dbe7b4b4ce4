//! Filtering, ordering and pagination of transaction listings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use super::entity::{Transaction, TransactionType};
use crate::domain::category::CategoryId;
use crate::domain::group::GroupId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Criteria a transaction must satisfy; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub user_id: Option<UserId>,
    pub group_id: Option<GroupId>,
    pub category_id: Option<CategoryId>,
    pub kind: Option<TransactionType>,
    /// Inclusive lower bound on the transaction date
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the transaction date
    pub to: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the transaction date
    pub before: Option<DateTime<Utc>>,
    /// Case-insensitive substring of the name
    pub name_contains: Option<String>,
}

impl TransactionFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn for_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn with_kind(mut self, kind: Option<TransactionType>) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_group(mut self, group_id: Option<GroupId>) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn before(mut self, cutoff: DateTime<Utc>) -> Self {
        self.before = Some(cutoff);
        self
    }

    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.user_id.is_some_and(|id| tx.user_id() != id) {
            return false;
        }
        if self.group_id.is_some_and(|id| tx.group_id() != Some(id)) {
            return false;
        }
        if self.category_id.is_some_and(|id| tx.category_id() != id) {
            return false;
        }
        if self.kind.is_some_and(|kind| tx.kind() != kind) {
            return false;
        }
        if self.from.is_some_and(|from| tx.date() < from) {
            return false;
        }
        if self.to.is_some_and(|to| tx.date() > to) {
            return false;
        }
        if self.before.is_some_and(|cutoff| tx.date() >= cutoff) {
            return false;
        }
        if let Some(needle) = &self.name_contains {
            if !tx.name().to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Name,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Name => "name",
        }
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            "name" => Ok(Self::Name),
            other => Err(DomainError::validation(format!(
                "Invalid sort field '{}'. Supported: date, amount, name",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DomainError::validation(format!(
                "Invalid sort order '{}'. Supported: asc, desc",
                other
            ))),
        }
    }
}

/// A filtered, ordered page of transactions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub filter: TransactionFilter,
    pub sort_by: SortField,
    pub order: SortOrder,
    pub offset: usize,
    /// `None` returns every matching row
    pub limit: Option<usize>,
}

impl TransactionQuery {
    pub fn new(filter: TransactionFilter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn sorted(mut self, sort_by: SortField, order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.order = order;
        self
    }

    pub fn paginate(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// Ordering used by every backend; id breaks ties in the same direction
    pub fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let primary = match self.sort_by {
            SortField::Date => a.date().cmp(&b.date()),
            SortField::Amount => a.amount().total_cmp(&b.amount()),
            SortField::Name => a.name().cmp(b.name()),
        };
        let ordering = primary.then_with(|| a.id().cmp(&b.id()));

        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Filter, sort and paginate an in-memory collection
    pub fn apply<'a, I>(&self, transactions: I) -> Vec<Transaction>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut matching: Vec<Transaction> = transactions
            .into_iter()
            .filter(|tx| self.filter.matches(tx))
            .cloned()
            .collect();

        matching.sort_by(|a, b| self.compare(a, b));

        let page = matching.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => page.take(limit).collect(),
            None => page.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{NewTransaction, TransactionId};
    use chrono::TimeZone;

    fn tx(id: i64, name: &str, amount: f64, day: u32, kind: TransactionType) -> Transaction {
        Transaction::from_new(
            TransactionId::new(id),
            NewTransaction {
                name: name.to_string(),
                kind,
                category_id: CategoryId::new(1),
                amount,
                date: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
                user_id: UserId::new(1),
                group_id: None,
            },
        )
    }

    fn fixtures() -> Vec<Transaction> {
        vec![
            tx(1, "Salary", 3000.0, 1, TransactionType::Income),
            tx(2, "Groceries", 80.0, 5, TransactionType::Expense),
            tx(3, "Coffee beans", 12.5, 5, TransactionType::Expense),
            tx(4, "Bookshop", 25.0, 9, TransactionType::Expense),
        ]
    }

    #[test]
    fn test_default_order_is_date_then_id_desc() {
        let query = TransactionQuery::default();
        let ids: Vec<i64> = query
            .apply(&fixtures())
            .iter()
            .map(|t| t.id().value())
            .collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_sort_by_amount_ascending() {
        let query = TransactionQuery::default().sorted(SortField::Amount, SortOrder::Asc);
        let ids: Vec<i64> = query
            .apply(&fixtures())
            .iter()
            .map(|t| t.id().value())
            .collect();
        assert_eq!(ids, vec![3, 4, 2, 1]);
    }

    #[test]
    fn test_pagination() {
        let query = TransactionQuery::default().paginate(1, 2);
        let ids: Vec<i64> = query
            .apply(&fixtures())
            .iter()
            .map(|t| t.id().value())
            .collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_filter_by_kind_and_range() {
        let filter = TransactionFilter::for_user(UserId::new(1))
            .with_kind(Some(TransactionType::Expense))
            .between(
                Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()),
                Some(Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap()),
            );
        let found = TransactionQuery::new(filter).apply(&fixtures());
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_filter_other_user() {
        let filter = TransactionFilter::for_user(UserId::new(2));
        assert!(TransactionQuery::new(filter).apply(&fixtures()).is_empty());
    }

    #[test]
    fn test_name_search_is_case_insensitive() {
        let filter = TransactionFilter::default().name_contains("COFFEE");
        let found = TransactionQuery::new(filter).apply(&fixtures());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "Coffee beans");
    }

    #[test]
    fn test_before_is_exclusive() {
        let filter =
            TransactionFilter::default().before(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap());
        let found = TransactionQuery::new(filter).apply(&fixtures());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id().value(), 1);
    }

    #[test]
    fn test_parse_sort_options() {
        assert_eq!("Amount".parse::<SortField>().unwrap(), SortField::Amount);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("size".parse::<SortField>().is_err());
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}

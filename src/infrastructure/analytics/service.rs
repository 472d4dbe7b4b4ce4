//! Analytics service
//!
//! Loads the relevant transactions and hands them to the pure report
//! functions in `domain::analytics`.

use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::analytics::{
    self, end_of_day, start_of_day, CategorySummary, DailyStatistics, FinancialSummary,
    Granularity, GroupAnalytics, GroupSummary, MonthlyStatistics, Overview, Period, PeriodSummary,
    TopCategory,
};
use crate::domain::category::{Category, CategoryId, CategoryRepository};
use crate::domain::export::ExportRow;
use crate::domain::group::{Group, GroupId, GroupRepository};
use crate::domain::transaction::{
    Transaction, TransactionFilter, TransactionQuery, TransactionRepository, TransactionType,
};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::group::require_member;

/// Optional filters for the export endpoint
#[derive(Debug, Clone, Default)]
pub struct ExportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<CategoryId>,
    pub group_id: Option<GroupId>,
}

pub struct AnalyticsService {
    transactions: Arc<dyn TransactionRepository>,
    categories: Arc<dyn CategoryRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
}

fn date_filter(
    filter: TransactionFilter,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> TransactionFilter {
    filter.between(start.map(start_of_day), end.map(end_of_day))
}

impl AnalyticsService {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        categories: Arc<dyn CategoryRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            transactions,
            categories,
            groups,
            users,
        }
    }

    /// Every matching transaction, newest first
    async fn fetch(&self, filter: TransactionFilter) -> Result<Vec<Transaction>, DomainError> {
        let transactions = self.transactions.find(&TransactionQuery::new(filter)).await?;
        debug!(count = transactions.len(), "Loaded transactions for report");
        Ok(transactions)
    }

    async fn category_lookup(&self) -> Result<HashMap<CategoryId, Category>, DomainError> {
        Ok(self
            .categories
            .list()
            .await?
            .into_iter()
            .map(|c| (c.id(), c))
            .collect())
    }

    async fn member_lookup(&self, group: &Group) -> Result<HashMap<UserId, User>, DomainError> {
        let mut users = HashMap::with_capacity(group.member_count());
        for id in group.members() {
            if let Some(user) = self.users.get(*id).await? {
                users.insert(*id, user);
            }
        }
        Ok(users)
    }

    async fn period_transactions(
        &self,
        user_id: UserId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(Period, Vec<Transaction>), DomainError> {
        let period = Period::resolve(start, end, Utc::now().date_naive());
        period.validate()?;

        let filter = TransactionFilter::for_user(user_id)
            .between(Some(period.start_instant()), Some(period.end_instant()));
        Ok((period, self.fetch(filter).await?))
    }

    pub async fn overview(
        &self,
        user_id: UserId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Overview, DomainError> {
        let (period, transactions) = self.period_transactions(user_id, start, end).await?;
        Ok(analytics::overview(&transactions, period))
    }

    pub async fn by_category(
        &self,
        user_id: UserId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CategorySummary>, DomainError> {
        let (_, transactions) = self.period_transactions(user_id, start, end).await?;
        let categories = self.category_lookup().await?;
        Ok(analytics::by_category(&transactions, &categories))
    }

    pub async fn by_date(
        &self,
        user_id: UserId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        granularity: Granularity,
    ) -> Result<Vec<PeriodSummary>, DomainError> {
        let (_, transactions) = self.period_transactions(user_id, start, end).await?;
        Ok(analytics::by_period(&transactions, granularity))
    }

    pub async fn financial_summary(
        &self,
        user_id: UserId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<FinancialSummary, DomainError> {
        let filter = date_filter(TransactionFilter::for_user(user_id), start, end);
        let transactions = self.fetch(filter).await?;
        Ok(analytics::financial_summary(&transactions, start, end))
    }

    pub async fn monthly(
        &self,
        user_id: UserId,
        year: i32,
        month: Option<u32>,
    ) -> Result<Vec<MonthlyStatistics>, DomainError> {
        if let Some(month) = month {
            if !(1..=12).contains(&month) {
                return Err(DomainError::validation("Month must be between 1 and 12"));
            }
        }

        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| DomainError::validation(format!("Invalid year: {}", year)))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| DomainError::validation(format!("Invalid year: {}", year)))?;

        let filter = date_filter(TransactionFilter::for_user(user_id), Some(start), Some(end));
        let transactions = self.fetch(filter).await?;
        Ok(analytics::monthly_statistics(&transactions, year, month))
    }

    /// `period_days` limits the window to the last N days; `None` or a
    /// non-positive value covers all time
    pub async fn top_categories(
        &self,
        user_id: UserId,
        kind: TransactionType,
        limit: usize,
        period_days: Option<i64>,
    ) -> Result<Vec<TopCategory>, DomainError> {
        let mut filter = TransactionFilter::for_user(user_id).with_kind(Some(kind));
        if let Some(days) = period_days.filter(|d| *d > 0) {
            let since = Duration::try_days(days)
                .and_then(|window| Utc::now().checked_sub_signed(window))
                .ok_or_else(|| DomainError::validation("Period out of range"))?;
            filter = filter.between(Some(since), None);
        }

        let transactions = self.fetch(filter).await?;
        let categories = self.category_lookup().await?;
        Ok(analytics::top_categories(
            &transactions,
            &categories,
            kind,
            limit,
        ))
    }

    pub async fn daily(
        &self,
        user_id: UserId,
        day: Option<NaiveDate>,
    ) -> Result<DailyStatistics, DomainError> {
        let day = day.unwrap_or_else(|| Utc::now().date_naive());
        let filter = date_filter(TransactionFilter::for_user(user_id), Some(day), Some(day));
        let transactions = self.fetch(filter).await?;
        Ok(analytics::daily_statistics(&transactions, day))
    }

    /// Flat rows of the user's transactions for file export
    pub async fn export_rows(
        &self,
        user_id: UserId,
        filter: ExportFilter,
    ) -> Result<Vec<ExportRow>, DomainError> {
        let query = date_filter(
            TransactionFilter::for_user(user_id)
                .with_category(filter.category_id)
                .with_group(filter.group_id),
            filter.start_date,
            filter.end_date,
        );

        let transactions = self.fetch(query).await?;
        let categories = self.category_lookup().await?;
        Ok(transactions
            .iter()
            .map(|tx| ExportRow::from_transaction(tx, &categories))
            .collect())
    }

    /// Group report; `category` narrows it to one category name (case-insensitive)
    pub async fn group_analytics(
        &self,
        user_id: UserId,
        group_id: GroupId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        category: Option<&str>,
    ) -> Result<GroupAnalytics, DomainError> {
        let group = require_member(self.groups.as_ref(), group_id, user_id).await?;

        let filter = date_filter(TransactionFilter::for_group(group_id), start, end);
        let categories = self.category_lookup().await?;
        let mut transactions = self.fetch(filter).await?;

        if let Some(name) = category.map(str::trim).filter(|n| !n.is_empty()) {
            transactions.retain(|tx| {
                categories
                    .get(&tx.category_id())
                    .is_some_and(|c| c.name().eq_ignore_ascii_case(name))
            });
        }

        let users = self.member_lookup(&group).await?;
        Ok(analytics::group_analytics(
            &group,
            &transactions,
            &categories,
            &users,
            start,
            end,
        ))
    }

    pub async fn group_summary(
        &self,
        user_id: UserId,
        group_id: GroupId,
    ) -> Result<GroupSummary, DomainError> {
        let group = require_member(self.groups.as_ref(), group_id, user_id).await?;
        let transactions = self.fetch(TransactionFilter::for_group(group_id)).await?;
        let users = self.member_lookup(&group).await?;

        Ok(analytics::group_summary(&group, &transactions, &users))
    }
}

//! Analytics domain
//!
//! Reporting periods and the aggregations behind the overview, breakdown,
//! time series and group reports. Everything here is pure and operates on
//! transactions already fetched from a repository.

mod period;
mod report;

pub use period::{end_of_day, start_of_day, Granularity, Period};
pub use report::{
    by_category, by_period, daily_statistics, financial_summary, group_analytics, group_summary,
    monthly_statistics, overview, round1, top_categories, CategoryBreakdown, CategorySummary,
    DailyStatistics, FinancialSummary, GroupAnalytics, GroupSummary, MemberContribution,
    MemberSummary, MonthlyStatistics, Overview, PeriodBounds, PeriodSummary, TopCategory, Totals,
};

//! Aggregations over transaction sets

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::period::{Granularity, Period};
use crate::domain::category::{Category, CategoryId};
use crate::domain::group::{Group, GroupId};
use crate::domain::transaction::{Transaction, TransactionType};
use crate::domain::user::{User, UserId};

const UNCATEGORIZED: &str = "Uncategorized";

/// Income and expense totals of a set of transactions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub count: usize,
}

impl Totals {
    pub fn of<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .fold(Self::default(), |mut acc, tx| {
                acc.add(tx);
                acc
            })
    }

    fn add(&mut self, tx: &Transaction) {
        match tx.kind() {
            TransactionType::Income => self.income += tx.amount(),
            TransactionType::Expense => self.expense += tx.amount(),
        }
        self.count += 1;
    }

    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub balance: f64,
    pub total_income: f64,
    pub total_expense: f64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

pub fn overview(transactions: &[Transaction], period: Period) -> Overview {
    let totals = Totals::of(transactions);

    Overview {
        balance: totals.balance(),
        total_income: totals.income,
        total_expense: totals.expense,
        period_start: period.start,
        period_end: period.end,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_type: TransactionType,
    pub total_amount: f64,
    pub transaction_count: usize,
    /// Share of total expenses in the same set
    pub percentage: f64,
}

/// Per-category totals, largest first
pub fn by_category(
    transactions: &[Transaction],
    categories: &HashMap<CategoryId, Category>,
) -> Vec<CategorySummary> {
    let total_expense = Totals::of(transactions).expense;
    let mut buckets: HashMap<CategoryId, (f64, usize, TransactionType)> = HashMap::new();

    for tx in transactions {
        let entry = buckets
            .entry(tx.category_id())
            .or_insert((0.0, 0, tx.kind()));
        entry.0 += tx.amount();
        entry.1 += 1;
    }

    let mut summaries: Vec<CategorySummary> = buckets
        .into_iter()
        .map(|(id, (total, count, fallback_kind))| {
            let category = categories.get(&id);
            CategorySummary {
                category_id: id,
                category_name: category
                    .map(|c| c.name().to_string())
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                category_type: category.map(Category::kind).unwrap_or(fallback_kind),
                total_amount: total,
                transaction_count: count,
                percentage: percentage(total, total_expense),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total_amount
            .total_cmp(&a.total_amount)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    summaries
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub date: NaiveDate,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Time series of income and expense, oldest bucket first
pub fn by_period(transactions: &[Transaction], granularity: Granularity) -> Vec<PeriodSummary> {
    let mut buckets: BTreeMap<NaiveDate, Totals> = BTreeMap::new();

    for tx in transactions {
        let key = granularity.bucket_start(tx.date().date_naive());
        buckets.entry(key).or_default().add(tx);
    }

    buckets
        .into_iter()
        .map(|(date, totals)| PeriodSummary {
            date,
            income: totals.income,
            expense: totals.expense,
            balance: totals.balance(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBounds {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub transaction_count: usize,
    pub period: PeriodBounds,
}

pub fn financial_summary(
    transactions: &[Transaction],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> FinancialSummary {
    let totals = Totals::of(transactions);

    FinancialSummary {
        total_income: totals.income,
        total_expense: totals.expense,
        balance: totals.balance(),
        transaction_count: totals.count,
        period: PeriodBounds {
            start_date: start,
            end_date: end,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStatistics {
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub transaction_count: usize,
}

/// Months of `year` (optionally a single month) that have transactions
pub fn monthly_statistics(
    transactions: &[Transaction],
    year: i32,
    month: Option<u32>,
) -> Vec<MonthlyStatistics> {
    let mut buckets: BTreeMap<u32, Totals> = BTreeMap::new();

    for tx in transactions {
        let date = tx.date();
        if date.year() != year || month.is_some_and(|m| date.month() != m) {
            continue;
        }
        buckets.entry(date.month()).or_default().add(tx);
    }

    buckets
        .into_iter()
        .map(|(month, totals)| MonthlyStatistics {
            year,
            month,
            income: totals.income,
            expense: totals.expense,
            balance: totals.balance(),
            transaction_count: totals.count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCategory {
    pub category_name: String,
    pub total_amount: f64,
    pub transaction_count: usize,
    pub average_amount: f64,
}

/// Categories with the largest totals for one transaction type
pub fn top_categories(
    transactions: &[Transaction],
    categories: &HashMap<CategoryId, Category>,
    kind: TransactionType,
    limit: usize,
) -> Vec<TopCategory> {
    let mut buckets: HashMap<String, (f64, usize)> = HashMap::new();

    for tx in transactions.iter().filter(|tx| tx.kind() == kind) {
        let name = categories
            .get(&tx.category_id())
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        let entry = buckets.entry(name).or_insert((0.0, 0));
        entry.0 += tx.amount();
        entry.1 += 1;
    }

    let mut top: Vec<TopCategory> = buckets
        .into_iter()
        .map(|(name, (total, count))| TopCategory {
            category_name: name,
            total_amount: total,
            transaction_count: count,
            average_amount: if count > 0 { total / count as f64 } else { 0.0 },
        })
        .collect();

    top.sort_by(|a, b| {
        b.total_amount
            .total_cmp(&a.total_amount)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    top.truncate(limit);
    top
}

#[derive(Debug, Clone)]
pub struct DailyStatistics {
    pub date: NaiveDate,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub transaction_count: usize,
    pub transactions: Vec<Transaction>,
}

pub fn daily_statistics(transactions: &[Transaction], day: NaiveDate) -> DailyStatistics {
    let of_day: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| tx.date().date_naive() == day)
        .cloned()
        .collect();
    let totals = Totals::of(&of_day);

    DailyStatistics {
        date: day,
        total_income: totals.income,
        total_expense: totals.expense,
        balance: totals.balance(),
        transaction_count: totals.count,
        transactions: of_day,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberContribution {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub total_contributed: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAnalytics {
    pub total_expenses: f64,
    pub total_income: f64,
    pub balance: f64,
    pub member_count: usize,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub member_contributions: Vec<MemberContribution>,
}

/// Breakdown of a group's transactions by category and by contributing member.
///
/// Category percentages are relative to total expenses, member percentages to
/// the sum of all contributions; both are rounded to one decimal.
pub fn group_analytics(
    group: &Group,
    transactions: &[Transaction],
    categories: &HashMap<CategoryId, Category>,
    users: &HashMap<UserId, User>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> GroupAnalytics {
    let totals = Totals::of(transactions);

    let mut category_totals: HashMap<String, f64> = HashMap::new();
    let mut member_totals: HashMap<UserId, f64> = HashMap::new();

    for tx in transactions {
        let name = categories
            .get(&tx.category_id())
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        *category_totals.entry(name).or_default() += tx.amount();
        *member_totals.entry(tx.user_id()).or_default() += tx.amount();
    }

    let expense_base = if totals.expense > 0.0 { totals.expense } else { 1.0 };
    let mut category_breakdown: Vec<CategoryBreakdown> = category_totals
        .into_iter()
        .map(|(category, amount)| CategoryBreakdown {
            category,
            amount,
            percentage: round1(amount / expense_base * 100.0),
        })
        .collect();
    category_breakdown.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });

    let contributed: f64 = member_totals.values().sum();
    let contribution_base = if contributed > 0.0 { contributed } else { 1.0 };
    let mut member_contributions: Vec<MemberContribution> = member_totals
        .into_iter()
        .map(|(user_id, total)| {
            let user = users.get(&user_id);
            MemberContribution {
                user_id,
                first_name: user.map(|u| u.first_name().to_string()).unwrap_or_default(),
                last_name: user.map(|u| u.last_name().to_string()).unwrap_or_default(),
                total_contributed: total,
                percentage: round1(total / contribution_base * 100.0),
            }
        })
        .collect();
    member_contributions.sort_by(|a, b| {
        b.total_contributed
            .total_cmp(&a.total_contributed)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    GroupAnalytics {
        total_expenses: totals.expense,
        total_income: totals.income,
        balance: totals.balance(),
        member_count: group.member_count(),
        period_start: start,
        period_end: end,
        category_breakdown,
        member_contributions,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub user_id: UserId,
    pub full_name: String,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group_id: GroupId,
    pub group_name: String,
    pub members: Vec<MemberSummary>,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
}

/// Income and expense per member who recorded group transactions
pub fn group_summary(
    group: &Group,
    transactions: &[Transaction],
    users: &HashMap<UserId, User>,
) -> GroupSummary {
    let totals = Totals::of(transactions);
    let mut per_member: BTreeMap<UserId, Totals> = BTreeMap::new();

    for tx in transactions {
        per_member.entry(tx.user_id()).or_default().add(tx);
    }

    let members = per_member
        .into_iter()
        .map(|(user_id, member)| MemberSummary {
            user_id,
            full_name: users.get(&user_id).map(User::full_name).unwrap_or_default(),
            income: member.income,
            expense: member.expense,
            balance: member.balance(),
        })
        .collect();

    GroupSummary {
        group_id: group.id(),
        group_name: group.name().to_string(),
        members,
        total_income: totals.income,
        total_expense: totals.expense,
        balance: totals.balance(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::NewCategory;
    use crate::domain::group::NewGroup;
    use crate::domain::transaction::{NewTransaction, TransactionId};
    use crate::domain::user::NewUser;
    use chrono::{TimeZone, Utc};

    fn tx(
        id: i64,
        user: i64,
        category: i64,
        kind: TransactionType,
        amount: f64,
        (y, m, d): (i32, u32, u32),
    ) -> Transaction {
        Transaction::from_new(
            TransactionId::new(id),
            NewTransaction {
                name: format!("tx-{id}"),
                kind,
                category_id: CategoryId::new(category),
                amount,
                date: Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap(),
                user_id: UserId::new(user),
                group_id: None,
            },
        )
    }

    fn categories() -> HashMap<CategoryId, Category> {
        [
            (1, "Salary", TransactionType::Income),
            (2, "Food", TransactionType::Expense),
            (3, "Transport", TransactionType::Expense),
        ]
        .into_iter()
        .map(|(id, name, kind)| {
            let category = Category::from_new(
                CategoryId::new(id),
                NewCategory {
                    name: name.to_string(),
                    description: None,
                    kind,
                },
            );
            (category.id(), category)
        })
        .collect()
    }

    fn users() -> HashMap<UserId, User> {
        [(1, "Ann", "Lee"), (2, "Bob", "Ray")]
            .into_iter()
            .map(|(id, first, last)| {
                let user = User::from_new(
                    UserId::new(id),
                    NewUser {
                        first_name: first.to_string(),
                        last_name: last.to_string(),
                        email: format!("{}@example.com", first.to_lowercase()),
                        password_hash: String::new(),
                    },
                );
                (user.id(), user)
            })
            .collect()
    }

    fn fixtures() -> Vec<Transaction> {
        vec![
            tx(1, 1, 1, TransactionType::Income, 1000.0, (2024, 3, 1)),
            tx(2, 1, 2, TransactionType::Expense, 150.0, (2024, 3, 4)),
            tx(3, 2, 2, TransactionType::Expense, 50.0, (2024, 3, 7)),
            tx(4, 2, 3, TransactionType::Expense, 100.0, (2024, 4, 2)),
        ]
    }

    #[test]
    fn test_overview_balance() {
        let period = Period::resolve(None, None, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        let result = overview(&fixtures(), period);
        assert_eq!(result.total_income, 1000.0);
        assert_eq!(result.total_expense, 300.0);
        assert_eq!(result.balance, 700.0);
    }

    #[test]
    fn test_by_category_percentages_of_expense() {
        let result = by_category(&fixtures(), &categories());
        assert_eq!(result[0].category_name, "Salary");
        let food = result.iter().find(|c| c.category_name == "Food").unwrap();
        assert_eq!(food.total_amount, 200.0);
        assert_eq!(food.transaction_count, 2);
        assert!((food.percentage - 66.666).abs() < 0.01);
        assert_eq!(food.category_type, TransactionType::Expense);
    }

    #[test]
    fn test_by_category_without_expenses() {
        let only_income = vec![tx(1, 1, 1, TransactionType::Income, 10.0, (2024, 1, 1))];
        let result = by_category(&only_income, &categories());
        assert_eq!(result[0].percentage, 0.0);
    }

    #[test]
    fn test_by_period_weekly_buckets() {
        let result = by_period(&fixtures(), Granularity::Week);
        let dates: Vec<String> = result.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-02-26", "2024-03-04", "2024-04-01"]);
        assert_eq!(result[1].expense, 200.0);
        assert_eq!(result[1].balance, -200.0);
    }

    #[test]
    fn test_by_period_monthly_buckets() {
        let result = by_period(&fixtures(), Granularity::Month);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].income, 1000.0);
        assert_eq!(result[0].balance, 800.0);
    }

    #[test]
    fn test_monthly_statistics_single_month() {
        let result = monthly_statistics(&fixtures(), 2024, Some(4));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].expense, 100.0);
        assert_eq!(result[0].transaction_count, 1);
        assert!(monthly_statistics(&fixtures(), 2023, None).is_empty());
    }

    #[test]
    fn test_top_categories() {
        let result = top_categories(&fixtures(), &categories(), TransactionType::Expense, 1);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].category_name, "Food");
        assert_eq!(result[0].average_amount, 100.0);
    }

    #[test]
    fn test_daily_statistics() {
        let result = daily_statistics(&fixtures(), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(result.transaction_count, 1);
        assert_eq!(result.balance, -150.0);
    }

    #[test]
    fn test_group_analytics() {
        let mut group = Group::from_new(
            GroupId::new(1),
            NewGroup {
                name: "Home".to_string(),
                description: None,
                owner_id: UserId::new(1),
            },
        );
        group.add_member(UserId::new(2));

        let expenses: Vec<Transaction> = fixtures().into_iter().skip(1).collect();
        let result = group_analytics(&group, &expenses, &categories(), &users(), None, None);

        assert_eq!(result.member_count, 2);
        assert_eq!(result.total_expenses, 300.0);
        assert_eq!(result.category_breakdown[0].category, "Food");
        assert_eq!(result.category_breakdown[0].percentage, 66.7);
        assert_eq!(result.member_contributions[0].first_name, "Ann");
        assert_eq!(result.member_contributions[0].percentage, 50.0);
        assert_eq!(result.member_contributions[1].total_contributed, 150.0);
    }

    #[test]
    fn test_group_summary() {
        let group = Group::from_new(
            GroupId::new(3),
            NewGroup {
                name: "Trip".to_string(),
                description: None,
                owner_id: UserId::new(1),
            },
        );
        let result = group_summary(&group, &fixtures(), &users());
        assert_eq!(result.members.len(), 2);
        assert_eq!(result.members[0].full_name, "Ann Lee");
        assert_eq!(result.members[0].balance, 850.0);
        assert_eq!(result.balance, 700.0);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(46.66), 46.7);
    }
}

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;

use crate::config::DashboardConfig;
use crate::i18n::I18nManager;
use crate::session::SessionProvider;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccountType {
    Current,
    Saving,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Account {
    pub name: String,
    pub kind: AccountType,
    pub balance: Decimal,
    pub is_default: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionType {
    Income,
    Expense,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    /// Name of the account the transaction belongs to.
    pub account: String,
    pub kind: TransactionType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub category: String,
    pub date: DateTime<Utc>,
    pub status: TransactionStatus,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Budget {
    pub amount: Decimal,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BudgetUsage {
    pub budget: Decimal,
    pub spent: Decimal,
    pub percentage_used: Decimal,
    pub alert: bool,
}

/// Everything the home page shows, computed once from injected data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dashboard {
    pub title: String,
    pub subtext: String,
    pub greeting_name: String,
    pub total_banks: usize,
    pub total_current_balance: Decimal,
    pub accounts: Vec<Account>,
    pub recent_transactions: Vec<Transaction>,
    pub budget_usage: Option<BudgetUsage>,
}

impl Dashboard {
    pub fn build(
        session: &dyn SessionProvider,
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
        budget: Option<Budget>,
        now: DateTime<Utc>,
        config: &DashboardConfig,
        i18n: &I18nManager,
    ) -> Self {
        let greeting_name = session
            .current_profile()
            .map(|profile| profile.first_name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| i18n.t("dashboard.guest"));

        let total_current_balance = accounts
            .iter()
            .fold(Decimal::ZERO, |total, account| {
                total.saturating_add(account.balance)
            });

        let budget_usage = budget.and_then(|budget| {
            let account = default_account(&accounts)?;
            budget_usage(budget, account, &transactions, now, config)
        });

        let mut recent_transactions = transactions;
        recent_transactions.sort_by(|a, b| b.date.cmp(&a.date));
        recent_transactions.truncate(config.recent_transactions_limit);

        Self {
            title: i18n.t("dashboard.welcome"),
            subtext: i18n.t("dashboard.subtext"),
            greeting_name,
            total_banks: accounts.len(),
            total_current_balance,
            accounts,
            recent_transactions,
            budget_usage,
        }
    }

    pub fn default_account(&self) -> Option<&Account> {
        default_account(&self.accounts)
    }
}

fn default_account(accounts: &[Account]) -> Option<&Account> {
    accounts
        .iter()
        .find(|account| account.is_default)
        .or_else(|| accounts.first())
}

// Every expense on the default account dated in the current calendar month
// counts, whatever its status. Amounts beyond `Decimal` range give no usage.
fn budget_usage(
    budget: Budget,
    account: &Account,
    transactions: &[Transaction],
    now: DateTime<Utc>,
    config: &DashboardConfig,
) -> Option<BudgetUsage> {
    if budget.amount <= Decimal::ZERO {
        return None;
    }

    let spent = transactions
        .iter()
        .filter(|tx| tx.kind == TransactionType::Expense && tx.account == account.name)
        .filter(|tx| tx.date.year() == now.year() && tx.date.month() == now.month())
        .try_fold(Decimal::ZERO, |total, tx| total.checked_add(tx.amount));
    let usage = spent.and_then(|spent| {
        let percentage = spent
            .checked_div(budget.amount)?
            .checked_mul(Decimal::ONE_HUNDRED)?;
        Some((spent, percentage))
    });
    let Some((spent, percentage_used)) = usage else {
        log::warn!(
            "budget usage for account `{}` is out of range, skipping",
            account.name
        );
        return None;
    };

    Some(BudgetUsage {
        budget: budget.amount,
        spent,
        percentage_used,
        alert: percentage_used >= Decimal::from(config.budget_alert_threshold_percent),
    })
}

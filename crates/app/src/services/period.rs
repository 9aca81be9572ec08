//! Calendar windows and checked sums shared by the report and dashboard
//! services. Windows are half-open UTC ranges over whole days.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use salesdesk_core::DomainError;
use salesdesk_sales::Sale;

use crate::error::{AppError, AppResult};

pub(crate) const MONTH_NAMES: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho", "Agosto", "Setembro",
    "Outubro", "Novembro", "Dezembro",
];

pub(crate) const SHORT_MONTH_NAMES: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Indexed by days from Sunday.
pub(crate) const DAY_NAMES: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

/// `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Period {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Period {
    /// Every instant of the days `first..=last`.
    pub fn days(first: NaiveDate, last: NaiveDate) -> AppResult<Self> {
        let after_last = last.succ_opt().ok_or_else(out_of_range)?;
        Ok(Self {
            from: start_of(first),
            to: start_of(after_last),
        })
    }

    /// The calendar month starting at `first_day`.
    pub fn month(first_day: NaiveDate) -> AppResult<Self> {
        let next = first_day
            .checked_add_months(Months::new(1))
            .ok_or_else(out_of_range)?;
        Ok(Self {
            from: start_of(first_day),
            to: start_of(next),
        })
    }

    pub fn year(year: i32) -> AppResult<Self> {
        let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(out_of_range)?;
        let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(out_of_range)?;
        Self::days(first, last)
    }
}

pub(crate) fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::default()).and_utc()
}

pub(crate) fn month_start(date: NaiveDate) -> AppResult<NaiveDate> {
    date.with_day(1).ok_or_else(out_of_range)
}

pub(crate) fn months_back(date: NaiveDate, months: u32) -> AppResult<NaiveDate> {
    date.checked_sub_months(Months::new(months))
        .ok_or_else(out_of_range)
}

pub(crate) fn days_back(date: NaiveDate, days: u64) -> AppResult<NaiveDate> {
    date.checked_sub_days(Days::new(days)).ok_or_else(out_of_range)
}

pub(crate) fn days_ahead(date: NaiveDate, days: u64) -> AppResult<NaiveDate> {
    date.checked_add_days(Days::new(days)).ok_or_else(out_of_range)
}

pub(crate) fn month_name(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}

pub(crate) fn short_month_name(date: NaiveDate) -> &'static str {
    SHORT_MONTH_NAMES[date.month0() as usize]
}

pub(crate) fn day_name(date: NaiveDate) -> &'static str {
    DAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

pub(crate) fn checked_add(a: Decimal, b: Decimal) -> AppResult<Decimal> {
    a.checked_add(b).ok_or_else(too_large)
}

/// Sum of sale totals.
pub(crate) fn revenue(sales: &[Sale]) -> AppResult<Decimal> {
    sales
        .iter()
        .try_fold(Decimal::ZERO, |sum, sale| checked_add(sum, sale.total_amount()))
}

pub(crate) fn too_large() -> AppError {
    DomainError::invalid_state("amount is too large to aggregate").into()
}

fn out_of_range() -> AppError {
    DomainError::validation("date is out of range").into()
}

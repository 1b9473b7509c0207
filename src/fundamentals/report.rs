use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum StatementType {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
}

impl StatementType {
    /// Slug used in artifact file names.
    pub fn slug(&self) -> &'static str {
        match self {
            StatementType::BalanceSheet => "balance-sheet",
            StatementType::IncomeStatement => "income-statement",
            StatementType::CashFlow => "cash-flow",
        }
    }

    /// Last path segment of the statement tab link on the fundamentals page.
    pub fn tab_segment(&self) -> &'static str {
        match self {
            StatementType::BalanceSheet => "balancesheet",
            StatementType::IncomeStatement => "incomestatement",
            StatementType::CashFlow => "cashflow",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for StatementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "balance-sheet" | "balancesheet" => Ok(StatementType::BalanceSheet),
            "income-statement" | "incomestatement" => Ok(StatementType::IncomeStatement),
            "cash-flow" | "cashflow" => Ok(StatementType::CashFlow),
            _ => Err(format!("Unknown statement type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum PeriodType {
    Annual,
    Quarter,
}

impl PeriodType {
    /// Text of the radio control that selects this period.
    pub fn label(&self) -> &'static str {
        match self {
            PeriodType::Annual => "Annual",
            PeriodType::Quarter => "Quarter",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            PeriodType::Annual => "annual",
            PeriodType::Quarter => "quarterly",
        }
    }

    pub fn other(&self) -> PeriodType {
        match self {
            PeriodType::Annual => PeriodType::Quarter,
            PeriodType::Quarter => PeriodType::Annual,
        }
    }

    pub fn from_label(label: &str) -> Option<PeriodType> {
        match label.trim() {
            "Annual" => Some(PeriodType::Annual),
            "Quarter" => Some(PeriodType::Quarter),
            _ => None,
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "annual" => Ok(PeriodType::Annual),
            "quarter" | "quarterly" => Ok(PeriodType::Quarter),
            _ => Err(format!("Unknown period type: {}", s)),
        }
    }
}

//! Core data models for the expense agent

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//
// ================= Expense =================
//

/// One expense row, ready to be persisted.
///
/// The sender's phone identifier doubles as the user key; the provider
/// formats it as `<protocol>:<address>` (e.g. `whatsapp:+5511999999999`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub user_phone: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    /// Free-form note; the chat flow never fills it in today.
    pub description: String,
}

impl ExpenseRecord {
    pub fn new(user_phone: &str, amount: f64, category: &str, date: NaiveDate) -> Self {
        Self {
            user_phone: user_phone.to_string(),
            amount,
            category: category.to_string(),
            date,
            description: String::new(),
        }
    }
}

//
// ================= Aggregates =================
//

/// Summed expenses for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

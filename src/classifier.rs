//! Intent Classifier
//!
//! Classifies inbound messages into one of the bot's fixed intents by
//! case-insensitive keyword membership, tested in a fixed priority order:
//! expense > income > summary > financial summary > reset > help.

/// Static keyword lists — zero allocation
const EXPENSE_KEYWORDS: &[&str] = &["gastei", "comprei", "paguei", "custou"];

const INCOME_KEYWORDS: &[&str] = &["renda", "salário", "salario", "ganho", "recebo"];

const SUMMARY_KEYWORDS: &[&str] = &["resumo", "gastos"];

const FINANCIAL_KEYWORDS: &[&str] = &["saldo", "total"];

const RESET_KEYWORDS: &[&str] = &[
    "reset",
    "zerar",
    "apagar tudo",
    "limpar dados",
    "reiniciar",
    "apagar",
];

const HELP_KEYWORDS: &[&str] = &["ajuda", "comandos", "help"];

/// Keywords that confirm a reset within the same message ("reset ok")
const CONFIRM_KEYWORDS: &[&str] = &["sim", "confirmar", "ok"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Expense,
    Income,
    Summary,
    FinancialSummary,
    Reset,
    Help,
    Unknown,
}

/// Intent classifier
pub struct IntentClassifier;

impl IntentClassifier {
    /// Classify a raw message. The first matching keyword set wins, so
    /// "gastei metade do meu salário" is an expense, not an income update.
    pub fn classify(message: &str) -> Intent {
        let msg = message.trim().to_lowercase();

        if contains_any(&msg, EXPENSE_KEYWORDS) {
            Intent::Expense
        } else if contains_any(&msg, INCOME_KEYWORDS) {
            Intent::Income
        } else if contains_any(&msg, SUMMARY_KEYWORDS) {
            Intent::Summary
        } else if contains_any(&msg, FINANCIAL_KEYWORDS) {
            Intent::FinancialSummary
        } else if contains_any(&msg, RESET_KEYWORDS) {
            Intent::Reset
        } else if contains_any(&msg, HELP_KEYWORDS) {
            Intent::Help
        } else {
            Intent::Unknown
        }
    }
}

/// Whether a reset-intent message carries its own confirmation keyword
pub fn is_reset_confirmed(message: &str) -> bool {
    contains_any(&message.to_lowercase(), CONFIRM_KEYWORDS)
}

fn contains_any(msg: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| msg.contains(kw))
}

//! Message interpreter
//!
//! Turns one inbound message into one reply. Only the expense, income and
//! reset paths write to the store; every failure is logged and mapped to a
//! chat reply, so the sender always hears back.

use chrono::Local;
use tracing::{error, info};

use crate::classifier::{is_reset_confirmed, Intent, IntentClassifier};
use crate::extract::{self, CurrencyTokenRecognizer, MoneyRecognizer};
use crate::models::ExpenseRecord;
use crate::store::ExpenseStore;
use crate::Result;

const FALLBACK_REPLY: &str = "Desculpe, não entendi sua mensagem. Por favor, tente \
    registrar uma despesa, definir sua renda ou solicitar um resumo.";

const HELP_REPLY: &str = concat!(
    "Funcionalidades disponíveis:\n\n",
    "1. Registrar despesas:\n",
    "   - Exemplo: 'gastei 50 no supermercado'\n\n",
    "2. Registrar renda:\n",
    "   - Exemplo: 'minha renda é 3000'\n\n",
    "3. Obter resumo simples dos gastos:\n",
    "   - Exemplo: 'resumo' ou 'gastos'\n\n",
    "4. Obter resumo financeiro completo:\n",
    "   - Exemplo: 'saldo' ou 'total'\n\n",
    "5. Resetar dados (gastos e renda):\n",
    "   - Exemplo: 'reset' ou 'zerar'\n",
    "     * Após isso, confirme com 'reset ok' para confirmar.\n\n",
    "6. Ajuda:\n",
    "   - Exemplo: 'ajuda', 'comandos' ou 'help'\n\n",
    "Utilize os comandos acima para interagir com o sistema.",
);

/// Interprets inbound messages against the expense store.
pub struct Interpreter {
    store: Box<dyn ExpenseStore>,
    recognizer: Box<dyn MoneyRecognizer>,
}

impl Interpreter {
    pub fn new(store: Box<dyn ExpenseStore>) -> Self {
        Self::with_recognizer(store, Box::new(CurrencyTokenRecognizer))
    }

    /// Use a different structured money recognizer for the first
    /// extraction stage; the pattern fallback is unaffected.
    pub fn with_recognizer(
        store: Box<dyn ExpenseStore>,
        recognizer: Box<dyn MoneyRecognizer>,
    ) -> Self {
        Self { store, recognizer }
    }

    /// Process one inbound message and produce the reply text.
    pub async fn process_message(&self, message: &str, sender: &str) -> String {
        info!("Message from {}: {}", sender, message.trim());

        match IntentClassifier::classify(message) {
            Intent::Expense => self.handle_expense(message, sender).await,
            Intent::Income => self.handle_income(message, sender).await,
            Intent::Summary => self.handle_summary(sender).await,
            Intent::FinancialSummary => self.handle_financial_summary(sender).await,
            Intent::Reset => self.handle_reset(message, sender).await,
            Intent::Help => HELP_REPLY.to_string(),
            Intent::Unknown => FALLBACK_REPLY.to_string(),
        }
    }

    async fn handle_expense(&self, message: &str, sender: &str) -> String {
        let Some(amount) = extract::extract_amount_with(self.recognizer.as_ref(), message)
        else {
            return "Não consegui identificar o valor da despesa. Por favor, informe o \
                    valor corretamente."
                .to_string();
        };

        let category = extract::extract_category(message);
        let record = ExpenseRecord::new(sender, amount, category, Local::now().date_naive());

        match self.store.add_expense(&record).await {
            Ok(()) => {
                info!("Expense recorded for {}: R${:.2} ({})", sender, amount, category);
                format!(
                    "Despesa de R${:.2} registrada na categoria {}.",
                    amount, category
                )
            }
            Err(e) => {
                error!("Failed to record expense for {}: {}", sender, e);
                "Ocorreu um erro ao registrar sua despesa. Por favor, tente novamente."
                    .to_string()
            }
        }
    }

    async fn handle_income(&self, message: &str, sender: &str) -> String {
        // Structured + first-number stages, then the last number in the raw
        // text ("quero mudar minha renda para 4000").
        let amount = extract::extract_amount_with(self.recognizer.as_ref(), message)
            .or_else(|| extract::extract_last_amount(message));

        let Some(amount) = amount else {
            return "Não consegui identificar o valor da renda. Tente novamente.".to_string();
        };

        match self.store.set_income(sender, amount).await {
            Ok(()) => {
                info!("Income set for {}: R${:.2}", sender, amount);
                format!("Sua renda foi definida para R${:.2}.", amount)
            }
            Err(e) => {
                error!("Failed to set income for {}: {}", sender, e);
                "Ocorreu um erro ao definir sua renda. Por favor, tente novamente.".to_string()
            }
        }
    }

    async fn handle_summary(&self, sender: &str) -> String {
        match self.store.total_expenses(sender).await {
            Ok(total) => format!("Você gastou um total de R${:.2} até o momento.", total),
            Err(e) => {
                error!("Failed to build summary for {}: {}", sender, e);
                "Ocorreu um erro ao gerar o resumo. Por favor, tente novamente.".to_string()
            }
        }
    }

    async fn handle_financial_summary(&self, sender: &str) -> String {
        match self.financial_report(sender).await {
            Ok(report) => report,
            Err(e) => {
                error!("Failed to build financial report for {}: {}", sender, e);
                "Ocorreu um erro ao gerar o resumo financeiro. Por favor, tente novamente."
                    .to_string()
            }
        }
    }

    /// Income, total expenses, per-category breakdown, and the remaining
    /// balance as a multi-line report.
    async fn financial_report(&self, sender: &str) -> Result<String> {
        let total = self.store.total_expenses(sender).await?;
        let income = self.store.get_income(sender).await?;
        let balance = income - total;

        let by_category = self.store.totals_by_category(sender).await?;
        let details = if by_category.is_empty() {
            "Nenhum gasto registrado por categoria.".to_string()
        } else {
            by_category
                .iter()
                .map(|c| format!("  • {}: R${:.2}", c.category, c.total))
                .collect::<Vec<_>>()
                .join("\n")
        };

        Ok(format!(
            "Resumo Financeiro Completo:\n\
             Renda: R${:.2}\n\
             Gastos Totais: R${:.2}\n\
             Gastos por Categoria:\n{}\n\
             Saldo: R${:.2}",
            income, total, details, balance
        ))
    }

    async fn handle_reset(&self, message: &str, sender: &str) -> String {
        if !is_reset_confirmed(message) {
            return "Você deseja resetar todos os seus dados (gastos e renda)? \
                    Responda com 'reset ok' para confirmar."
                .to_string();
        }

        match self.store.reset_user(sender).await {
            Ok(()) => {
                info!("Data reset for {}", sender);
                "Todos os seus dados (gastos e renda) foram resetados.".to_string()
            }
            Err(e) => {
                error!("Failed to reset data for {}: {}", sender, e);
                "Ocorreu um erro ao resetar seus dados. Por favor, tente novamente."
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;
    use crate::models::CategoryTotal;
    use crate::store::SqliteStore;

    const SENDER: &str = "whatsapp:+5511999999999";

    async fn interpreter() -> Interpreter {
        let store = SqliteStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store");
        Interpreter::new(Box::new(store))
    }

    #[tokio::test]
    async fn test_expense_message_records_and_replies() {
        let bot = interpreter().await;

        let reply = bot.process_message("gastei 45,50 no mercado", SENDER).await;
        assert_eq!(
            reply,
            "Despesa de R$45.50 registrada na categoria Alimentação."
        );

        let summary = bot.process_message("resumo", SENDER).await;
        assert_eq!(summary, "Você gastou um total de R$45.50 até o momento.");
    }

    #[tokio::test]
    async fn test_expense_without_amount_stores_nothing() {
        let bot = interpreter().await;

        let reply = bot.process_message("gastei muito no mercado", SENDER).await;
        assert!(reply.starts_with("Não consegui identificar o valor da despesa"));

        let summary = bot.process_message("resumo", SENDER).await;
        assert_eq!(summary, "Você gastou um total de R$0.00 até o momento.");
    }

    #[tokio::test]
    async fn test_income_message_sets_income() {
        let bot = interpreter().await;

        let reply = bot.process_message("minha renda é 3000", SENDER).await;
        assert_eq!(reply, "Sua renda foi definida para R$3000.00.");

        // Repeating with a new value overwrites, never duplicates
        let reply = bot.process_message("minha renda é 4500", SENDER).await;
        assert_eq!(reply, "Sua renda foi definida para R$4500.00.");
    }

    #[tokio::test]
    async fn test_income_uses_last_number_fallback() {
        struct NeverMatches;
        impl MoneyRecognizer for NeverMatches {
            fn recognize(&self, _text: &str) -> Option<f64> {
                None
            }
        }

        let store = SqliteStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store");
        let bot = Interpreter::with_recognizer(Box::new(store), Box::new(NeverMatches));

        let reply = bot.process_message("minha renda é 2750", SENDER).await;
        assert_eq!(reply, "Sua renda foi definida para R$2750.00.");

        let reply = bot.process_message("minha renda mudou", SENDER).await;
        assert_eq!(
            reply,
            "Não consegui identificar o valor da renda. Tente novamente."
        );
    }

    #[tokio::test]
    async fn test_financial_summary_report() {
        let bot = interpreter().await;

        bot.process_message("gastei 45,50 no mercado", SENDER).await;
        bot.process_message("minha renda é 3000", SENDER).await;

        let report = bot.process_message("saldo", SENDER).await;
        assert!(report.contains("Renda: R$3000.00"));
        assert!(report.contains("Gastos Totais: R$45.50"));
        assert!(report.contains("  • Alimentação: R$45.50"));
        assert!(report.contains("Saldo: R$2954.50"));
    }

    #[tokio::test]
    async fn test_financial_summary_without_expenses() {
        let bot = interpreter().await;

        let report = bot.process_message("saldo", SENDER).await;
        assert!(report.contains("Nenhum gasto registrado por categoria."));
        assert!(report.contains("Saldo: R$0.00"));
    }

    #[tokio::test]
    async fn test_reset_requires_confirmation() {
        let bot = interpreter().await;

        bot.process_message("gastei 45,50 no mercado", SENDER).await;
        bot.process_message("minha renda é 3000", SENDER).await;

        // Without a confirmation keyword nothing is deleted
        let reply = bot.process_message("reset", SENDER).await;
        assert!(reply.contains("Responda com 'reset ok' para confirmar"));
        let summary = bot.process_message("resumo", SENDER).await;
        assert_eq!(summary, "Você gastou um total de R$45.50 até o momento.");

        // With it, both tables lose the sender's rows
        let reply = bot.process_message("reset ok", SENDER).await;
        assert_eq!(reply, "Todos os seus dados (gastos e renda) foram resetados.");

        let report = bot.process_message("saldo", SENDER).await;
        assert!(report.contains("Renda: R$0.00"));
        assert!(report.contains("Gastos Totais: R$0.00"));
    }

    #[tokio::test]
    async fn test_storage_failure_still_replies() {
        struct FailingStore;

        #[async_trait::async_trait]
        impl ExpenseStore for FailingStore {
            async fn add_expense(&self, _expense: &ExpenseRecord) -> crate::Result<()> {
                Err(BotError::StorageError("disk full".into()))
            }
            async fn set_income(&self, _phone: &str, _income: f64) -> crate::Result<()> {
                Err(BotError::StorageError("disk full".into()))
            }
            async fn get_income(&self, _phone: &str) -> crate::Result<f64> {
                Err(BotError::StorageError("disk full".into()))
            }
            async fn total_expenses(&self, _phone: &str) -> crate::Result<f64> {
                Err(BotError::StorageError("disk full".into()))
            }
            async fn totals_by_category(
                &self,
                _phone: &str,
            ) -> crate::Result<Vec<CategoryTotal>> {
                Err(BotError::StorageError("disk full".into()))
            }
            async fn reset_user(&self, _phone: &str) -> crate::Result<()> {
                Err(BotError::StorageError("disk full".into()))
            }
        }

        let bot = Interpreter::new(Box::new(FailingStore));

        // Every write and read path degrades to its "tente novamente" reply
        let cases = vec![
            (
                "gastei 45,50 no mercado",
                "Ocorreu um erro ao registrar sua despesa. Por favor, tente novamente.",
            ),
            (
                "minha renda é 3000",
                "Ocorreu um erro ao definir sua renda. Por favor, tente novamente.",
            ),
            (
                "resumo",
                "Ocorreu um erro ao gerar o resumo. Por favor, tente novamente.",
            ),
            (
                "saldo",
                "Ocorreu um erro ao gerar o resumo financeiro. Por favor, tente novamente.",
            ),
            (
                "reset ok",
                "Ocorreu um erro ao resetar seus dados. Por favor, tente novamente.",
            ),
        ];

        for (message, expected) in cases {
            assert_eq!(bot.process_message(message, SENDER).await, expected, "{}", message);
        }
    }

    #[tokio::test]
    async fn test_help_and_fallback() {
        let bot = interpreter().await;

        let help = bot.process_message("ajuda", SENDER).await;
        assert!(help.contains("Funcionalidades disponíveis"));
        assert!(help.contains("reset ok"));

        let fallback = bot.process_message("bom dia", SENDER).await;
        assert!(fallback.starts_with("Desculpe, não entendi sua mensagem"));
    }
}

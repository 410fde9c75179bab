//! Amount and category extraction
//!
//! Amounts go through a two-stage extractor: a structured pass over
//! currency-marked tokens first ("R$45,50", "30 reais"), then a plain
//! number-pattern fallback. Comma is accepted as the decimal separator.
//!
//! Categories come from an ordered keyword table; iteration order is the
//! tie-break, so a keyword listed under two categories resolves to its
//! first entry.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    /// First number-like substring: digits with an optional decimal part
    static ref NUMBER_RE: Regex = Regex::new(r"\d+[.,]?\d*").unwrap();

    /// Tokens carrying an explicit currency marker
    static ref CURRENCY_TOKEN_RE: Regex =
        Regex::new(r"(?i)r\$\s*[\d.,]+|[\d.,]+\s*(?:reais|real)\b").unwrap();
}

/// Structured first-stage money recognizer.
///
/// Kept behind a trait so the structured stage can be swapped or removed
/// without touching the pattern-fallback contract in [`extract_amount_with`].
pub trait MoneyRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Option<f64>;
}

/// Rule-based recognizer for currency-marked tokens.
///
/// Strips everything but digits and separators from each candidate token
/// and parses the remainder as a decimal.
pub struct CurrencyTokenRecognizer;

impl MoneyRecognizer for CurrencyTokenRecognizer {
    fn recognize(&self, text: &str) -> Option<f64> {
        for token in CURRENCY_TOKEN_RE.find_iter(text) {
            let cleaned: String = token
                .as_str()
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
                .collect();

            if let Some(value) = parse_decimal(&cleaned) {
                debug!("amount from currency token {:?}: {}", token.as_str(), value);
                return Some(value);
            }
        }
        None
    }
}

/// Extract a monetary amount with the default structured stage.
pub fn extract_amount(text: &str) -> Option<f64> {
    extract_amount_with(&CurrencyTokenRecognizer, text)
}

/// Extract a monetary amount: structured recognizer first, then the first
/// number-like substring anywhere in the text.
pub fn extract_amount_with(recognizer: &dyn MoneyRecognizer, text: &str) -> Option<f64> {
    if let Some(value) = recognizer.recognize(text) {
        return Some(value);
    }

    NUMBER_RE
        .find(text)
        .and_then(|m| parse_decimal(m.as_str()))
}

/// Last number-like substring in the text; the income handler's final
/// fallback ("ganho entre 2000 e 3000" reads as 3000).
pub fn extract_last_amount(text: &str) -> Option<f64> {
    NUMBER_RE
        .find_iter(text)
        .last()
        .and_then(|m| parse_decimal(m.as_str()))
}

fn parse_decimal(token: &str) -> Option<f64> {
    token.replace(',', ".").parse::<f64>().ok()
}

/// Category used when no keyword matches
pub const DEFAULT_CATEGORY: &str = "Outros";

/// Ordered (keyword, category) pairs. First match wins; "viagem" is listed
/// under both Transporte and Viagens and resolves to Transporte.
pub const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    // Alimentação
    ("almoço", "Alimentação"),
    ("almoco", "Alimentação"),
    ("jantar", "Alimentação"),
    ("café", "Alimentação"),
    ("lanche", "Alimentação"),
    ("refeição", "Alimentação"),
    ("comida", "Alimentação"),
    ("restaurante", "Alimentação"),
    ("mercado", "Alimentação"),
    ("supermercado", "Alimentação"),
    ("padaria", "Alimentação"),
    ("fastfood", "Alimentação"),
    ("pizza", "Alimentação"),
    ("sushi", "Alimentação"),
    ("sorvete", "Alimentação"),
    ("churrasco", "Alimentação"),
    ("cozinha", "Alimentação"),
    // Transporte
    ("uber", "Transporte"),
    ("ônibus", "Transporte"),
    ("táxi", "Transporte"),
    ("taxi", "Transporte"),
    ("trem", "Transporte"),
    ("metrô", "Transporte"),
    ("combustível", "Transporte"),
    ("gasolina", "Transporte"),
    ("diesel", "Transporte"),
    ("estacionamento", "Transporte"),
    ("fretado", "Transporte"),
    ("transporte", "Transporte"),
    ("viagem", "Transporte"),
    // Lazer
    ("cinema", "Lazer"),
    ("bar", "Lazer"),
    ("show", "Lazer"),
    ("festa", "Lazer"),
    ("teatro", "Lazer"),
    ("concerto", "Lazer"),
    ("parque", "Lazer"),
    ("esporte", "Lazer"),
    ("jogo", "Lazer"),
    ("museu", "Lazer"),
    ("exposição", "Lazer"),
    ("festivais", "Lazer"),
    // Saúde
    ("saúde", "Saúde"),
    ("farmácia", "Saúde"),
    ("medicamento", "Saúde"),
    ("consulta", "Saúde"),
    ("exame", "Saúde"),
    ("hospital", "Saúde"),
    ("dentista", "Saúde"),
    ("clínica", "Saúde"),
    ("psicólogo", "Saúde"),
    ("terapia", "Saúde"),
    // Educação
    ("educação", "Educação"),
    ("curso", "Educação"),
    ("livro", "Educação"),
    ("material escolar", "Educação"),
    ("universidade", "Educação"),
    ("ensino", "Educação"),
    ("escola", "Educação"),
    ("aula", "Educação"),
    // Contas e Serviços
    ("conta", "Contas"),
    ("energia", "Contas"),
    ("água", "Contas"),
    ("internet", "Contas"),
    ("telefone", "Contas"),
    ("gás", "Contas"),
    ("cabo", "Contas"),
    // Moradia
    ("aluguel", "Moradia"),
    ("imóvel", "Moradia"),
    ("casa", "Moradia"),
    ("residência", "Moradia"),
    ("condomínio", "Moradia"),
    ("manutenção", "Moradia"),
    ("reforma", "Moradia"),
    // Compras e Vestuário
    ("roupa", "Compras"),
    ("sapato", "Compras"),
    ("loja", "Compras"),
    ("shopping", "Compras"),
    ("presentes", "Compras"),
    ("eletrônicos", "Compras"),
    ("gadgets", "Compras"),
    ("cosméticos", "Compras"),
    ("acessórios", "Compras"),
    // Beleza
    ("maquiagem", "Beleza"),
    ("cabelo", "Beleza"),
    ("barbearia", "Beleza"),
    ("spa", "Beleza"),
    ("estética", "Beleza"),
    // Viagens
    ("viagem", "Viagens"),
    ("passagem", "Viagens"),
    ("hotel", "Viagens"),
    ("resort", "Viagens"),
    ("pacote", "Viagens"),
    // Serviços
    ("serviço", "Serviços"),
    ("manicure", "Serviços"),
    ("pedicure", "Serviços"),
    ("limpeza", "Serviços"),
    ("assistência", "Serviços"),
    ("conserto", "Serviços"),
    ("reparo", "Serviços"),
];

/// First keyword found as a case-insensitive substring wins.
pub fn extract_category(text: &str) -> &'static str {
    let msg = text.to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| msg.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_from_currency_token() {
        assert_eq!(extract_amount("paguei R$45,50 no mercado"), Some(45.5));
        assert_eq!(extract_amount("paguei R$ 120.00 de luz"), Some(120.0));
        assert_eq!(extract_amount("custou 30 reais"), Some(30.0));
    }

    #[test]
    fn test_amount_regex_fallback() {
        assert_eq!(extract_amount("gastei 45,50 no mercado"), Some(45.5));
        assert_eq!(extract_amount("gastei 50 no supermercado"), Some(50.0));
        assert_eq!(extract_amount("minha renda é 3000"), Some(3000.0));
    }

    #[test]
    fn test_amount_not_found() {
        assert_eq!(extract_amount("gastei muito no mercado"), None);
        assert_eq!(extract_amount(""), None);
    }

    #[test]
    fn test_last_amount() {
        assert_eq!(extract_last_amount("ganho entre 2000 e 3000"), Some(3000.0));
        assert_eq!(extract_last_amount("recebo 2500,50 por mês"), Some(2500.5));
        assert_eq!(extract_last_amount("sem números"), None);
    }

    #[test]
    fn test_recognizer_swap_keeps_fallback() {
        struct NeverMatches;
        impl MoneyRecognizer for NeverMatches {
            fn recognize(&self, _text: &str) -> Option<f64> {
                None
            }
        }

        // Structured stage removed entirely: the pattern fallback still works
        assert_eq!(
            extract_amount_with(&NeverMatches, "paguei R$45,50"),
            Some(45.5)
        );
    }

    #[test]
    fn test_category_basic() {
        assert_eq!(extract_category("gastei 45,50 no mercado"), "Alimentação");
        assert_eq!(extract_category("paguei o Uber"), "Transporte");
        assert_eq!(extract_category("comprei um livro"), "Educação");
    }

    #[test]
    fn test_category_order_sensitive() {
        // "viagem" appears under Transporte and Viagens; first entry wins
        assert_eq!(extract_category("gastei 200 na viagem"), "Transporte");
        // Other travel keywords still map to Viagens
        assert_eq!(extract_category("paguei o hotel"), "Viagens");
        assert_eq!(extract_category("comprei a passagem"), "Viagens");
    }

    #[test]
    fn test_category_default() {
        assert_eq!(extract_category("gastei 10 em algo"), DEFAULT_CATEGORY);
    }
}

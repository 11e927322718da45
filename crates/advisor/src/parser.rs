//! Extracts structured trading advice from a model's free-text analysis.
//!
//! The accepted grammar is one labeled field per line, matching what the
//! prompt in [`crate::prompt`] instructs the model to emit:
//!
//! ```text
//! Action: buy | sell | hold
//! Target price: <decimal>
//! Quantity: <integer>
//! Stop loss: <decimal>
//! Take profit: <decimal>
//! Holding period: <integer>
//! Risk level: low | medium | high
//! ```
//!
//! Labels are case-insensitive and may be surrounded by markdown emphasis or
//! list markers; a full-width colon is accepted alongside the ASCII one.
//! Every field is extracted independently: an absent label or a malformed
//! value yields `None` for that field and never a fabricated default.

use core_types::TradingAdvice;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Label prefix tolerated before a field name: start of line, then optional
/// list/emphasis markup.
const LINE: &str = r"(?im)^\s*[-*>]?\s*\**";

fn capture(text: &str, label: &str, value: &str) -> Option<String> {
    let pattern = format!(r"{LINE}{label}\**\s*[:：]\s*{value}");
    let re = Regex::new(&pattern).expect("field pattern must compile");
    re.captures(text).map(|c| c[1].to_string())
}

fn decimal_field(text: &str, label: &str) -> Option<Decimal> {
    capture(text, label, r"([0-9]+(?:\.[0-9]+)?)").and_then(|raw| Decimal::from_str(&raw).ok())
}

fn integer_field(text: &str, label: &str) -> Option<u64> {
    capture(text, label, r"([0-9]+)\b").and_then(|raw| raw.parse().ok())
}

/// Parses whatever advice fields are present in `text`.
pub fn parse_trading_advice(text: &str) -> TradingAdvice {
    TradingAdvice {
        action: capture(text, r"Action", r"(buy|sell|hold)\b").and_then(|s| s.parse().ok()),
        price: decimal_field(text, r"Target\s+price"),
        quantity: integer_field(text, r"Quantity"),
        stop_loss: decimal_field(text, r"Stop\s+loss"),
        take_profit: decimal_field(text, r"Take\s+profit"),
        holding_period: integer_field(text, r"Holding\s+period").map(|v| v as u32),
        risk_level: capture(text, r"Risk\s+level", r"(low|medium|high)\b")
            .and_then(|s| s.parse().ok()),
    }
}

/// Extracts A-share security codes (six digits beginning 0, 3, or 6) from a
/// recommendation text, deduplicated in order of first appearance.
pub fn extract_security_codes(text: &str) -> Vec<String> {
    let re = Regex::new(r"\b([036][0-9]{5})\b").expect("code pattern must compile");
    let mut seen = Vec::new();
    for cap in re.captures_iter(text) {
        let code = cap[1].to_string();
        if !seen.contains(&code) {
            seen.push(code);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{AdviceAction, RiskLevel};
    use rust_decimal_macros::dec;

    const FULL_ADVICE: &str = "\
After weighing the fundamentals against the recent headlines, my view is:

Action: buy
Target price: 12.50
Quantity: 500
Stop loss: 11.20
Take profit: 14.80
Holding period: 15
Risk level: medium
";

    #[test]
    fn parses_every_field_of_a_complete_block() {
        let advice = parse_trading_advice(FULL_ADVICE);
        assert_eq!(advice.action, Some(AdviceAction::Buy));
        assert_eq!(advice.price, Some(dec!(12.50)));
        assert_eq!(advice.quantity, Some(500));
        assert_eq!(advice.stop_loss, Some(dec!(11.20)));
        assert_eq!(advice.take_profit, Some(dec!(14.80)));
        assert_eq!(advice.holding_period, Some(15));
        assert_eq!(advice.risk_level, Some(RiskLevel::Medium));
    }

    #[test]
    fn fields_are_extracted_independently() {
        let advice = parse_trading_advice("Action: sell\nQuantity: 200\n");
        assert_eq!(advice.action, Some(AdviceAction::Sell));
        assert_eq!(advice.quantity, Some(200));
        assert_eq!(advice.price, None);
        assert_eq!(advice.stop_loss, None);
        assert_eq!(advice.risk_level, None);
    }

    #[test]
    fn labels_are_case_insensitive_and_tolerate_markup() {
        let advice = parse_trading_advice("- **ACTION**: HOLD\n* target PRICE: 9.99\n");
        assert_eq!(advice.action, Some(AdviceAction::Hold));
        assert_eq!(advice.price, Some(dec!(9.99)));
    }

    #[test]
    fn full_width_colon_is_accepted() {
        let advice = parse_trading_advice("Action： buy\nTarget price： 10.00\n");
        assert_eq!(advice.action, Some(AdviceAction::Buy));
        assert_eq!(advice.price, Some(dec!(10.00)));
    }

    #[test]
    fn malformed_values_are_absent_not_defaulted() {
        let advice =
            parse_trading_advice("Action: maybe\nTarget price: around ten\nQuantity: many\n");
        assert!(advice.is_empty());
    }

    #[test]
    fn a_range_does_not_parse_as_a_quantity() {
        // "100-200" starts with digits but is not a whole integer token.
        let advice = parse_trading_advice("Quantity: 100shares\n");
        assert_eq!(advice.quantity, None);
    }

    #[test]
    fn prose_without_labels_yields_empty_advice() {
        let advice = parse_trading_advice("I would cautiously accumulate on dips.");
        assert!(advice.is_empty());
    }

    #[test]
    fn label_must_start_its_line() {
        // An inline mention mid-sentence is narrative, not a field.
        let advice = parse_trading_advice("The action: buy camp is vocal.");
        assert_eq!(advice.action, None);
    }

    #[test]
    fn extracts_codes_deduplicated_in_order() {
        let text = "I like 600519 and 000858; 600519 again, plus 300750.";
        assert_eq!(extract_security_codes(text), vec!["600519", "000858", "300750"]);
    }

    #[test]
    fn ignores_numbers_that_are_not_codes() {
        let text = "Revenue grew 123456%, and 12345 is short, and 9600001 is too long.";
        assert!(extract_security_codes(text).is_empty());
    }
}

//! Presentation of money, dates and percentages.

use rust_decimal::Decimal;

use crate::domain::DueDate;

/// Digit separators picked from the configured `currency_locale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberStyle {
    thousands: char,
    decimal: char,
}

impl Default for NumberStyle {
    fn default() -> Self {
        Self::from_locale("pt-BR")
    }
}

impl NumberStyle {
    /// Locales writing `1.234,56` keep the pt-BR separators; anything else
    /// falls back to `1,234.56`.
    pub fn from_locale(locale: &str) -> Self {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "pt" | "es" | "de" | "it" | "nl" | "id" => Self {
                thousands: '.',
                decimal: ',',
            },
            _ => Self {
                thousands: ',',
                decimal: '.',
            },
        }
    }

    /// `R$ 1.234,56` under pt-BR; negative values get a leading minus.
    pub fn money(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp(2);
        let sign = if rounded < Decimal::ZERO { "-" } else { "" };
        let text = format!("{:.2}", rounded.abs());
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
        format!(
            "{sign}R$ {}{}{cents}",
            self.group_thousands(whole),
            self.decimal
        )
    }

    pub fn percent(&self, value: Decimal) -> String {
        let text = format!("{:.2}", value.round_dp(2));
        format!("{}%", text.replace('.', &self.decimal.to_string()))
    }

    fn group_thousands(&self, digits: &str) -> String {
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(self.thousands);
            }
            grouped.push(ch);
        }
        grouped
    }
}

/// `DD/MM/YYYY`, built from the stored parts without calendar checks.
pub fn format_date(date: &DueDate) -> String {
    format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_brazilian_currency() {
        let brl = NumberStyle::from_locale("pt-BR");
        assert_eq!(brl.money(Decimal::new(123456, 2)), "R$ 1.234,56");
        assert_eq!(brl.money(Decimal::new(6000, 0)), "R$ 6.000,00");
        assert_eq!(brl.money(Decimal::ZERO), "R$ 0,00");
        assert_eq!(brl.money(Decimal::new(999, 0)), "R$ 999,00");
        assert_eq!(brl.money(Decimal::new(123456789, 1)), "R$ 12.345.678,90");
        assert_eq!(brl.money(Decimal::new(-5005, 1)), "-R$ 500,50");
        assert_eq!(NumberStyle::default(), brl);
    }

    #[test]
    fn other_locales_swap_separators() {
        let en = NumberStyle::from_locale("en-US");
        assert_eq!(en.money(Decimal::new(123456, 2)), "R$ 1,234.56");
        assert_eq!(en.percent(Decimal::new(4167, 2)), "41.67%");
        assert_eq!(NumberStyle::from_locale("pt_PT"), NumberStyle::default());
    }

    #[test]
    fn formats_dates_and_percentages() {
        let date: DueDate = "2024-02-31".parse().unwrap();
        assert_eq!(format_date(&date), "31/02/2024");
        assert_eq!(NumberStyle::default().percent(Decimal::new(4167, 2)), "41,67%");
    }
}

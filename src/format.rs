//! Locale-aware numeric formatting for dashboard display.
//!
//! Covers the number, percent and metric renderings the results panel
//! needs. Missing or non-finite values render as "-" so a half-filled
//! metrics panel never shows NaN.

use crate::api::types::Language;

/// Display locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// 1,234.5
    #[default]
    En,
    /// 1 234,5
    Fr,
}

impl Locale {
    fn thousands_separator(&self) -> char {
        match self {
            Locale::En => ',',
            Locale::Fr => '\u{a0}',
        }
    }

    fn decimal_separator(&self) -> char {
        match self {
            Locale::En => '.',
            Locale::Fr => ',',
        }
    }
}

impl From<Language> for Locale {
    fn from(language: Language) -> Self {
        match language {
            Language::En => Locale::En,
            Language::Fr => Locale::Fr,
        }
    }
}

/// Which metric a value represents, selecting its rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Root mean squared error
    Rmse,
    /// Mean absolute error
    Mae,
    /// Coefficient of determination, rendered as a percentage
    R2Score,
    /// Sample counts, rendered compactly
    Samples,
}

impl MetricKind {
    /// Get display label for this metric.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Rmse => "RMSE",
            MetricKind::Mae => "MAE",
            MetricKind::R2Score => "R²",
            MetricKind::Samples => "Samples",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Locale-bound formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter {
    locale: Locale,
}

impl Formatter {
    /// Create a formatter for a locale.
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Create a formatter matching a requested response language.
    pub fn for_language(language: Language) -> Self {
        Self::new(language.into())
    }

    /// Format with digit grouping and up to two decimals.
    pub fn number(&self, value: f64) -> String {
        self.fixed(value, 2)
    }

    /// Format large values with k/M/B suffixes.
    pub fn compact(&self, value: f64) -> String {
        if !value.is_finite() {
            return "-".to_string();
        }

        let magnitude = value.abs();
        if magnitude >= 1e9 {
            format!("{}B", self.fixed(value / 1e9, 2))
        } else if magnitude >= 1e6 {
            format!("{}M", self.fixed(value / 1e6, 2))
        } else if magnitude >= 1e3 {
            format!("{}k", self.fixed(value / 1e3, 2))
        } else {
            self.fixed(value, 2)
        }
    }

    /// Format a ratio in [0, 1] as a percentage with at least one
    /// decimal (0.87 renders "87.0%").
    pub fn percent(&self, ratio: f64) -> String {
        if !ratio.is_finite() {
            return "-".to_string();
        }

        let rendered = format!("{:.2}", (ratio * 100.0).abs());
        let (int_part, frac_part) = match rendered.split_once('.') {
            Some(parts) => parts,
            None => (rendered.as_str(), ""),
        };
        let frac_part = frac_part.strip_suffix('0').unwrap_or(frac_part);

        let sign = if ratio < 0.0 { "-" } else { "" };
        let grouped = self.group(int_part);
        let suffix = match self.locale {
            Locale::En => "%",
            Locale::Fr => "\u{a0}%",
        };

        format!(
            "{sign}{grouped}{}{frac_part}{suffix}",
            self.locale.decimal_separator()
        )
    }

    /// Format a model metric according to its kind.
    pub fn metric(&self, value: f64, kind: MetricKind) -> String {
        if !value.is_finite() {
            return "-".to_string();
        }

        match kind {
            MetricKind::Rmse | MetricKind::Mae => self.number(value),
            MetricKind::R2Score => self.percent(value),
            MetricKind::Samples => self.compact(value),
        }
    }

    /// Fixed-point rendering with grouping, trailing zeros trimmed.
    fn fixed(&self, value: f64, max_decimals: usize) -> String {
        if !value.is_finite() {
            return "-".to_string();
        }

        let rendered = format!("{:.max_decimals$}", value.abs());
        let (int_part, frac_part) = match rendered.split_once('.') {
            Some(parts) => parts,
            None => (rendered.as_str(), ""),
        };
        let frac_part = frac_part.trim_end_matches('0');

        // Suppress the sign when the magnitude rounds to zero.
        let sign = if value < 0.0 && rendered.contains(|c: char| ('1'..='9').contains(&c)) {
            "-"
        } else {
            ""
        };
        let grouped = self.group(int_part);

        if frac_part.is_empty() {
            format!("{sign}{grouped}")
        } else {
            format!(
                "{sign}{grouped}{}{frac_part}",
                self.locale.decimal_separator()
            )
        }
    }

    /// Insert the locale's thousands separator every three digits.
    fn group(&self, digits: &str) -> String {
        let separator = self.locale.thousands_separator();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(separator);
            }
            grouped.push(c);
        }

        grouped
    }
}

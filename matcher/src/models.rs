use serde::{Deserialize, Serialize};

use crate::error::MatchError;

const RULE: &str = "================================================================================";

/// Round to two decimal places.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// A catalog product recognised in a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatchedProductRecord")]
pub struct MatchedProduct {
    product_name: String,
    confidence: f64,
    context: String,
}

#[derive(Deserialize)]
struct MatchedProductRecord {
    product_name: String,
    confidence: f64,
    context: String,
}

impl TryFrom<MatchedProductRecord> for MatchedProduct {
    type Error = MatchError;

    fn try_from(r: MatchedProductRecord) -> Result<Self, Self::Error> {
        MatchedProduct::new(r.product_name, r.confidence, r.context)
    }
}

impl MatchedProduct {
    /// Confidence must lie in `[0, 1]` and is stored rounded to two
    /// decimals.
    pub fn new(
        product_name: impl Into<String>,
        confidence: f64,
        context: impl Into<String>,
    ) -> Result<Self, MatchError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(MatchError::InvalidResult(format!(
                "confidence {confidence} is outside [0, 1]"
            )));
        }
        Ok(Self {
            product_name: product_name.into(),
            confidence: round2(confidence),
            context: context.into(),
        })
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// The mention the product was resolved from.
    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Outcome of processing one transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    matched_products: Vec<MatchedProduct>,
    competitor_advantage_mentioned: bool,
    bad_placement_mentioned: bool,
    raw_text: String,
}

impl ProcessingResult {
    pub fn new(
        matched_products: Vec<MatchedProduct>,
        competitor_advantage_mentioned: bool,
        bad_placement_mentioned: bool,
        raw_text: impl Into<String>,
    ) -> Result<Self, MatchError> {
        let raw_text = raw_text.into();
        if raw_text.trim().is_empty() {
            return Err(MatchError::InvalidResult(
                "raw text cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            matched_products,
            competitor_advantage_mentioned,
            bad_placement_mentioned,
            raw_text,
        })
    }

    pub fn matched_products(&self) -> &[MatchedProduct] {
        &self.matched_products
    }

    pub fn competitor_advantage_mentioned(&self) -> bool {
        self.competitor_advantage_mentioned
    }

    pub fn bad_placement_mentioned(&self) -> bool {
        self.bad_placement_mentioned
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Human-readable report in Czech, as shown to field staff.
    pub fn to_summary(&self) -> String {
        let flag = |b: bool| if b { "ANO ⚠️" } else { "NE" };

        let mut lines = vec![
            RULE.to_string(),
            "VÝSLEDEK ZPRACOVÁNÍ TRANSKRIPTU".to_string(),
            RULE.to_string(),
            String::new(),
            format!("Originální text: {}", self.raw_text),
            String::new(),
            format!("Nalezeno produktů: {}", self.matched_products.len()),
        ];

        if !self.matched_products.is_empty() {
            lines.push(String::new());
            lines.push("Identifikované produkty:".to_string());
            for (i, p) in self.matched_products.iter().enumerate() {
                lines.push(format!(
                    "  {}. {} (confidence: {:.2})",
                    i + 1,
                    p.product_name,
                    p.confidence
                ));
                lines.push(format!("     Kontext: \"{}\"", p.context));
            }
        }

        lines.push(String::new());
        lines.push("Detekované problémy:".to_string());
        lines.push(format!(
            "  • Výhoda konkurence: {}",
            flag(self.competitor_advantage_mentioned)
        ));
        lines.push(format!(
            "  • Špatné umístění: {}",
            flag(self.bad_placement_mentioned)
        ));
        lines.push(RULE.to_string());

        lines.join("\n")
    }
}

/// A labelled transcript used to evaluate the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSample {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub expected_products: Vec<String>,
    #[serde(default)]
    pub has_competitor_mention: bool,
    #[serde(default)]
    pub has_placement_issue: bool,
}

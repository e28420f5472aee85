use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{PricingError, PricingResult};
use crate::materials::{MATERIALS, Material, find_material};
use crate::models::{Quote, QuoteRequest, ServiceKind};

/// Largest accepted job size, in cm³ or cm².
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Quotes jobs against the [`MATERIALS`] table.
#[derive(Debug, Clone)]
pub struct QuoteEngine {
    setup_fee: Decimal,
    rush_multiplier: Decimal,
    currency: String,
}

impl Default for QuoteEngine {
    fn default() -> Self {
        Self {
            setup_fee: Decimal::new(500, 2),
            rush_multiplier: Decimal::new(15, 1),
            currency: "USD".to_string(),
        }
    }
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl QuoteEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn setup_fee(&self) -> Decimal {
        self.setup_fee
    }

    pub fn rush_multiplier(&self) -> Decimal {
        self.rush_multiplier
    }

    /// Materials offered for `service`, or all of them, ordered by id.
    pub fn materials(&self, service: Option<ServiceKind>) -> Vec<Material> {
        let mut materials: Vec<Material> = MATERIALS
            .iter()
            .filter(|m| service.is_none_or(|s| m.service == s))
            .copied()
            .collect();
        materials.sort_by_key(|m| m.id);
        materials
    }

    pub fn quote(&self, request: &QuoteRequest) -> PricingResult<Quote> {
        let material = find_material(&request.material)
            .ok_or_else(|| PricingError::Validation(format!("Unknown material: {}", request.material)))?;

        if material.service != request.service {
            return Err(PricingError::Validation(format!(
                "Material {} is not available for {}",
                material.id, request.service
            )));
        }
        if request.amount <= Decimal::ZERO {
            return Err(PricingError::Validation(
                "amount must be greater than 0".to_string(),
            ));
        }
        if request.amount > MAX_AMOUNT {
            return Err(PricingError::Validation(format!(
                "amount must not exceed {}",
                MAX_AMOUNT
            )));
        }

        let quality_multiplier = request.quality.multiplier();
        let processing = request.amount * material.rate * quality_multiplier;
        let subtotal = processing + self.setup_fee;
        let rush_multiplier = if request.rush {
            self.rush_multiplier
        } else {
            Decimal::ONE
        };
        let total = subtotal * rush_multiplier;

        let estimated_weight_grams = match request.service {
            ServiceKind::ThreeDPrinting => Some(round_cents(request.amount * material.density)),
            ServiceKind::LaserEngraving => None,
        };
        let estimated_hours = round_cents(
            request.amount / request.service.throughput_per_hour() * quality_multiplier,
        );

        tracing::debug!(
            material = material.id,
            amount = %request.amount,
            quality = %request.quality,
            rush = request.rush,
            total = %total,
            "Computed quote"
        );

        Ok(Quote {
            service: request.service,
            material: material.id.to_string(),
            amount: request.amount,
            unit: request.service.unit().to_string(),
            quality: request.quality,
            rush: request.rush,
            material_rate: material.rate,
            quality_multiplier,
            processing_cost: round_cents(processing),
            setup_fee: self.setup_fee,
            subtotal: round_cents(subtotal),
            rush_multiplier,
            total: round_cents(total),
            estimated_weight_grams,
            estimated_hours,
            currency: self.currency.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quality;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn request(service: ServiceKind, material: &str, amount: &str, quality: Quality, rush: bool) -> QuoteRequest {
        QuoteRequest {
            service,
            material: material.to_string(),
            amount: dec(amount),
            quality,
            rush,
        }
    }

    #[test]
    fn test_standard_pla() {
        let engine = QuoteEngine::new();
        let quote = engine
            .quote(&request(ServiceKind::ThreeDPrinting, "pla", "100", Quality::Standard, false))
            .unwrap();

        // setup_fee + 100 × 0.05
        assert_eq!(quote.total, dec("10.00"));
        assert_eq!(quote.processing_cost, dec("5.00"));
        assert_eq!(quote.estimated_weight_grams, Some(dec("124.00")));
        assert_eq!(quote.estimated_hours, dec("8.33"));
        assert_eq!(quote.unit, "cm3");
    }

    #[test]
    fn test_rush_multiplies_total() {
        let engine = QuoteEngine::new();
        let normal = engine
            .quote(&request(ServiceKind::ThreeDPrinting, "pla", "100", Quality::Standard, false))
            .unwrap();
        let rush = engine
            .quote(&request(ServiceKind::ThreeDPrinting, "pla", "100", Quality::Standard, true))
            .unwrap();
        assert_eq!(rush.total, normal.total * dec("1.5"));
        assert_eq!(rush.total, dec("15.00"));
    }

    #[test]
    fn test_quality_scales_processing_only() {
        let engine = QuoteEngine::new();
        let draft = engine
            .quote(&request(ServiceKind::ThreeDPrinting, "petg", "50", Quality::Draft, false))
            .unwrap();
        // 50 × 0.07 × 0.7 = 2.45, + 5.00
        assert_eq!(draft.processing_cost, dec("2.45"));
        assert_eq!(draft.total, dec("7.45"));

        let ultra = engine
            .quote(&request(ServiceKind::ThreeDPrinting, "petg", "50", Quality::Ultra, false))
            .unwrap();
        assert_eq!(ultra.total, dec("12.00"));
        assert_eq!(ultra.setup_fee, draft.setup_fee);
    }

    #[test]
    fn test_rounds_only_at_the_end() {
        let engine = QuoteEngine::new();
        // 0.1 × 0.05 = 0.005; + 5 = 5.005; × 1.5 = 7.5075 → 7.51.
        // Rounding the subtotal first would give 5.01 × 1.5 = 7.515 → 7.52.
        let quote = engine
            .quote(&request(ServiceKind::ThreeDPrinting, "pla", "0.1", Quality::Standard, true))
            .unwrap();
        assert_eq!(quote.total, dec("7.51"));
        assert_eq!(quote.subtotal, dec("5.01"));
    }

    #[test]
    fn test_engraving_has_no_weight() {
        let engine = QuoteEngine::new();
        let quote = engine
            .quote(&request(ServiceKind::LaserEngraving, "acrylic", "200", Quality::Standard, false))
            .unwrap();
        assert_eq!(quote.total, dec("13.00"));
        assert_eq!(quote.estimated_weight_grams, None);
        assert_eq!(quote.estimated_hours, dec("5.00"));
        assert_eq!(quote.unit, "cm2");
    }

    #[test]
    fn test_validation_errors() {
        let engine = QuoteEngine::new();
        let cases = [
            request(ServiceKind::ThreeDPrinting, "unobtainium", "10", Quality::Standard, false),
            request(ServiceKind::LaserEngraving, "pla", "10", Quality::Standard, false),
            request(ServiceKind::ThreeDPrinting, "pla", "0", Quality::Standard, false),
            request(ServiceKind::ThreeDPrinting, "pla", "-5", Quality::Standard, false),
            request(ServiceKind::ThreeDPrinting, "pla", "1000001", Quality::Standard, false),
        ];
        for case in cases {
            assert!(
                matches!(engine.quote(&case), Err(PricingError::Validation(_))),
                "{case:?}"
            );
        }
    }

    #[test]
    fn test_material_listing() {
        let engine = QuoteEngine::new();
        assert_eq!(engine.materials(None).len(), MATERIALS.len());
        let engraving = engine.materials(Some(ServiceKind::LaserEngraving));
        assert_eq!(engraving.len(), 5);
        assert!(engraving.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_material_id_is_case_insensitive() {
        let engine = QuoteEngine::new();
        let quote = engine
            .quote(&request(ServiceKind::ThreeDPrinting, " PLA ", "100", Quality::Standard, false))
            .unwrap();
        assert_eq!(quote.total, dec("10.00"));
    }
}

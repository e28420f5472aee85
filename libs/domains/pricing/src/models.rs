use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum ServiceKind {
    #[serde(rename = "3d_printing")]
    #[strum(serialize = "3d_printing")]
    ThreeDPrinting,
    #[serde(rename = "laser_engraving")]
    #[strum(serialize = "laser_engraving")]
    LaserEngraving,
}

impl ServiceKind {
    /// Unit the job size is measured in.
    pub fn unit(self) -> &'static str {
        match self {
            ServiceKind::ThreeDPrinting => "cm3",
            ServiceKind::LaserEngraving => "cm2",
        }
    }

    /// Machine throughput in units per hour.
    pub fn throughput_per_hour(self) -> Decimal {
        match self {
            ServiceKind::ThreeDPrinting => Decimal::from(12),
            ServiceKind::LaserEngraving => Decimal::from(40),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Quality {
    Draft,
    #[default]
    Standard,
    High,
    Ultra,
}

impl Quality {
    /// Scales the time component of a quote.
    pub fn multiplier(self) -> Decimal {
        match self {
            Quality::Draft => Decimal::new(7, 1),
            Quality::Standard => Decimal::ONE,
            Quality::High => Decimal::new(14, 1),
            Quality::Ultra => Decimal::from(2),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct QuoteRequest {
    pub service: ServiceKind,
    /// Material id, e.g. `pla` or `acrylic`.
    #[validate(length(min = 1, max = 64))]
    pub material: String,
    /// Volume in cm³ for printing, area in cm² for engraving.
    #[serde(alias = "volume_cm3", alias = "area_cm2")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub rush: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Quote {
    pub service: ServiceKind,
    pub material: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub unit: String,
    pub quality: Quality,
    pub rush: bool,
    #[schema(value_type = f64)]
    pub material_rate: Decimal,
    #[schema(value_type = f64)]
    pub quality_multiplier: Decimal,
    #[schema(value_type = f64)]
    pub processing_cost: Decimal,
    #[schema(value_type = f64)]
    pub setup_fee: Decimal,
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    /// Applied to the subtotal when `rush` is set, otherwise 1.
    #[schema(value_type = f64)]
    pub rush_multiplier: Decimal,
    #[schema(value_type = f64)]
    pub total: Decimal,
    /// Printing only.
    #[schema(value_type = Option<f64>)]
    pub estimated_weight_grams: Option<Decimal>,
    #[schema(value_type = f64)]
    pub estimated_hours: Decimal,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_names() {
        assert_eq!(ServiceKind::ThreeDPrinting.to_string(), "3d_printing");
        assert_eq!(
            serde_json::to_value(ServiceKind::LaserEngraving).unwrap(),
            "laser_engraving"
        );
        assert_eq!(
            "3d_printing".parse::<ServiceKind>().unwrap(),
            ServiceKind::ThreeDPrinting
        );
    }

    #[test]
    fn test_request_defaults_and_aliases() {
        let request: QuoteRequest = serde_json::from_value(serde_json::json!({
            "service": "3d_printing",
            "material": "pla",
            "volume_cm3": 100
        }))
        .unwrap();
        assert_eq!(request.amount, Decimal::from(100));
        assert_eq!(request.quality, Quality::Standard);
        assert!(!request.rush);
    }

    #[test]
    fn test_quality_multipliers() {
        assert_eq!(Quality::Draft.multiplier(), "0.7".parse::<Decimal>().unwrap());
        assert_eq!(Quality::High.multiplier(), "1.4".parse::<Decimal>().unwrap());
        assert_eq!(Quality::Ultra.multiplier(), Decimal::from(2));
    }
}

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::ServiceKind;
use ServiceKind::{LaserEngraving, ThreeDPrinting};

/// A material and what it costs per unit of job size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Material {
    #[schema(value_type = String)]
    pub id: &'static str,
    #[schema(value_type = String)]
    pub name: &'static str,
    pub service: ServiceKind,
    /// Price per cm³ (printing) or cm² (engraving).
    #[schema(value_type = f64)]
    pub rate: Decimal,
    /// g/cm³
    #[schema(value_type = f64)]
    pub density: Decimal,
}

const fn material(
    id: &'static str,
    name: &'static str,
    service: ServiceKind,
    rate_hundredths: u32,
    density_hundredths: u32,
) -> Material {
    Material {
        id,
        name,
        service,
        rate: Decimal::from_parts(rate_hundredths, 0, 0, false, 2),
        density: Decimal::from_parts(density_hundredths, 0, 0, false, 2),
    }
}

pub static MATERIALS: [Material; 11] = [
    material("pla", "PLA", ThreeDPrinting, 5, 124),
    material("abs", "ABS", ThreeDPrinting, 6, 104),
    material("petg", "PETG", ThreeDPrinting, 7, 127),
    material("tpu", "TPU (flexible)", ThreeDPrinting, 10, 121),
    material("nylon", "Nylon", ThreeDPrinting, 12, 114),
    material("resin", "Standard resin", ThreeDPrinting, 15, 110),
    material("wood", "Plywood", LaserEngraving, 2, 60),
    material("acrylic", "Acrylic", LaserEngraving, 4, 118),
    material("leather", "Leather", LaserEngraving, 5, 86),
    material("glass", "Glass", LaserEngraving, 6, 250),
    material("anodized_aluminum", "Anodized aluminum", LaserEngraving, 8, 270),
];

/// Case-insensitive lookup by id.
pub fn find_material(id: &str) -> Option<&'static Material> {
    let id = id.trim();
    MATERIALS.iter().find(|m| m.id.eq_ignore_ascii_case(id))
}

//! # Measurement Module
//!
//! Provides the `Dimension` and `Weight` value objects.
//!
//! ## Why Decimal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With f64:                                                              │
//! │    (0.1 + 0.2) / 0.3 = 1.0000000000000002  ❌ over a 1.0 threshold!     │
//! │                                                                         │
//! │  Utilization thresholds are compared at exactly 4 decimal places and   │
//! │  volumes at exactly 2. Float noise would flip accept/reject decisions. │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal + explicit half-up rounding       │
//! │    volume(1.5, 1.5, 1.5) = 3.375 → 3.38                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Unit Conversion Table
//! | From | To | Factor |
//! |------|----|--------|
//! | inches | centimeters | 2.54 |
//! | centimeters | inches | 1 / 2.54, rounded to 4 dp (0.3937) |
//! | pounds | kilograms | 0.453592 |
//! | kilograms | pounds | 1 / 0.453592, rounded to 6 dp (2.204623) |
//!
//! ## Usage
//! ```rust
//! use cartonization_core::measurement::{Dimension, DimensionUnit};
//! use rust_decimal::Decimal;
//!
//! let dims = Dimension::new(
//!     Decimal::from(10),
//!     Decimal::from(5),
//!     Decimal::from(2),
//!     DimensionUnit::Centimeters,
//! )
//! .unwrap();
//! assert_eq!(dims.volume().to_string(), "100.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::MAX_MEASUREMENT;

// =============================================================================
// Rounding Helpers
// =============================================================================

/// Rounds half-up (away from zero) to `dp` decimal places.
///
/// Every value in this crate is positive, so "away from zero" is "up".
#[inline]
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Divides and rounds the quotient half-up to 4 decimal places.
///
/// Returns zero when the denominator is zero.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    round_half_up(numerator / denominator, 4)
}

fn inches_to_centimeters() -> Decimal {
    Decimal::new(254, 2)
}

fn pounds_to_kilograms() -> Decimal {
    Decimal::new(453_592, 6)
}

// =============================================================================
// Dimension Unit
// =============================================================================

/// Length unit of a [`Dimension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DimensionUnit {
    Centimeters,
    Inches,
}

impl DimensionUnit {
    /// Factor that converts a length in `self` into `target`.
    pub fn factor_to(self, target: DimensionUnit) -> Decimal {
        match (self, target) {
            (DimensionUnit::Inches, DimensionUnit::Centimeters) => inches_to_centimeters(),
            (DimensionUnit::Centimeters, DimensionUnit::Inches) => {
                round_half_up(Decimal::ONE / inches_to_centimeters(), 4)
            }
            _ => Decimal::ONE,
        }
    }

    /// Factor that converts a volume in `self`³ into `target`³.
    pub fn volume_factor_to(self, target: DimensionUnit) -> Decimal {
        let factor = self.factor_to(target);
        factor * factor * factor
    }

    /// Short symbol used in display output.
    pub fn symbol(&self) -> &'static str {
        match self {
            DimensionUnit::Centimeters => "cm",
            DimensionUnit::Inches => "in",
        }
    }
}

impl fmt::Display for DimensionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for DimensionUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Ok(DimensionUnit::Centimeters),
            "in" | "inch" | "inches" => Ok(DimensionUnit::Inches),
            other => Err(ValidationError::UnknownUnit(other.to_string())),
        }
    }
}

// =============================================================================
// Weight Unit
// =============================================================================

/// Mass unit of a [`Weight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    Kilograms,
    Pounds,
}

impl WeightUnit {
    /// Factor that converts a mass in `self` into `target`.
    pub fn factor_to(self, target: WeightUnit) -> Decimal {
        match (self, target) {
            (WeightUnit::Pounds, WeightUnit::Kilograms) => pounds_to_kilograms(),
            (WeightUnit::Kilograms, WeightUnit::Pounds) => {
                round_half_up(Decimal::ONE / pounds_to_kilograms(), 6)
            }
            _ => Decimal::ONE,
        }
    }

    /// Short symbol used in display output.
    pub fn symbol(&self) -> &'static str {
        match self {
            WeightUnit::Kilograms => "kg",
            WeightUnit::Pounds => "lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for WeightUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kilogram" | "kilograms" => Ok(WeightUnit::Kilograms),
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Pounds),
            other => Err(ValidationError::UnknownUnit(other.to_string())),
        }
    }
}

// =============================================================================
// Dimension
// =============================================================================

/// Three strictly positive lengths in one unit.
///
/// ## Invariant
/// `length`, `width` and `height` are all > 0. This holds for values built
/// with [`Dimension::new`] and for deserialized values, which go through the
/// same check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDimension")]
pub struct Dimension {
    length: Decimal,
    width: Decimal,
    height: Decimal,
    unit: DimensionUnit,
}

/// Unchecked wire shape of a [`Dimension`].
#[derive(Deserialize)]
struct RawDimension {
    length: Decimal,
    width: Decimal,
    height: Decimal,
    unit: DimensionUnit,
}

impl TryFrom<RawDimension> for Dimension {
    type Error = ValidationError;

    fn try_from(raw: RawDimension) -> Result<Self, Self::Error> {
        Dimension::new(raw.length, raw.width, raw.height, raw.unit)
    }
}

impl Dimension {
    /// Creates a dimension set, rejecting any value that is zero or negative
    /// or above [`MAX_MEASUREMENT`](crate::MAX_MEASUREMENT).
    ///
    /// ## Example
    /// ```rust
    /// use cartonization_core::measurement::{Dimension, DimensionUnit};
    /// use rust_decimal::Decimal;
    ///
    /// let ok = Dimension::new(Decimal::from(3), Decimal::from(2), Decimal::from(1), DimensionUnit::Inches);
    /// assert!(ok.is_ok());
    ///
    /// let bad = Dimension::new(Decimal::ZERO, Decimal::from(2), Decimal::from(1), DimensionUnit::Inches);
    /// assert!(bad.is_err());
    /// ```
    pub fn new(
        length: Decimal,
        width: Decimal,
        height: Decimal,
        unit: DimensionUnit,
    ) -> Result<Self, ValidationError> {
        validate_positive(length, "Length")?;
        validate_positive(width, "Width")?;
        validate_positive(height, "Height")?;
        validate_bounded(length, "Length")?;
        validate_bounded(width, "Width")?;
        validate_bounded(height, "Height")?;

        Ok(Dimension {
            length,
            width,
            height,
            unit,
        })
    }

    #[inline]
    pub fn length(&self) -> Decimal {
        self.length
    }

    #[inline]
    pub fn width(&self) -> Decimal {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Decimal {
        self.height
    }

    #[inline]
    pub fn unit(&self) -> DimensionUnit {
        self.unit
    }

    /// Volume `length × width × height`, rounded half-up to 2 decimal places.
    ///
    /// The result always carries a scale of 2, so `volume(10, 5, 2)` prints
    /// as `100.00`.
    pub fn volume(&self) -> Decimal {
        let mut volume = round_half_up(self.length * self.width * self.height, 2);
        volume.rescale(2);
        volume
    }

    /// Returns the same box expressed in `target` units.
    ///
    /// Identity when the units already match.
    pub fn convert_to(&self, target: DimensionUnit) -> Dimension {
        if self.unit == target {
            return self.clone();
        }

        let factor = self.unit.factor_to(target);
        Dimension {
            length: self.length * factor,
            width: self.width * factor,
            height: self.height * factor,
            unit: target,
        }
    }

    /// Checks whether `item` fits inside this box in some axis-aligned
    /// orientation.
    ///
    /// Both triples are sorted ascending and compared pairwise, so the result
    /// does not depend on which axis is labelled "length".
    pub fn can_contain(&self, item: &Dimension) -> bool {
        let item = item.convert_to(self.unit);
        let outer = self.sorted();
        let inner = item.sorted();

        outer.iter().zip(inner.iter()).all(|(o, i)| i <= o)
    }

    /// The largest of the three values.
    pub fn largest(&self) -> Decimal {
        self.length.max(self.width).max(self.height)
    }

    /// True if any value is zero or negative.
    ///
    /// Cannot be true for a value built through [`Dimension::new`]; kept for
    /// callers validating data of unknown origin.
    pub fn has_zero_or_negative_values(&self) -> bool {
        self.length <= Decimal::ZERO || self.width <= Decimal::ZERO || self.height <= Decimal::ZERO
    }

    fn sorted(&self) -> [Decimal; 3] {
        let mut dims = [self.length, self.width, self.height];
        dims.sort();
        dims
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} x {} {}",
            self.length, self.width, self.height, self.unit
        )
    }
}

// =============================================================================
// Weight
// =============================================================================

/// A strictly positive mass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWeight")]
pub struct Weight {
    value: Decimal,
    unit: WeightUnit,
}

#[derive(Deserialize)]
struct RawWeight {
    value: Decimal,
    unit: WeightUnit,
}

impl TryFrom<RawWeight> for Weight {
    type Error = ValidationError;

    fn try_from(raw: RawWeight) -> Result<Self, Self::Error> {
        Weight::new(raw.value, raw.unit)
    }
}

impl Weight {
    /// Creates a weight, rejecting zero and negative values.
    pub fn new(value: Decimal, unit: WeightUnit) -> Result<Self, ValidationError> {
        validate_positive(value, "Weight value")?;
        Ok(Weight { value, unit })
    }

    #[inline]
    pub fn value(&self) -> Decimal {
        self.value
    }

    #[inline]
    pub fn unit(&self) -> WeightUnit {
        self.unit
    }

    /// Returns the same mass expressed in `target` units.
    pub fn convert_to(&self, target: WeightUnit) -> Weight {
        if self.unit == target {
            return self.clone();
        }

        Weight {
            value: self.value * self.unit.factor_to(target),
            unit: target,
        }
    }

    /// The raw value expressed in `target` units.
    pub fn value_in(&self, target: WeightUnit) -> Decimal {
        self.convert_to(target).value
    }

    /// Compares against `other` after converting it into this unit.
    ///
    /// ## Example
    /// ```rust
    /// use cartonization_core::measurement::{Weight, WeightUnit};
    /// use rust_decimal::Decimal;
    ///
    /// let kg = Weight::new(Decimal::ONE, WeightUnit::Kilograms).unwrap();
    /// let lb = Weight::new(Decimal::ONE, WeightUnit::Pounds).unwrap();
    /// assert!(kg.is_greater_than(&lb));
    /// ```
    pub fn is_greater_than(&self, other: &Weight) -> bool {
        self.value > other.value_in(self.unit)
    }

    /// True if the value is zero or negative.
    pub fn is_zero_or_negative(&self) -> bool {
        self.value <= Decimal::ZERO
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

fn validate_positive(value: Decimal, field: &str) -> Result<(), ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::must_be_positive(field));
    }
    Ok(())
}

fn validate_bounded(value: Decimal, field: &str) -> Result<(), ValidationError> {
    if value > Decimal::from(MAX_MEASUREMENT) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: MAX_MEASUREMENT.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn cm(l: &str, w: &str, h: &str) -> Dimension {
        Dimension::new(d(l), d(w), d(h), DimensionUnit::Centimeters).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let err = Dimension::new(d("0"), d("1"), d("1"), DimensionUnit::Centimeters).unwrap_err();
        assert_eq!(err, ValidationError::must_be_positive("Length"));

        let err = Dimension::new(d("1"), d("-2"), d("1"), DimensionUnit::Inches).unwrap_err();
        assert_eq!(err, ValidationError::must_be_positive("Width"));

        assert!(Dimension::new(d("1"), d("1"), d("0"), DimensionUnit::Inches).is_err());
    }

    #[test]
    fn test_rejects_dimensions_above_ceiling() {
        let err = Dimension::new(
            d("10000000000"),
            d("1"),
            d("1"),
            DimensionUnit::Centimeters,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "Length"));

        let err = Dimension::new(d("1"), d("1"), d("1000000.01"), DimensionUnit::Inches).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "Height"));
    }

    #[test]
    fn test_largest_dimension_converts_without_overflow() {
        let max = Decimal::from(MAX_MEASUREMENT);
        let cube = Dimension::new(max, max, max, DimensionUnit::Inches).unwrap();

        let in_cm = cube.convert_to(DimensionUnit::Centimeters);
        assert_eq!(in_cm.length(), d("2540000.00"));
        assert!(in_cm.volume() > cube.volume());
    }

    #[test]
    fn test_volume_is_rounded_to_two_places() {
        assert_eq!(cm("10", "5", "2").volume().to_string(), "100.00");
        assert_eq!(cm("10", "5", "2").volume(), d("100.00"));
        // 3.375 rounds half-up
        assert_eq!(cm("1.5", "1.5", "1.5").volume(), d("3.38"));
        // 0.001 rounds down
        assert_eq!(cm("0.1", "0.1", "0.1").volume(), d("0.00"));
    }

    #[test]
    fn test_can_contain_is_rotation_invariant() {
        let carton = [d("30"), d("20"), d("10")];
        let item = [d("9"), d("25"), d("18")];
        let perms = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];

        for p in perms {
            let outer = Dimension::new(
                carton[p[0]],
                carton[p[1]],
                carton[p[2]],
                DimensionUnit::Centimeters,
            )
            .unwrap();
            for q in perms {
                let inner = Dimension::new(
                    item[q[0]],
                    item[q[1]],
                    item[q[2]],
                    DimensionUnit::Centimeters,
                )
                .unwrap();
                assert!(outer.can_contain(&inner));
            }
        }
    }

    #[test]
    fn test_can_contain_rejects_any_oversized_axis() {
        let carton = cm("30", "20", "10");
        assert!(!carton.can_contain(&cm("11", "11", "11")));
        assert!(!carton.can_contain(&cm("31", "1", "1")));
        assert!(carton.can_contain(&cm("30", "20", "10")));
    }

    #[test]
    fn test_can_contain_normalizes_units() {
        let carton = cm("30", "30", "30");
        let ten_inches = Dimension::new(d("10"), d("10"), d("10"), DimensionUnit::Inches).unwrap();
        let twelve_inches =
            Dimension::new(d("12"), d("12"), d("12"), DimensionUnit::Inches).unwrap();

        assert!(carton.can_contain(&ten_inches)); // 25.4 cm
        assert!(!carton.can_contain(&twelve_inches)); // 30.48 cm
    }

    #[test]
    fn test_dimension_round_trip() {
        let inches = Dimension::new(d("10"), d("4"), d("7.5"), DimensionUnit::Inches).unwrap();
        let back = inches
            .convert_to(DimensionUnit::Centimeters)
            .convert_to(DimensionUnit::Inches);

        assert_eq!(back.unit(), DimensionUnit::Inches);
        assert!((back.length() - d("10")).abs() < d("0.001"));
        assert!((back.width() - d("4")).abs() < d("0.001"));
        assert!((back.height() - d("7.5")).abs() < d("0.001"));

        let centimeters = cm("100", "50", "25");
        let back = centimeters
            .convert_to(DimensionUnit::Inches)
            .convert_to(DimensionUnit::Centimeters);
        assert!((back.length() - d("100")).abs() < d("0.001"));
    }

    #[test]
    fn test_convert_to_same_unit_is_identity() {
        let dims = cm("4", "5", "6");
        assert_eq!(dims.convert_to(DimensionUnit::Centimeters), dims);
    }

    #[test]
    fn test_weight_rejects_non_positive() {
        assert!(Weight::new(d("0"), WeightUnit::Kilograms).is_err());
        assert!(Weight::new(d("-1"), WeightUnit::Kilograms).is_err());
        assert!(Weight::new(d("5.5"), WeightUnit::Kilograms).is_ok());
    }

    #[test]
    fn test_weight_round_trip() {
        let kg = Weight::new(d("10"), WeightUnit::Kilograms).unwrap();
        let pounds = kg.convert_to(WeightUnit::Pounds);
        assert!(pounds.value() > kg.value());

        let back = pounds.convert_to(WeightUnit::Kilograms);
        assert!((back.value() - d("10")).abs() < d("0.001"));

        let lb = Weight::new(d("3"), WeightUnit::Pounds).unwrap();
        let back = lb.convert_to(WeightUnit::Kilograms).convert_to(WeightUnit::Pounds);
        assert!((back.value() - d("3")).abs() < d("0.001"));
    }

    #[test]
    fn test_weight_comparison_normalizes_units() {
        let heavy = Weight::new(d("10"), WeightUnit::Kilograms).unwrap();
        let light = Weight::new(d("5"), WeightUnit::Kilograms).unwrap();
        assert!(heavy.is_greater_than(&light));
        assert!(!light.is_greater_than(&heavy));

        let one_kg = Weight::new(d("1"), WeightUnit::Kilograms).unwrap();
        let two_lb = Weight::new(d("2"), WeightUnit::Pounds).unwrap();
        let three_lb = Weight::new(d("3"), WeightUnit::Pounds).unwrap();
        assert!(one_kg.is_greater_than(&two_lb));
        assert!(three_lb.is_greater_than(&one_kg));
    }

    #[test]
    fn test_conversion_factors() {
        assert_eq!(
            DimensionUnit::Centimeters.factor_to(DimensionUnit::Inches),
            d("0.3937")
        );
        assert_eq!(
            WeightUnit::Kilograms.factor_to(WeightUnit::Pounds),
            d("2.204623")
        );
        assert_eq!(
            DimensionUnit::Inches.volume_factor_to(DimensionUnit::Centimeters),
            d("16.387064")
        );
    }

    #[test]
    fn test_deserialize_rejects_oversized_dimension() {
        let json = r#"{"length":"10000000000","width":"1","height":"1","unit":"centimeters"}"#;
        assert!(serde_json::from_str::<Dimension>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_invalid_values() {
        let ok: Dimension =
            serde_json::from_str(r#"{"length":"10","width":5,"height":2,"unit":"centimeters"}"#)
                .unwrap();
        assert_eq!(ok.volume(), d("100"));

        let bad = serde_json::from_str::<Dimension>(
            r#"{"length":"0","width":5,"height":2,"unit":"centimeters"}"#,
        );
        assert!(bad.is_err());

        let bad = serde_json::from_str::<Weight>(r#"{"value":"-1","unit":"kilograms"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("cm".parse::<DimensionUnit>().unwrap(), DimensionUnit::Centimeters);
        assert_eq!("Inches".parse::<DimensionUnit>().unwrap(), DimensionUnit::Inches);
        assert_eq!("lbs".parse::<WeightUnit>().unwrap(), WeightUnit::Pounds);
        assert!("furlong".parse::<DimensionUnit>().is_err());
    }
}

//! Money types and the frozen order-amount derivation.
//!
//! All monetary arithmetic uses [`rust_decimal::Decimal`]; amounts are held
//! in the currency's major unit (rupees, not paise). Conversion to the
//! payment provider's integer minor units happens at the provider boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// The ISO 4217 code as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INR" => Ok(Self::INR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}

/// One line of a cart snapshot, reduced to the fields that price it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePrice {
    /// List price per unit.
    pub unit_price: Decimal,
    /// Discounted price per unit, when a discount applies.
    pub discount_price: Option<Decimal>,
    /// Units purchased.
    pub quantity: u32,
}

impl LinePrice {
    /// The price actually charged per unit: the discount price when present.
    #[must_use]
    pub fn effective_unit_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.unit_price)
    }
}

/// Shipping charge policy applied at order time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingPolicy {
    /// A flat charge on every order. `Flat(Decimal::ZERO)` is free shipping.
    Flat(Decimal),
    /// A flat charge, waived once the subtotal reaches the threshold.
    FreeOver {
        /// Subtotal at which shipping becomes free.
        threshold: Decimal,
        /// Charge below the threshold.
        rate: Decimal,
    },
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self::Flat(Decimal::ZERO)
    }
}

impl ShippingPolicy {
    /// The shipping charge for a given order subtotal.
    #[must_use]
    pub fn charge(&self, subtotal: Decimal) -> Decimal {
        match *self {
            Self::Flat(rate) => rate,
            Self::FreeOver { threshold, rate } => {
                if subtotal >= threshold {
                    Decimal::ZERO
                } else {
                    rate
                }
            }
        }
    }
}

/// Pricing rules in force when an order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Tax rate applied to the shipped subtotal (0.18 = 18% GST).
    pub tax_rate: Decimal,
    /// Shipping charge policy.
    pub shipping: ShippingPolicy,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(18, 2),
            shipping: ShippingPolicy::default(),
        }
    }
}

/// The frozen amount breakdown stored on an order.
///
/// Derived once at order creation and never recomputed: price or policy
/// changes after the fact must not alter historical orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAmount {
    /// Sum of effective line prices times quantities.
    pub subtotal: Decimal,
    /// Shipping charge under the policy in force at order time.
    pub shipping: Decimal,
    /// Tax on subtotal plus shipping.
    pub tax: Decimal,
    /// Grand total.
    pub total: Decimal,
}

impl OrderAmount {
    /// Derive the breakdown for a cart snapshot under the given policy.
    #[must_use]
    pub fn derive<I>(lines: I, policy: &PricingPolicy) -> Self
    where
        I: IntoIterator<Item = LinePrice>,
    {
        let subtotal: Decimal = lines
            .into_iter()
            .map(|line| line.effective_unit_price() * Decimal::from(line.quantity))
            .sum();
        let shipping = policy.shipping.charge(subtotal);
        let tax = (subtotal + shipping) * policy.tax_rate;
        let total = subtotal + shipping + tax;

        Self {
            subtotal,
            shipping,
            tax,
            total,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(unit: i64, discount: Option<i64>, quantity: u32) -> LinePrice {
        LinePrice {
            unit_price: Decimal::from(unit),
            discount_price: discount.map(Decimal::from),
            quantity,
        }
    }

    #[test]
    fn test_effective_unit_price_prefers_discount() {
        assert_eq!(
            line(100, Some(80), 1).effective_unit_price(),
            Decimal::from(80)
        );
        assert_eq!(line(100, None, 1).effective_unit_price(), Decimal::from(100));
    }

    #[test]
    fn test_derive_reference_cart() {
        // 2 x 100 + 1 x 80 (discounted from 100) = 280
        // tax at 18% = 50.4, free shipping, total 330.4
        let policy = PricingPolicy::default();
        let amount = OrderAmount::derive(
            vec![line(100, None, 2), line(100, Some(80), 1)],
            &policy,
        );

        assert_eq!(amount.subtotal, Decimal::from(280));
        assert_eq!(amount.shipping, Decimal::ZERO);
        assert_eq!(amount.tax, Decimal::new(504, 1));
        assert_eq!(amount.total, Decimal::new(3304, 1));
    }

    #[test]
    fn test_derive_empty_cart_is_zero() {
        let amount = OrderAmount::derive(Vec::new(), &PricingPolicy::default());
        assert_eq!(amount.subtotal, Decimal::ZERO);
        assert_eq!(amount.total, Decimal::ZERO);
    }

    #[test]
    fn test_flat_shipping_is_taxed() {
        let policy = PricingPolicy {
            tax_rate: Decimal::new(10, 2),
            shipping: ShippingPolicy::Flat(Decimal::from(50)),
        };
        let amount = OrderAmount::derive(vec![line(100, None, 1)], &policy);

        assert_eq!(amount.subtotal, Decimal::from(100));
        assert_eq!(amount.shipping, Decimal::from(50));
        assert_eq!(amount.tax, Decimal::from(15));
        assert_eq!(amount.total, Decimal::from(165));
    }

    #[test]
    fn test_free_over_threshold() {
        let shipping = ShippingPolicy::FreeOver {
            threshold: Decimal::from(500),
            rate: Decimal::from(40),
        };
        assert_eq!(shipping.charge(Decimal::from(499)), Decimal::from(40));
        assert_eq!(shipping.charge(Decimal::from(500)), Decimal::ZERO);
        assert_eq!(shipping.charge(Decimal::from(501)), Decimal::ZERO);
    }

    #[test]
    fn test_currency_code_roundtrip() {
        assert_eq!("INR".parse::<CurrencyCode>().unwrap(), CurrencyCode::INR);
        assert_eq!(CurrencyCode::USD.to_string(), "USD");
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_currency_serde() {
        let json = serde_json::to_string(&CurrencyCode::INR).unwrap();
        assert_eq!(json, "\"INR\"");
        let parsed: CurrencyCode = serde_json::from_str("\"GBP\"").unwrap();
        assert_eq!(parsed, CurrencyCode::GBP);
    }
}

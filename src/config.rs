use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{AmortizationError, Result};

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// annual rates above this are rejected as absurd
    pub max_annual_rate: Rate,
    /// longest term accepted, also bounds the term search for prepayments
    pub max_term_months: u32,
    /// scale applied to monetary output
    pub output_decimal_places: u32,
    /// residual balance treated as paid off when solving for a term
    pub settlement_tolerance: Money,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_annual_rate: Rate::from_percentage(25),
            max_term_months: 600,
            output_decimal_places: 2,
            settlement_tolerance: Money::from_decimal(dec!(0.005)),
        }
    }
}

impl EngineConfig {
    /// tighter bounds for residential mortgages
    pub fn strict() -> Self {
        Self {
            max_annual_rate: Rate::from_percentage(15),
            max_term_months: 480,
            ..Self::default()
        }
    }

    /// parse a configuration from json, missing fields fall back to defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| AmortizationError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// reject a monthly rate that is negative or above the configured ceiling
    pub fn check_monthly_rate(&self, monthly_rate: Rate) -> Result<()> {
        let ceiling = self.max_annual_rate.monthly_rate();
        if monthly_rate.is_negative() || monthly_rate > ceiling {
            return Err(AmortizationError::invalid_input(format!(
                "monthly rate {} outside 0..={}",
                monthly_rate.as_decimal(),
                ceiling.as_decimal()
            )));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_annual_rate.is_negative()
            || self.max_annual_rate.is_zero()
            || self.max_annual_rate > Rate::ONE
        {
            return Err(AmortizationError::InvalidConfiguration {
                message: format!(
                    "max_annual_rate must be above 0% and at most 100%, got {}",
                    self.max_annual_rate
                ),
            });
        }
        if self.max_term_months == 0 {
            return Err(AmortizationError::InvalidConfiguration {
                message: "max_term_months must be positive".to_string(),
            });
        }
        if self.output_decimal_places > 10 {
            return Err(AmortizationError::InvalidConfiguration {
                message: format!(
                    "output_decimal_places must be at most 10, got {}",
                    self.output_decimal_places
                ),
            });
        }
        if self.settlement_tolerance.is_negative() || self.settlement_tolerance > Money::ONE {
            return Err(AmortizationError::InvalidConfiguration {
                message: format!(
                    "settlement_tolerance must be between 0 and 1, got {}",
                    self.settlement_tolerance
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::strict().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "max_term_months": 360 }"#).unwrap();
        assert_eq!(config.max_term_months, 360);
        assert_eq!(config.output_decimal_places, 2);
        assert_eq!(config.max_annual_rate, Rate::from_percentage(25));
    }

    #[test]
    fn test_decimal_fields_from_strings() {
        let config = EngineConfig::from_json_str(
            r#"{ "max_annual_rate": "0.12", "settlement_tolerance": "0.01" }"#,
        )
        .unwrap();
        assert_eq!(config.max_annual_rate, Rate::from_percentage(12));
        assert_eq!(config.settlement_tolerance, Money::CENT);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = EngineConfig::from_json_str(r#"{ "max_term_months": 0 }"#).unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidConfiguration { .. }));

        let err = EngineConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_rate_ceiling_bounded() {
        let err = EngineConfig::from_json_str(r#"{ "max_annual_rate": "10" }"#).unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidConfiguration { .. }));

        let config = EngineConfig::from_json_str(r#"{ "max_annual_rate": "1" }"#).unwrap();
        assert_eq!(config.max_annual_rate, Rate::from_percentage(100));
    }

    #[test]
    fn test_check_monthly_rate() {
        let config = EngineConfig::default();
        assert!(config.check_monthly_rate(Rate::from_percentage(25).monthly_rate()).is_ok());
        assert!(config.check_monthly_rate(Rate::ZERO).is_ok());

        let err = config.check_monthly_rate(Rate::from_percentage(26).monthly_rate()).unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidInput { .. }));
        assert!(config.check_monthly_rate(Rate::from_bps(-1)).is_err());
    }
}

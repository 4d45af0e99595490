//! Back-solving the sell price that realizes a target profit on a spot buy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::lenient::loose_decimal;
use crate::domain::Decimal;

/// Calculator inputs. Every field is read leniently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotTargetInput {
    #[serde(default, deserialize_with = "loose_decimal")]
    pub buy_quantity: Option<Decimal>,
    #[serde(default, deserialize_with = "loose_decimal")]
    pub buy_price_per_token: Option<Decimal>,
    #[serde(default, rename = "buyFeesUSD", deserialize_with = "loose_decimal")]
    pub buy_fees_usd: Option<Decimal>,
    #[serde(default, rename = "targetProfitUSD", deserialize_with = "loose_decimal")]
    pub target_profit_usd: Option<Decimal>,
    #[serde(default, rename = "estimatedSellFeeUSD", deserialize_with = "loose_decimal")]
    pub estimated_sell_fee_usd: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum SpotTargetError {
    #[error("invalid buy data")]
    #[serde(rename = "invalid buy data")]
    InvalidBuyData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotTargetMetrics {
    pub sell_price_per_token_needed: Option<Decimal>,
    pub total_sell_value: Option<Decimal>,
    pub error: Option<SpotTargetError>,
}

impl SpotTargetMetrics {
    fn invalid() -> Self {
        SpotTargetMetrics {
            sell_price_per_token_needed: None,
            total_sell_value: None,
            error: Some(SpotTargetError::InvalidBuyData),
        }
    }
}

/// Sell price per token needed so that, after buy and sell fees, the
/// position nets `target_profit_usd`.
///
/// Requires `buy_quantity > 0` and `buy_price_per_token >= 0`; fees and the
/// profit target default to zero when absent. Amounts too large to represent
/// are reported as invalid buy data.
pub fn calculate_spot_target_metrics(input: &SpotTargetInput) -> SpotTargetMetrics {
    let (Some(quantity), Some(price)) = (input.buy_quantity, input.buy_price_per_token) else {
        return SpotTargetMetrics::invalid();
    };
    if !quantity.is_positive() || price.is_negative() {
        return SpotTargetMetrics::invalid();
    }

    let revenue = quantity
        .checked_mul(price)
        .and_then(|cost| cost.checked_add(input.buy_fees_usd.unwrap_or_default()))
        .and_then(|investment| investment.checked_add(input.target_profit_usd.unwrap_or_default()))
        .and_then(|total| total.checked_add(input.estimated_sell_fee_usd.unwrap_or_default()));
    let Some(total_revenue_needed) = revenue else {
        return SpotTargetMetrics::invalid();
    };
    let Some(sell_price) = total_revenue_needed.checked_div(quantity) else {
        return SpotTargetMetrics::invalid();
    };

    SpotTargetMetrics {
        sell_price_per_token_needed: Some(sell_price),
        total_sell_value: Some(total_revenue_needed),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_reference_example() {
        let input = SpotTargetInput {
            buy_quantity: Some(d("10")),
            buy_price_per_token: Some(d("5")),
            buy_fees_usd: Some(d("2")),
            target_profit_usd: Some(d("20")),
            estimated_sell_fee_usd: Some(d("3")),
        };
        let result = calculate_spot_target_metrics(&input);
        assert_eq!(result.sell_price_per_token_needed, Some(d("7.5")));
        assert_eq!(result.total_sell_value, Some(d("75")));
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_optional_inputs_default_to_zero() {
        let input: SpotTargetInput = serde_json::from_value(json!({
            "buyQuantity": "4",
            "buyPricePerToken": 2.5,
            "targetProfitUSD": "lots",
            "estimatedSellFeeUSD": null
        }))
        .unwrap();
        let result = calculate_spot_target_metrics(&input);
        assert_eq!(result.sell_price_per_token_needed, Some(d("2.5")));
        assert_eq!(result.total_sell_value, Some(d("10")));
    }

    #[test]
    fn test_invalid_buy_data() {
        for input in [
            SpotTargetInput::default(),
            SpotTargetInput {
                buy_quantity: Some(Decimal::zero()),
                buy_price_per_token: Some(d("1")),
                ..Default::default()
            },
            SpotTargetInput {
                buy_quantity: Some(d("1")),
                buy_price_per_token: Some(d("-1")),
                ..Default::default()
            },
        ] {
            let result = calculate_spot_target_metrics(&input);
            assert_eq!(result.sell_price_per_token_needed, None);
            assert_eq!(result.total_sell_value, None);
            assert_eq!(result.error, Some(SpotTargetError::InvalidBuyData));
        }
    }

    #[test]
    fn test_amounts_out_of_range_are_invalid() {
        let input = SpotTargetInput {
            buy_quantity: Some(d("1e20")),
            buy_price_per_token: Some(d("1e20")),
            ..Default::default()
        };
        let result = calculate_spot_target_metrics(&input);
        assert_eq!(result.error, Some(SpotTargetError::InvalidBuyData));
        assert_eq!(result.total_sell_value, None);
    }

    #[test]
    fn test_free_tokens_are_allowed() {
        let input = SpotTargetInput {
            buy_quantity: Some(d("100")),
            buy_price_per_token: Some(Decimal::zero()),
            target_profit_usd: Some(d("50")),
            ..Default::default()
        };
        let result = calculate_spot_target_metrics(&input);
        assert_eq!(result.sell_price_per_token_needed, Some(d("0.5")));
    }

    #[test]
    fn test_error_serializes_as_message() {
        let json = serde_json::to_value(calculate_spot_target_metrics(&SpotTargetInput::default()))
            .unwrap();
        assert_eq!(json["error"], "invalid buy data");
        assert!(json["sellPricePerTokenNeeded"].is_null());
    }
}

//! 가격 표시를 위한 Decimal 유틸리티.
//!
//! 외부 API는 가격을 `f64`로 내려주지만 봇 메시지에는 소수점 둘째 자리까지의
//! 안정적인 표기가 필요하므로 `Decimal`로 변환해 보관합니다.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 값이 없을 때 메시지에 표시되는 문자열.
pub const NOT_AVAILABLE: &str = "N/A";

/// `f64` 가격을 소수점 둘째 자리로 반올림한 `Price`로 변환합니다.
///
/// NaN, 무한대 등 표현할 수 없는 값은 `None`이 됩니다.
pub fn price_from_f64(value: f64) -> Option<Price> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero).normalize())
}

/// 선택적 가격을 표시용 문자열로 변환합니다 (없으면 `N/A`).
pub fn format_price(price: Option<Price>) -> String {
    price
        .map(|p| p.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_from_f64_rounds_to_two_places() {
        assert_eq!(price_from_f64(2850.0549), Some(dec!(2850.05)));
        assert_eq!(price_from_f64(99.999), Some(dec!(100)));
        assert_eq!(price_from_f64(1500.0), Some(dec!(1500)));
    }

    #[test]
    fn test_price_from_f64_rejects_non_finite() {
        assert_eq!(price_from_f64(f64::NAN), None);
        assert_eq!(price_from_f64(f64::INFINITY), None);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(dec!(101.5))), "101.5");
        assert_eq!(format_price(None), "N/A");
    }
}

//! 널 안전 수치 헬퍼.
//!
//! 외부에서 들어오는 모든 지표 값은 `coerce`/`finite`를 거쳐
//! 유한한 `f64` 또는 `None`(알 수 없음)이 됩니다. 예외 없이 null만 전파합니다.

/// 문자열을 유한한 실수로 변환합니다.
///
/// 빈 문자열, 숫자가 아닌 값, NaN, 무한대는 `None`을 반환합니다.
pub fn coerce(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().and_then(finite)
}

/// 유한한 값만 통과시킵니다.
#[inline]
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// `Option<f64>`에서 NaN/무한대를 걸러냅니다.
#[inline]
pub fn finite_opt(value: Option<f64>) -> Option<f64> {
    value.and_then(finite)
}

/// 값을 `[lo, hi]` 범위로 제한합니다.
///
/// `lo <= hi`는 호출자의 전제 조건입니다.
#[inline]
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    debug_assert!(lo <= hi, "clamp bounds inverted: {} > {}", lo, hi);
    value.max(lo).min(hi)
}

/// 안전한 나눗셈.
///
/// 피연산자가 null이거나 유한하지 않거나 분모가 0이면 `None`.
pub fn safe_div(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    let a = finite_opt(a)?;
    let b = finite_opt(b)?;
    if b == 0.0 {
        return None;
    }
    finite(a / b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("0.25"), Some(0.25));
        assert_eq!(coerce("  -3 "), Some(-3.0));
        assert_eq!(coerce("1e-3"), Some(0.001));
        assert_eq!(coerce(""), None);
        assert_eq!(coerce("   "), None);
        assert_eq!(coerce("abc"), None);
        assert_eq!(coerce("NaN"), None);
        assert_eq!(coerce("inf"), None);
        assert_eq!(coerce("-Infinity"), None);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.4, 0.0, 1.0), 0.4);
        assert_eq!(clamp(2.0, 2.0, 2.0), 2.0);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(Some(110.0), Some(100.0)), Some(1.1));
        assert_eq!(safe_div(Some(1.0), Some(0.0)), None);
        assert_eq!(safe_div(None, Some(1.0)), None);
        assert_eq!(safe_div(Some(1.0), None), None);
        assert_eq!(safe_div(Some(f64::NAN), Some(1.0)), None);
        assert_eq!(safe_div(Some(1.0), Some(f64::INFINITY)), None);
    }

    proptest! {
        #[test]
        fn prop_clamp_stays_in_bounds(v in -1e9f64..1e9, lo in -100.0f64..0.0, width in 0.0f64..100.0) {
            let hi = lo + width;
            let c = clamp(v, lo, hi);
            prop_assert!(c >= lo && c <= hi);
        }

        #[test]
        fn prop_coerce_is_finite_or_none(s in "\\PC*") {
            if let Some(v) = coerce(&s) {
                prop_assert!(v.is_finite());
            }
        }
    }
}

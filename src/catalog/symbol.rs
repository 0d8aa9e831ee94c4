use super::MarketClass;

/// Result of validating a symbol against a market class (spec §4.1).
///
/// Validation is purely syntactic: liveness of the symbol is discovered
/// only at fetch time, per spec §4.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Ok,
    Rejected { suggestion: Option<String> },
}

/// Validate `symbol`'s shape against `market`.
///
/// - spot / linear: `{BASE}{QUOTE}`, e.g. `BTCUSDT`.
/// - inverse: `{BASE}USD_PERP` or `{BASE}USD_{EXPIRY8}`, e.g.
///   `BTCUSD_PERP`, `BTCUSD_240927`.
#[must_use]
pub fn validate(symbol: &str, market: MarketClass) -> ValidationOutcome {
    let ok = match market {
        MarketClass::Spot | MarketClass::FuturesLinear => is_linear_shape(symbol),
        MarketClass::FuturesInverse => is_inverse_shape(symbol),
    };

    if ok {
        ValidationOutcome::Ok
    } else {
        ValidationOutcome::Rejected {
            suggestion: normalize(symbol, market),
        }
    }
}

/// Suggest a corrected form of `symbol` for `market`, if one is derivable.
///
/// Per spec §4.1: "if `market = futures-inverse` and the symbol ends with
/// `USDT`, the suggestion replaces the suffix with `USD_PERP`; otherwise no
/// suggestion."
#[must_use]
pub fn normalize(symbol: &str, market: MarketClass) -> Option<String> {
    if market == MarketClass::FuturesInverse {
        if let Some(base) = symbol.strip_suffix("USDT") {
            return Some(format!("{base}USD_PERP"));
        }
    }
    None
}

fn is_linear_shape(symbol: &str) -> bool {
    symbol.len() >= 3
        && symbol
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

fn is_inverse_shape(symbol: &str) -> bool {
    if let Some(base) = symbol.strip_suffix("USD_PERP") {
        return is_base(base);
    }
    if let Some((base, expiry)) = symbol.rsplit_once("USD_") {
        return is_base(base) && expiry.len() == 6 && expiry.bytes().all(|b| b.is_ascii_digit());
    }
    false
}

fn is_base(base: &str) -> bool {
    !base.is_empty() && base.bytes().all(|b| b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spot_accepts_plain_pair() {
        assert_eq!(validate("BTCUSDT", MarketClass::Spot), ValidationOutcome::Ok);
    }

    #[test]
    fn inverse_accepts_perp_and_quarterly() {
        assert_eq!(
            validate("BTCUSD_PERP", MarketClass::FuturesInverse),
            ValidationOutcome::Ok
        );
        assert_eq!(
            validate("BTCUSD_240927", MarketClass::FuturesInverse),
            ValidationOutcome::Ok
        );
    }

    #[test]
    fn inverse_rejects_usdt_pair_but_suggests_repair() {
        let outcome = validate("BTCUSDT", MarketClass::FuturesInverse);
        assert_eq!(
            outcome,
            ValidationOutcome::Rejected {
                suggestion: Some("BTCUSD_PERP".to_string())
            }
        );
    }

    #[test]
    fn spot_rejects_inverse_shape_with_no_suggestion() {
        let outcome = validate("BTCUSD_PERP", MarketClass::Spot);
        assert_eq!(
            outcome,
            ValidationOutcome::Rejected { suggestion: None }
        );
    }
}

//! Transaction cost estimates in USD.

/// Gas used by a plain ETH transfer.
pub const ETH_TRANSFER_GAS: u64 = 21_000;
/// Typical gas used by an ERC-20 (USDT) transfer.
pub const USDT_TRANSFER_GAS: u64 = 65_000;

const GWEI_PER_ETH: f64 = 1e9;

/// `fee_gwei * gas_limit / 1e9 * price`, rounded to 4 decimals.
///
/// A zero, negative or non-finite price yields `0.0` so the display degrades
/// instead of failing while the price feed is stale.
pub fn estimate_usd_cost(fee_gwei: f64, price_usd: f64, gas_limit: u64) -> f64 {
    if !(price_usd.is_finite() && price_usd > 0.0) || !fee_gwei.is_finite() {
        return 0.0;
    }
    let eth = fee_gwei * gas_limit as f64 / GWEI_PER_ETH;
    round4(eth * price_usd)
}

/// Same as [`estimate_usd_cost`] for an optional cached quote.
pub fn estimate_with_quote(fee_gwei: f64, price_usd: Option<f64>, gas_limit: u64) -> f64 {
    price_usd
        .map(|p| estimate_usd_cost(fee_gwei, p, gas_limit))
        .unwrap_or(0.0)
}

// Goes through the shortest-decimal formatter so ties resolve on the exact
// binary value (half-to-even), not on a scaled-and-rounded approximation.
fn round4(x: f64) -> f64 {
    format!("{x:.4}").parse().unwrap_or(0.0)
}

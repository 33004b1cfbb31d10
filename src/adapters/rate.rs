//! Rate computation protocol
//!
//! A rate quote is derived from two independent upstream calls: the pair
//! limits, then the amount estimate. Upstream services rate-limit per API
//! key, so a fixed pause separates the two calls. The derived rate may be
//! stale if the upstream price moves between them; that is accepted.

use std::time::Duration;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::types::{EstimateAmount, ExchangeRateInfo, ExchangeRateRequest, QueryLimits};

/// Pause between the limits call and the estimate call
pub const RATE_PACING_DELAY: Duration = Duration::from_secs(1);

/// Combine limits and estimate into an [`ExchangeRateInfo`].
///
/// Fails with `InvalidQuote` when the estimate is zero or the rate is not finite.
pub fn derive_rate_info(
    exchange: &'static str,
    request: &ExchangeRateRequest,
    limits: QueryLimits,
    estimate: &EstimateAmount,
) -> ExchangeResult<ExchangeRateInfo> {
    if estimate.estimated_amount == 0.0 {
        return Err(ExchangeError::InvalidQuote {
            exchange,
            reason: format!(
                "estimated amount is 0 for {} {} -> {}",
                request.amount, request.from, request.to
            ),
        });
    }

    let exchange_rate = request.amount / estimate.estimated_amount;
    if !exchange_rate.is_finite() {
        return Err(ExchangeError::InvalidQuote {
            exchange,
            reason: format!(
                "rate is not finite ({} / {})",
                request.amount, estimate.estimated_amount
            ),
        });
    }

    Ok(ExchangeRateInfo {
        exchange_rate,
        min: limits.min,
        max: limits.max,
        estimated_amount: estimate.estimated_amount,
    })
}

/// limits → pause → estimate → derive
pub async fn paced_rate_info<A>(adapter: &A, request: &ExchangeRateRequest) -> ExchangeResult<ExchangeRateInfo>
where
    A: ExchangeAdapter + ?Sized,
{
    let exchange = adapter.exchange_name();

    let limits = adapter.query_limits(&request.from, &request.to).await?;
    tracing::debug!(
        exchange,
        from = %request.from,
        to = %request.to,
        min = limits.min,
        max = limits.max,
        "Limits fetched, pacing before estimate"
    );

    tokio::time::sleep(RATE_PACING_DELAY).await;

    let estimate = adapter.estimate_amount(request).await?;
    derive_rate_info(exchange, request, limits, &estimate)
}

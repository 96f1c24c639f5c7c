//! 趋势预测
//!
//! 以交易日序号为自变量、收盘价为因变量做一元最小二乘拟合，
//! 外推下一个交易日的价格

use crate::error::AppError;
use crate::models::{ForecastResult, PriceBar};

/// 保留两位小数，恰好位于中点时取偶数（187.125 → 187.12）
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// 拟合直线 close = slope * index + intercept
///
/// 只有一个点时退化为水平线
fn fit_line(closes: &[f64]) -> (f64, f64) {
    let n = closes.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = closes.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (i, &y) in closes.iter().enumerate() {
        let x = i as f64;
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean) * (x - x_mean);
    }

    if denominator == 0.0 {
        return (0.0, closes[0]);
    }

    let slope = numerator / denominator;
    let intercept = y_mean - slope * x_mean;
    (slope, intercept)
}

/// 预测下一交易日价格
///
/// `bars` 须按时间升序排列；为空时返回 `InsufficientData`
pub fn estimate(bars: &[PriceBar]) -> Result<ForecastResult, AppError> {
    let last = bars.last().ok_or(AppError::InsufficientData)?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let (slope, intercept) = fit_line(&closes);
    let predicted = slope * closes.len() as f64 + intercept;

    Ok(ForecastResult {
        latest_price: round2(last.close),
        predicted_price: round2(predicted),
    })
}

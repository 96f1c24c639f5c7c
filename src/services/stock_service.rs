//! 股票预测服务
//!
//! 负责预测接口的完整流程（取数、拟合、组装响应）以及行情条涨跌幅扫描

use futures::stream::{self, StreamExt};

use crate::error::AppError;
use crate::models::{
    ChartPoint, ForecastResult, PredictResponse, PriceBar, Snapshot, TickerChange, NOT_AVAILABLE,
    NO_SUMMARY,
};
use crate::services::estimator::{estimate, round2};
use crate::services::gateway::MarketDataGateway;

/// 规范化股票代码：去除首尾空白并转为大写
pub fn normalize_symbol(raw: Option<&str>) -> Result<String, AppError> {
    let symbol = raw.map(str::trim).unwrap_or_default().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::NoSymbolProvided);
    }
    Ok(symbol)
}

/// 预测下一交易日价格并组装响应
pub async fn predict(
    gateway: &dyn MarketDataGateway,
    symbol: &str,
    period: &str,
) -> Result<PredictResponse, AppError> {
    let bars = gateway.get_history(symbol, period).await?;
    if bars.is_empty() {
        return Err(AppError::NoDataFound(symbol.to_string()));
    }

    let forecast = estimate(&bars)?;
    let snapshot = gateway.get_snapshot(symbol).await?;

    log::info!(
        "{} 最新价 {} 预测价 {}（{} 个交易日）",
        symbol,
        forecast.latest_price,
        forecast.predicted_price,
        bars.len()
    );

    Ok(assemble_prediction(symbol, &forecast, &bars, snapshot))
}

/// 组装预测响应，快照中缺失的字段使用默认值
pub fn assemble_prediction(
    symbol: &str,
    forecast: &ForecastResult,
    bars: &[PriceBar],
    snapshot: Snapshot,
) -> PredictResponse {
    let chart_data = bars
        .iter()
        .map(|bar| ChartPoint {
            date: bar.date.format("%Y-%m-%d").to_string(),
            price: round2(bar.close),
        })
        .collect();

    PredictResponse {
        symbol: symbol.to_string(),
        latest_price: forecast.latest_price,
        predicted_price: forecast.predicted_price,
        chart_data,
        company_name: snapshot.company_name.unwrap_or_else(|| symbol.to_string()),
        summary: snapshot.summary.unwrap_or_else(|| NO_SUMMARY.to_string()),
        sector: snapshot.sector.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        industry: snapshot.industry.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        previous_close: snapshot.previous_close.unwrap_or(0.0),
        open: snapshot.open.unwrap_or(0.0),
        day_high: snapshot.day_high.unwrap_or(0.0),
        day_low: snapshot.day_low.unwrap_or(0.0),
        market_cap: snapshot.market_cap.unwrap_or(0.0),
    }
}

/// 计算涨跌幅（百分比，两位小数）
///
/// 任一价格缺失或昨收为 0 时返回 0
pub fn percent_change(latest: Option<f64>, previous_close: Option<f64>) -> f64 {
    match (latest, previous_close) {
        (Some(latest), Some(prev)) if prev != 0.0 => round2((latest - prev) / prev * 100.0),
        _ => 0.0,
    }
}

/// 扫描自选股涨跌幅
///
/// 单只股票请求失败时涨跌幅记为 0，不影响其它股票；结果顺序与 watchlist 一致
pub async fn scan_tickers(
    gateway: &dyn MarketDataGateway,
    watchlist: &[String],
    concurrency: usize,
) -> Vec<TickerChange> {
    stream::iter(watchlist)
        .map(|symbol| async move {
            let change = match gateway.get_snapshot(symbol).await {
                Ok(snapshot) => percent_change(snapshot.latest_price, snapshot.previous_close),
                Err(e) => {
                    log::warn!("获取 {} 行情失败，涨跌幅记为 0: {}", symbol, e);
                    0.0
                }
            };
            TickerChange {
                symbol: symbol.clone(),
                change,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_WATCHLIST;
    use crate::services::gateway::mock::{bars_from_closes, MockGateway};

    fn watchlist() -> Vec<String> {
        DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(Some(" aapl ")).unwrap(), "AAPL");
        assert_eq!(normalize_symbol(Some("brk-b")).unwrap(), "BRK-B");
        assert!(matches!(normalize_symbol(Some("")), Err(AppError::NoSymbolProvided)));
        assert!(matches!(normalize_symbol(Some("   ")), Err(AppError::NoSymbolProvided)));
        assert!(matches!(normalize_symbol(None), Err(AppError::NoSymbolProvided)));
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(Some(110.0), Some(100.0)), 10.0);
        assert_eq!(percent_change(Some(98.76), Some(100.0)), -1.24);
        assert_eq!(percent_change(Some(110.0), Some(0.0)), 0.0);
        assert_eq!(percent_change(None, Some(100.0)), 0.0);
        assert_eq!(percent_change(Some(110.0), None), 0.0);
    }

    #[test]
    fn test_assemble_prediction_defaults() {
        let bars = bars_from_closes(&[10.004, 11.0]);
        let forecast = ForecastResult {
            latest_price: 11.0,
            predicted_price: 12.0,
        };
        let response = assemble_prediction("ABC", &forecast, &bars, Snapshot::empty("ABC"));

        assert_eq!(response.company_name, "ABC");
        assert_eq!(response.summary, "No summary available.");
        assert_eq!(response.sector, "N/A");
        assert_eq!(response.industry, "N/A");
        assert_eq!(response.previous_close, 0.0);
        assert_eq!(response.market_cap, 0.0);
        assert_eq!(
            response.chart_data,
            vec![
                ChartPoint { date: "2024-01-02".to_string(), price: 10.0 },
                ChartPoint { date: "2024-01-03".to_string(), price: 11.0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_predict() {
        let gateway = MockGateway::new()
            .with_history("AAPL", &[100.0, 102.0, 104.0])
            .with_snapshot(Snapshot {
                company_name: Some("Apple Inc.".to_string()),
                sector: Some("Technology".to_string()),
                previous_close: Some(103.5),
                market_cap: Some(2.9e12),
                ..Snapshot::empty("AAPL")
            });

        let response = predict(&gateway, "AAPL", "1mo").await.unwrap();
        assert_eq!(response.symbol, "AAPL");
        assert_eq!(response.latest_price, 104.0);
        assert_eq!(response.predicted_price, 106.0);
        assert_eq!(response.chart_data.len(), 3);
        assert_eq!(response.company_name, "Apple Inc.");
        assert_eq!(response.sector, "Technology");
        assert_eq!(response.industry, "N/A");
        assert_eq!(response.previous_close, 103.5);
        assert_eq!(response.market_cap, 2.9e12);
    }

    #[tokio::test]
    async fn test_predict_no_data() {
        let gateway = MockGateway::new();
        let err = predict(&gateway, "ZZZZ", "1mo").await.unwrap_err();
        assert!(matches!(err, AppError::NoDataFound(ref s) if s == "ZZZZ"));
    }

    #[tokio::test]
    async fn test_predict_gateway_failure() {
        let gateway = MockGateway::new().failing_history("AAPL");
        let err = predict(&gateway, "AAPL", "1mo").await.unwrap_err();
        assert!(matches!(err, AppError::GatewayFailure(_)));
    }

    #[tokio::test]
    async fn test_predict_snapshot_failure() {
        let gateway = MockGateway::new()
            .with_history("AAPL", &[100.0, 101.0])
            .failing_snapshot("AAPL");
        let err = predict(&gateway, "AAPL", "1mo").await.unwrap_err();
        assert!(matches!(err, AppError::GatewayFailure(_)));
    }

    #[tokio::test]
    async fn test_scan_isolates_failures() {
        let mut gateway = MockGateway::new().failing_snapshot("XOM");
        for symbol in DEFAULT_WATCHLIST.iter().filter(|s| **s != "XOM") {
            gateway = gateway.with_quote(symbol, 102.0, 100.0);
        }

        let results = scan_tickers(&gateway, &watchlist(), 4).await;

        assert_eq!(results.len(), 27);
        for (result, expected) in results.iter().zip(DEFAULT_WATCHLIST.iter()) {
            assert_eq!(result.symbol, *expected);
            if result.symbol == "XOM" {
                assert_eq!(result.change, 0.0);
            } else {
                assert_eq!(result.change, 2.0);
            }
        }
    }

    #[tokio::test]
    async fn test_scan_sequential_matches_concurrent() {
        let gateway = MockGateway::new()
            .with_quote("AAPL", 189.95, 187.5)
            .with_quote("MSFT", 370.0, 375.0)
            .with_quote("V", 260.0, 0.0);
        let list: Vec<String> = ["AAPL", "MSFT", "V", "KO"].iter().map(|s| s.to_string()).collect();

        let sequential = scan_tickers(&gateway, &list, 1).await;
        let concurrent = scan_tickers(&gateway, &list, 8).await;
        assert_eq!(sequential, concurrent);

        let changes: Vec<f64> = sequential.iter().map(|t| t.change).collect();
        assert_eq!(changes, vec![1.31, -1.33, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_scan_zero_concurrency_still_runs() {
        let gateway = MockGateway::new().with_quote("AAPL", 101.0, 100.0);
        let results = scan_tickers(&gateway, &["AAPL".to_string()], 0).await;
        assert_eq!(results, vec![TickerChange { symbol: "AAPL".to_string(), change: 1.0 }]);
    }
}

//! 应用共享状态

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::gateway::MarketDataGateway;

pub struct AppState {
    pub gateway: Arc<dyn MarketDataGateway>,
    /// 预测使用的历史区间
    pub history_period: String,
    pub watchlist: Vec<String>,
    /// 行情条扫描并发数
    pub scan_concurrency: usize,
}

impl AppState {
    pub fn new(gateway: Arc<dyn MarketDataGateway>, config: &AppConfig) -> Self {
        Self {
            gateway,
            history_period: config.predict.history_period.clone(),
            watchlist: config.tickers.watchlist.clone(),
            scan_concurrency: config.tickers.concurrency,
        }
    }
}

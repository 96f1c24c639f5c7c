//! 行情数据源
//!
//! 定义数据源接口，具体实现见 yahoo 子模块

pub mod yahoo;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{PriceBar, Snapshot};

pub use yahoo::YahooGateway;

/// 行情数据源接口
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// 获取日K线收盘价，按时间升序；代码不存在时返回空序列
    async fn get_history(&self, symbol: &str, period: &str) -> Result<Vec<PriceBar>>;

    /// 获取股票快照，缺失字段为 None
    async fn get_snapshot(&self, symbol: &str) -> Result<Snapshot>;
}

#[cfg(test)]
pub mod mock {
    //! 内存数据源，供测试使用

    use super::*;
    use anyhow::anyhow;
    use chrono::{Duration, NaiveDate};
    use std::collections::{HashMap, HashSet};

    /// 从 2024-01-02 起按天生成 K 线
    pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                close,
            })
            .collect()
    }

    #[derive(Default)]
    pub struct MockGateway {
        history: HashMap<String, Vec<PriceBar>>,
        snapshots: HashMap<String, Snapshot>,
        failing_history: HashSet<String>,
        failing_snapshot: HashSet<String>,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_history(mut self, symbol: &str, closes: &[f64]) -> Self {
            self.history.insert(symbol.to_string(), bars_from_closes(closes));
            self
        }

        pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
            self.snapshots.insert(snapshot.symbol.clone(), snapshot);
            self
        }

        /// 设置某只股票的快照价格
        pub fn with_quote(self, symbol: &str, latest: f64, previous_close: f64) -> Self {
            self.with_snapshot(Snapshot {
                latest_price: Some(latest),
                previous_close: Some(previous_close),
                ..Snapshot::empty(symbol)
            })
        }

        pub fn failing_history(mut self, symbol: &str) -> Self {
            self.failing_history.insert(symbol.to_string());
            self
        }

        pub fn failing_snapshot(mut self, symbol: &str) -> Self {
            self.failing_snapshot.insert(symbol.to_string());
            self
        }
    }

    #[async_trait]
    impl MarketDataGateway for MockGateway {
        async fn get_history(&self, symbol: &str, _period: &str) -> Result<Vec<PriceBar>> {
            if self.failing_history.contains(symbol) {
                return Err(anyhow!("connection reset while fetching history for {}", symbol));
            }
            Ok(self.history.get(symbol).cloned().unwrap_or_default())
        }

        async fn get_snapshot(&self, symbol: &str) -> Result<Snapshot> {
            if self.failing_snapshot.contains(symbol) {
                return Err(anyhow!("connection reset while fetching snapshot for {}", symbol));
            }
            Ok(self
                .snapshots
                .get(symbol)
                .cloned()
                .unwrap_or_else(|| Snapshot::empty(symbol)))
        }
    }
}

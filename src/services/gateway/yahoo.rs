//! Yahoo Finance 数据源实现
//!
//! - 日K线: https://query1.finance.yahoo.com/v8/finance/chart/<symbol>
//! - 公司信息和快照: https://query2.finance.yahoo.com/v10/finance/quoteSummary/<symbol>
//!
//! quoteSummary 需要 crumb 参数，crumb 与会话 cookie 绑定，
//! 因此客户端开启 cookie_store 并缓存 crumb

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use super::MarketDataGateway;
use crate::config::GatewayConfig;
use crate::models::{PriceBar, Snapshot};

/// quoteSummary 请求的模块
const SUMMARY_MODULES: &str = "price,summaryDetail,assetProfile";

/// Yahoo Finance 数据源
pub struct YahooGateway {
    /// HTTP 客户端（带 cookie 存储）
    client: Client,
    config: GatewayConfig,
    /// quoteSummary 所需的 crumb，刷新期间持锁，同一时刻只建立一个会话
    crumb: Mutex<Option<String>>,
}

impl YahooGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            crumb: Mutex::new(None),
        })
    }

    /// 获取 crumb，优先使用缓存
    ///
    /// cookie 和 crumb 必须来自同一会话，并发请求在锁上排队，
    /// 拿到锁后缓存已被填充则直接复用
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // 先访问 cookie 页面拿到会话 cookie，该页面通常返回 404，忽略状态码
        log::debug!("📡 请求会话 cookie URL: {}", self.config.cookie_url);
        self.client
            .get(&self.config.cookie_url)
            .send()
            .await
            .context("failed to open a Yahoo Finance session")?;

        log::debug!("📡 请求 crumb URL: {}", self.config.crumb_url);
        let response = self.client.get(&self.config.crumb_url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("failed to obtain Yahoo Finance crumb: HTTP {}", response.status()));
        }

        let crumb = response.text().await?.trim().to_string();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(anyhow!("Yahoo Finance returned an invalid crumb"));
        }

        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    /// crumb 被拒绝时清除缓存；缓存已被其它请求换成新 crumb 时保留
    async fn invalidate_crumb(&self, rejected: &str) {
        let mut cached = self.crumb.lock().await;
        if cached.as_deref() == Some(rejected) {
            *cached = None;
        }
    }
}

#[async_trait]
impl MarketDataGateway for YahooGateway {
    async fn get_history(&self, symbol: &str, period: &str) -> Result<Vec<PriceBar>> {
        let mut url = symbol_url(&self.config.chart_url, symbol)?;
        url.query_pairs_mut()
            .append_pair("range", period)
            .append_pair("interval", "1d");

        log::debug!("📡 请求日K线数据 URL: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        // 代码不存在时接口返回 404 和错误体，交给解析函数处理
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(anyhow!("chart request for {} failed: HTTP {}", symbol, status));
        }

        parse_chart(&text)
    }

    async fn get_snapshot(&self, symbol: &str) -> Result<Snapshot> {
        let crumb = self.crumb().await?;
        let mut url = symbol_url(&self.config.quote_summary_url, symbol)?;
        url.query_pairs_mut()
            .append_pair("modules", SUMMARY_MODULES)
            .append_pair("crumb", &crumb);

        log::debug!("📡 请求快照数据 URL: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // crumb 失效，清除缓存，下次请求重新获取
            self.invalidate_crumb(&crumb).await;
            return Err(anyhow!("quoteSummary request for {} was rejected: HTTP 401", symbol));
        }

        let text = response.text().await?;
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(anyhow!("quoteSummary request for {} failed: HTTP {}", symbol, status));
        }

        parse_quote_summary(&text, symbol)
    }
}

/// 把股票代码拼接为 URL 路径的最后一段
fn symbol_url(base: &str, symbol: &str) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("invalid gateway URL: {}", base))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("gateway URL cannot take a path: {}", base))?
        .pop_if_empty()
        .push(symbol);
    Ok(url)
}

/// 时间戳转换为交易所本地日期
fn trading_date(timestamp: i64, tz: Tz) -> Option<NaiveDate> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.with_timezone(&tz).date_naive())
}

// ==================== 响应结构 ====================

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

impl YahooError {
    fn is_not_found(&self) -> bool {
        self.code == "Not Found"
    }

    fn into_error(self) -> anyhow::Error {
        match self.description {
            Some(desc) => anyhow!("{}: {}", self.code, desc),
            None => anyhow!("{}", self.code),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<YahooError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(default)]
    asset_profile: Option<AssetProfileModule>,
}

/// 数值字段格式: {"raw": 189.95, "fmt": "189.95"}，缺失时可能是 {}
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw).filter(|v| v.is_finite())
}

fn text(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    regular_market_price: Option<RawValue>,
    #[serde(default)]
    regular_market_previous_close: Option<RawValue>,
    #[serde(default)]
    regular_market_open: Option<RawValue>,
    #[serde(default)]
    regular_market_day_high: Option<RawValue>,
    #[serde(default)]
    regular_market_day_low: Option<RawValue>,
    #[serde(default)]
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    #[serde(default)]
    previous_close: Option<RawValue>,
    #[serde(default)]
    open: Option<RawValue>,
    #[serde(default)]
    day_high: Option<RawValue>,
    #[serde(default)]
    day_low: Option<RawValue>,
    #[serde(default)]
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfileModule {
    #[serde(default)]
    long_business_summary: Option<String>,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
}

// ==================== 解析函数 ====================

/// 解析日K线响应
///
/// 收盘价为 null 的记录（如盘中未收盘）会被跳过
fn parse_chart(data: &str) -> Result<Vec<PriceBar>> {
    let envelope: ChartEnvelope =
        serde_json::from_str(data).context("malformed chart response")?;

    if let Some(err) = envelope.chart.error {
        if err.is_not_found() {
            return Ok(Vec::new());
        }
        return Err(err.into_error());
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let tz = result
        .meta
        .exchange_timezone_name
        .as_deref()
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(Tz::UTC);

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let bars = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let close = close.filter(|c| c.is_finite())?;
            Some(PriceBar {
                date: trading_date(ts, tz)?,
                close,
            })
        })
        .collect();

    Ok(bars)
}

/// 解析 quoteSummary 响应
///
/// summaryDetail 缺失的价格字段回退到 price 模块的 regularMarket* 字段
fn parse_quote_summary(data: &str, symbol: &str) -> Result<Snapshot> {
    let envelope: SummaryEnvelope =
        serde_json::from_str(data).context("malformed quoteSummary response")?;

    if let Some(err) = envelope.quote_summary.error {
        return Err(err.into_error());
    }

    let result = envelope
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .unwrap_or_default();

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let profile = result.asset_profile.unwrap_or_default();

    Ok(Snapshot {
        symbol: symbol.to_string(),
        company_name: text(price.long_name).or_else(|| text(price.short_name)),
        summary: text(profile.long_business_summary),
        sector: text(profile.sector),
        industry: text(profile.industry),
        previous_close: raw(&detail.previous_close).or_else(|| raw(&price.regular_market_previous_close)),
        open: raw(&detail.open).or_else(|| raw(&price.regular_market_open)),
        day_high: raw(&detail.day_high).or_else(|| raw(&price.regular_market_day_high)),
        day_low: raw(&detail.day_low).or_else(|| raw(&price.regular_market_day_low)),
        market_cap: raw(&detail.market_cap).or_else(|| raw(&price.market_cap)),
        latest_price: raw(&price.regular_market_price),
    })
}

// ==================== 测试模块 ====================

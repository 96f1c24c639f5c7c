//! 股票数据模型
//!
//! 定义行情数据、预测结果以及接口请求/响应结构

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

/// 业务简介缺失时的占位
pub const NO_SUMMARY: &str = "No summary available.";
/// 文本字段缺失时的占位
pub const NOT_AVAILABLE: &str = "N/A";

/// 单日收盘价
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    /// 交易日（交易所本地日期）
    pub date: NaiveDate,
    /// 收盘价
    pub close: f64,
}

/// 股票快照
///
/// 描述性信息和当日价格，数据源未提供的字段为 None
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// 股票代码
    pub symbol: String,
    /// 公司全称
    pub company_name: Option<String>,
    /// 业务简介
    pub summary: Option<String>,
    /// 行业板块
    pub sector: Option<String>,
    /// 细分行业
    pub industry: Option<String>,
    /// 昨收价
    pub previous_close: Option<f64>,
    /// 开盘价
    pub open: Option<f64>,
    /// 最高价
    pub day_high: Option<f64>,
    /// 最低价
    pub day_low: Option<f64>,
    /// 市值
    pub market_cap: Option<f64>,
    /// 最新价
    pub latest_price: Option<f64>,
}

impl Snapshot {
    /// 创建只有代码的空快照
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }
}

/// 趋势预测结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastResult {
    /// 最新收盘价（保留两位小数）
    pub latest_price: f64,
    /// 下一交易日预测价（保留两位小数）
    pub predicted_price: f64,
}

/// 图表数据点
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    /// 日期（YYYY-MM-DD）
    pub date: String,
    /// 收盘价
    pub price: f64,
}

/// 预测请求体
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub symbol: Option<String>,
}

/// 预测接口响应
///
/// 字段顺序与前端约定一致
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub symbol: String,
    pub latest_price: f64,
    pub predicted_price: f64,
    pub chart_data: Vec<ChartPoint>,
    pub company_name: String,
    pub summary: String,
    pub sector: String,
    pub industry: String,
    #[serde(serialize_with = "zero_as_integer")]
    pub previous_close: f64,
    #[serde(serialize_with = "zero_as_integer")]
    pub open: f64,
    #[serde(serialize_with = "zero_as_integer")]
    pub day_high: f64,
    #[serde(serialize_with = "zero_as_integer")]
    pub day_low: f64,
    /// 市值为整数，不带小数部分输出
    #[serde(serialize_with = "integral_as_integer")]
    pub market_cap: f64,
}

/// 行情条中单只股票的涨跌幅
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerChange {
    /// 股票代码
    pub symbol: String,
    /// 涨跌幅（百分比），无法计算时为 0
    #[serde(serialize_with = "zero_as_integer")]
    pub change: f64,
}

/// 2^53，超过后 f64 无法精确表示整数
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// 缺省值 0 输出为 `0` 而不是 `0.0`
fn zero_as_integer<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if *value == 0.0 {
        serializer.serialize_i64(0)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// 整数值输出为 JSON 整数
fn integral_as_integer<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，HOST / PORT 环境变量可覆盖监听地址

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 行情数据源配置（Yahoo Finance）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// 日K线接口
    #[serde(default = "default_chart_url")]
    pub chart_url: String,
    /// 公司信息/快照接口
    #[serde(default = "default_quote_summary_url")]
    pub quote_summary_url: String,
    /// 获取会话 cookie 的页面
    #[serde(default = "default_cookie_url")]
    pub cookie_url: String,
    /// 获取 crumb 的接口
    #[serde(default = "default_crumb_url")]
    pub crumb_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 预测接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    /// 历史数据区间（Yahoo range 参数，如 1mo、3mo）
    #[serde(default = "default_history_period")]
    pub history_period: String,
}

/// 行情条配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerConfig {
    /// 自选股列表，按此顺序返回
    #[serde(default = "default_watchlist")]
    pub watchlist: Vec<String>,
    /// 并发请求数（1 表示逐个请求）
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub predict: PredictConfig,
    #[serde(default)]
    pub tickers: TickerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// 默认自选股（27 只美股）
pub const DEFAULT_WATCHLIST: [&str; 27] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA",
    "JPM", "V", "JNJ", "UNH", "PG", "XOM", "KO", "PEP",
    "HD", "DIS", "NFLX", "INTC", "PFE", "ORCL", "CSCO",
    "WMT", "MCD", "CVX", "NKE", "COST",
];

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_chart_url() -> String { "https://query1.finance.yahoo.com/v8/finance/chart".to_string() }
fn default_quote_summary_url() -> String { "https://query2.finance.yahoo.com/v10/finance/quoteSummary".to_string() }
fn default_cookie_url() -> String { "https://fc.yahoo.com".to_string() }
fn default_crumb_url() -> String { "https://query1.finance.yahoo.com/v1/test/getcrumb".to_string() }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string()
}
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_history_period() -> String { "1mo".to_string() }
fn default_watchlist() -> Vec<String> { DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect() }
fn default_concurrency() -> usize { 8 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            chart_url: default_chart_url(),
            quote_summary_url: default_quote_summary_url(),
            cookie_url: default_cookie_url(),
            crumb_url: default_crumb_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            history_period: default_history_period(),
        }
    }
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            watchlist: default_watchlist(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// 配置来源
///
/// 加载配置时日志系统尚未初始化，由调用方在初始化后输出
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    Default,
    Fallback { path: PathBuf, error: String },
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "从 {} 加载配置成功", path.display()),
            ConfigSource::Default => write!(f, "未找到配置文件，使用默认配置"),
            ConfigSource::Fallback { path, error } => {
                write!(f, "加载配置文件 {} 失败: {}，使用默认配置", path.display(), error)
            }
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置
    ///
    /// 查找顺序：APP_CONFIG 环境变量、config.json、config/config.json，
    /// 均不可用时使用默认值；最后应用环境变量覆盖
    pub fn load() -> (Self, ConfigSource) {
        let (mut config, source) = Self::load_file();
        config.apply_env_overrides(|key| env::var(key).ok());
        (config, source)
    }

    fn load_file() -> (Self, ConfigSource) {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Ok(path) = env::var("APP_CONFIG") {
            candidates.push(PathBuf::from(path));
        }
        candidates.push(PathBuf::from("config.json"));
        candidates.push(PathBuf::from("config/config.json"));

        for path in candidates {
            if !path.exists() {
                continue;
            }
            return match Self::from_file(&path) {
                Ok(config) => (config, ConfigSource::File(path)),
                Err(e) => (
                    Self::default(),
                    ConfigSource::Fallback {
                        path,
                        error: e.to_string(),
                    },
                ),
            };
        }

        (Self::default(), ConfigSource::Default)
    }

    /// 应用环境变量覆盖（HOST、PORT）
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            self.server.host = host.trim().to_string();
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

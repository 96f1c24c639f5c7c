//! 通用 API 响应模型

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ChartPoint;

/// 错误响应
///
/// 前端依赖 chart_data 始终存在，出错时返回空数组
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误信息
    pub error: String,
    /// 图表数据（恒为空）
    pub chart_data: Vec<ChartPoint>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            chart_data: Vec::new(),
        }
    }
}

/// 健康检查响应
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// 响应时间戳（ISO 8601 格式）
    pub timestamp: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

//! 错误类型
//!
//! 所有接口错误统一映射为 `{"error": ..., "chart_data": []}`

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    /// 请求中没有股票代码
    #[error("No stock symbol provided")]
    NoSymbolProvided,

    /// 请求体无法解析
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    /// 数据源没有返回任何历史数据
    #[error("No data found for symbol '{0}'")]
    NoDataFound(String),

    /// 预测时价格序列为空
    #[error("Not enough price history to estimate a trend")]
    InsufficientData,

    /// 数据源请求失败（网络、响应格式等）
    #[error("{0}")]
    GatewayFailure(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::GatewayFailure(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoSymbolProvided
            | AppError::InvalidRequest(_)
            | AppError::NoDataFound(_)
            | AppError::InsufficientData => StatusCode::BAD_REQUEST,
            AppError::GatewayFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("请求处理失败: {}", self);
        } else {
            log::info!("请求被拒绝: {}", self);
        }
        HttpResponse::build(status).json(ErrorResponse::new(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_error_display() {
        assert_eq!(AppError::NoSymbolProvided.to_string(), "No stock symbol provided");
        assert_eq!(
            AppError::NoDataFound("ZZZZ".to_string()).to_string(),
            "No data found for symbol 'ZZZZ'"
        );
        assert_eq!(
            AppError::GatewayFailure("connection refused".to_string()).to_string(),
            "connection refused"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NoSymbolProvided.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidRequest("eof".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NoDataFound("X".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InsufficientData.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::GatewayFailure("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_anyhow_becomes_gateway_failure() {
        let err: AppError = anyhow::anyhow!("HTTP 503 from chart API").into();
        match err {
            AppError::GatewayFailure(msg) => assert_eq!(msg, "HTTP 503 from chart API"),
            other => panic!("expected GatewayFailure, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let resp = AppError::NoSymbolProvided.error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "No stock symbol provided");
        assert_eq!(body["chart_data"], serde_json::json!([]));
    }
}

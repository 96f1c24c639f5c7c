pub mod stock;
pub mod health;

use actix_web::web;

use crate::error::AppError;

pub fn config(cfg: &mut web::ServiceConfig) {
    // 请求体解析失败时同样返回 {"error", "chart_data"} 格式
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
    )
    .configure(health::config)
    .configure(stock::config);
}

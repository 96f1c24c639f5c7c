//! 股票接口处理器
//!
//! - POST /predict - 预测下一交易日价格
//! - GET /tickers - 获取自选股涨跌幅

use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::PredictRequest;
use crate::services::stock_service;
use crate::state::AppState;

/// 预测下一交易日价格
///
/// POST /predict
///
/// # 请求体
/// - symbol: 股票代码（如 AAPL）
pub async fn predict(
    state: web::Data<AppState>,
    body: web::Json<PredictRequest>,
) -> Result<HttpResponse, AppError> {
    let symbol = stock_service::normalize_symbol(body.symbol.as_deref())?;
    let response =
        stock_service::predict(state.gateway.as_ref(), &symbol, &state.history_period).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// 获取自选股涨跌幅
///
/// GET /tickers
pub async fn tickers(state: web::Data<AppState>) -> HttpResponse {
    let changes = stock_service::scan_tickers(
        state.gateway.as_ref(),
        &state.watchlist,
        state.scan_concurrency,
    )
    .await;
    HttpResponse::Ok().json(changes)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/predict", web::post().to(predict))
        .route("/tickers", web::get().to(tickers));
}

use serde::Serialize;

use crate::http::{HandlerResult, Reply, RequestContext};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

/// `GET /health`
pub async fn get_status(_ctx: RequestContext) -> HandlerResult {
    Ok(Reply::ok(&SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    }))
}

use tokio::signal;
use tracing::{error, warn};

/// 等待 Ctrl+C，收到后返回，由调用方停止服务器
pub async fn listen_for_shutdown() {
    if let Err(e) = signal::ctrl_c().await {
        // 无法监听信号时不要立刻退出，交给服务器自行结束
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");
}

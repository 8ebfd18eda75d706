// ==========================================
// 车间在制品流转追踪系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 用途: 打开/初始化数据库并完成应用装配自检
// ==========================================

use anyhow::Context;
use workshop_mes::app::AppState;
use workshop_mes::logging;

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", workshop_mes::APP_NAME);
    tracing::info!("系统版本: {}", workshop_mes::VERSION);
    tracing::info!("==================================================");

    // 数据库路径: 环境变量优先, 默认当前目录
    let db_path =
        std::env::var("WORKSHOP_MES_DB").unwrap_or_else(|_| "workshop_mes.db".to_string());
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(&db_path).context("应用装配失败")?;
    tracing::info!(
        "应用装配完成, 停机步进 = {} 分钟",
        state.config_manager.downtime_increment_minutes()
    );

    Ok(())
}

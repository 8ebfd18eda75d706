// ==========================================
// 车间在制品流转追踪系统 - 日志初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 超额报产告警与事务提交日志都走这条管道, 默认对本 crate 放开 debug
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info,workshop_mes=debug）
///   例如: RUST_LOG=warn 或 RUST_LOG=workshop_mes=trace
///
/// # 示例
/// ```no_run
/// use workshop_mes::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,workshop_mes=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化测试环境的日志系统
///
/// 只放开本 crate 的日志; 并发套件需要线程名区分报产来源
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("workshop_mes=debug"))
        .with_test_writer()
        .with_thread_names(true)
        .try_init();
}

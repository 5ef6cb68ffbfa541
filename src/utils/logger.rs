use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日誌輸出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 終端機用的精簡格式
    #[default]
    Compact,
    /// 每行一筆 JSON，給日誌收集器
    Json,
}

/// Filter used when `RUST_LOG` is unset. `target` is the crate whose logs get raised to debug.
pub fn default_directive(target: &str, verbose: bool) -> String {
    let target = target.replace('-', "_");
    if verbose {
        format!("{}=debug,info", target)
    } else {
        format!("{}=info", target)
    }
}

/// 初始化日誌，`RUST_LOG` 優先於預設過濾條件
pub fn init_logger(target: &str, verbose: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(target, verbose)));
    let layer = tracing_subscriber::fmt::layer()
        .with_target(verbose)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json().with_current_span(false))
            .init(),
    }
}

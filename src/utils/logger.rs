use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 終端機用的精簡格式
    #[default]
    Compact,
    /// JSON lines，給 `watch` 長時間在背景跑時收集
    Json,
}

/// `RUST_LOG` 優先；否則 verbose 時打開本 crate 的 debug
pub fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        "quote_sync=debug,info"
    } else {
        "quote_sync=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init_logger(format: LogFormat, verbose: bool) {
    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(env_filter(verbose));
    match format {
        LogFormat::Compact => registry.with(layer.compact()).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_defaults_to_info() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(env_filter(false).to_string(), "quote_sync=info");
        assert!(env_filter(true).to_string().contains("quote_sync=debug"));
    }
}

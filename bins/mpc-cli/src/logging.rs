//! 日志初始化模块.
//!
//! 双输出:
//! - console: 彩色, 输出到 stderr, 默认 warn, 可通过 -v/-vv/-vvv 或 MPC_LOG 环境变量调整
//! - file: 无色, 级别取自配置文件
//!
//! 日志文件输出到 {directory}/{prefix}.{date}.log.
//! 库代码通过 `log` 门面记录, 由订阅器自带的 tracing-log 桥接转发.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Timelike};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::LoggingConfig;

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 初始化日志系统
///
/// `verbosity`: 0=warn, 1=info, 2=debug, 3+=trace
pub fn init(config: &LoggingConfig, verbosity: u8) -> Result<()> {
    std::fs::create_dir_all(&config.directory)
        .with_context(|| format!("创建日志目录失败: {}", config.directory))?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .build(&config.directory)
        .context("创建日志文件失败")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD.set(guard).ok();

    let console_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let console_filter =
        EnvFilter::try_from_env("MPC_LOG").unwrap_or_else(|_| EnvFilter::new(console_level));
    let console_layer = fmt::Layer::default()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .event_format(ConsoleFormatter)
        .with_filter(console_filter);

    let file_filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("无效的日志级别: {}", config.level))?;
    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("日志系统已初始化")?;
    Ok(())
}

/// Console 格式: 彩色, 带时间戳
struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = Local::now();
        let meta = event.metadata();
        let color = match *meta.level() {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            _ => "\x1b[34m",
        };
        write!(
            writer,
            "[{:02}:{:02}:{:02}.{:03}] {}{:5}\x1b[0m > ",
            now.hour(),
            now.minute(),
            now.second(),
            now.timestamp_subsec_millis(),
            color,
            meta.level(),
        )?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// File 格式: 无色, 时间戳 + 级别 + 来源 + 消息
struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = Local::now();
        let meta = event.metadata();
        write!(
            writer,
            "[{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}] {:5} {} > ",
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            now.timestamp_subsec_millis(),
            meta.level(),
            meta.target(),
        )?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

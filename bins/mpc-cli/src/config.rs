//! 命令行工具配置.
//!
//! 配置文件为 JSON, 所有字段可省略; 命令行参数覆盖文件中的值.
//!
//! ```json
//! {
//!     "float": false,
//!     "dither": true,
//!     "exact_seek": false,
//!     "noise_seed": 4294967297,
//!     "logging": { "level": "debug", "directory": "logs", "file_prefix": "mpc-cli" }
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use mpc_codec::decoders::musepack::{
    DEFAULT_DITHER_SEED, DEFAULT_NOISE_SEED, DecoderConfig, OutputFormat, SeekMode,
};
use serde::{Deserialize, Serialize};

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 文件日志级别 (EnvFilter 指令)
    pub level: String,
    /// 日志目录
    pub directory: String,
    /// 日志文件前缀
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            directory: "logs".into(),
            file_prefix: "mpc-cli".into(),
        }
    }
}

/// 命令行工具配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// 输出 32 位浮点 WAV
    pub float: bool,
    /// 16 位输出是否抖动
    pub dither: bool,
    /// 使用逐帧解析的精确定位
    pub exact_seek: bool,
    /// 噪声填充种子
    pub noise_seed: u64,
    /// 抖动种子
    pub dither_seed: u64,
    /// 日志
    pub logging: LoggingConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            float: false,
            dither: true,
            exact_seek: false,
            noise_seed: DEFAULT_NOISE_SEED,
            dither_seed: DEFAULT_DITHER_SEED,
            logging: LoggingConfig::default(),
        }
    }
}

impl CliConfig {
    /// 读取 JSON 配置文件
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    /// 转换为解码器配置
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            output: if self.float {
                OutputFormat::F32
            } else {
                OutputFormat::S16
            },
            dither: self.dither,
            noise_seed: self.noise_seed,
            dither_seed: self.dither_seed,
            seek_mode: if self.exact_seek {
                SeekMode::Exact
            } else {
                SeekMode::Fast
            },
        }
    }
}

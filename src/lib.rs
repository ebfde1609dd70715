//! # mpc
//!
//! 纯 Rust 实现的 Musepack (SV4-SV7) 音频解码器.
//!
//! - **解码**: 位流读取、Huffman 熵解码、反量化、32 子带多相合成
//! - **定位**: 帧位置索引 + 预滚重放的快速定位, 或逐帧解析的精确定位
//! - **输出**: ±1.0 浮点或带噪声整形抖动的 16 位 PCM, 可写出为 WAV
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use mpc::codec::decoders::musepack::{DecoderConfig, MAX_FRAME_SAMPLES};
//!
//! # fn demo() -> mpc::core::MpcResult<()> {
//! let mut decoder = mpc::open_file("music.mpc", DecoderConfig::default())?;
//! let mut pcm = vec![0f32; MAX_FRAME_SAMPLES];
//! while decoder.decode_f32(&mut pcm)? > 0 {
//!     // 交错双声道采样
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `mpc-core` | 错误类型、采样格式、声道布局、位写入工具 |
//! | `mpc-codec` | 解码器 trait 与 Musepack 解码实现 |
//! | `mpc-format` | I/O 抽象、流头部解析、WAV 输出 |

use log::debug;

/// 核心类型与工具
pub use mpc_core as core;

/// 解码器
pub use mpc_codec as codec;

/// I/O、头部解析与 WAV 输出
pub use mpc_format as format;

use mpc_codec::decoders::musepack::{DecoderConfig, MpcDecoder};
use mpc_core::MpcResult;
use mpc_format::{IoContext, read_stream_descriptor};

/// 获取版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 从当前位置解析流头部并创建解码器
pub fn open(mut io: IoContext, config: DecoderConfig) -> MpcResult<MpcDecoder<IoContext>> {
    let stream = read_stream_descriptor(&mut io)?;
    MpcDecoder::new(io, stream, config)
}

/// 打开 Musepack 文件并创建解码器
pub fn open_file(path: &str, config: DecoderConfig) -> MpcResult<MpcDecoder<IoContext>> {
    debug!("打开文件: {path}");
    open(IoContext::open_read(path)?, config)
}

//! # mpc-format
//!
//! Musepack 解码器的外围设施:
//! - `io`: 统一的可定位字节流 (文件、内存)
//! - `header`: SV4-SV7 流头部解析, 生成解码器所需的 `StreamDescriptor`
//! - `wav`: 解码结果写出为 WAV 文件

pub mod header;
pub mod io;
pub mod wav;

// 重导出常用类型
pub use header::read_stream_descriptor;
pub use io::{IoBackend, IoContext, MemoryBackend};
pub use wav::WavWriter;

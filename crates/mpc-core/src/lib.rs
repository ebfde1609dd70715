//! # mpc-core
//!
//! Musepack 解码器核心库, 提供错误类型、采样格式、声道布局以及位写入工具.

pub mod bitwriter;
pub mod channel_layout;
pub mod error;
pub mod sample_format;

// 重导出常用类型
pub use bitwriter::BitWriter;
pub use channel_layout::{ChannelLayout, ChannelMask};
pub use error::{MpcError, MpcResult};
pub use sample_format::SampleFormat;

//! 音频采样格式定义.

use std::fmt;

/// 解码输出的采样格式 (均为交错排列 LRLR...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// 有符号 16 位整数, 交错
    S16,
    /// 32 位浮点, 交错, 满幅为 ±1.0
    F32,
}

impl SampleFormat {
    /// 每个采样点占用的字节数
    pub const fn bytes_per_sample(&self) -> u32 {
        match self {
            Self::S16 => 2,
            Self::F32 => 4,
        }
    }

    /// 是否为浮点格式
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32)
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::S16 => "s16",
            Self::F32 => "flt",
        };
        write!(f, "{name}")
    }
}

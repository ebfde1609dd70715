//! 音频声道布局定义.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// 声道位掩码, 每个位代表一个扬声器位置
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChannelMask: u32 {
        /// 前方左声道
        const FRONT_LEFT  = 1 << 0;
        /// 前方右声道
        const FRONT_RIGHT = 1 << 1;
    }
}

/// 声道布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelLayout {
    /// 声道数量
    pub channels: u32,
    /// 声道位掩码
    pub mask: ChannelMask,
}

impl ChannelLayout {
    /// 立体声 (左右), Musepack 唯一支持的布局
    pub const STEREO: Self = Self {
        channels: 2,
        mask: ChannelMask::FRONT_LEFT.union(ChannelMask::FRONT_RIGHT),
    };

    /// 根据声道数创建布局, 仅立体声有效
    pub fn from_channels(channels: u32) -> Option<Self> {
        (channels == 2).then_some(Self::STEREO)
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::STEREO => write!(f, "stereo"),
            _ => write!(f, "{}ch", self.channels),
        }
    }
}

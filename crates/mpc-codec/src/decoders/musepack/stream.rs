//! 流描述信息与帧尺寸常量.

use mpc_core::{MpcError, MpcResult};

/// 每帧每声道采样数
pub const FRAME_LEN: usize = 1152;
/// 合成滤波器组延迟 (首帧需丢弃的采样数)
pub const SYNTH_DELAY: usize = 481;
/// 声道数, Musepack 固定为立体声
pub const CHANNELS: usize = 2;
/// 子带数
pub const SUBBANDS: usize = 32;
/// 每子带每帧的系数数
pub const BAND_SAMPLES: usize = 36;
/// 单次解码调用最多输出的交错采样数 (末帧可能额外冲刷一帧)
pub const MAX_FRAME_SAMPLES: usize = 2 * FRAME_LEN * CHANNELS;

/// 可用的采样率 (按头部采样率索引排列)
pub const SAMPLE_RATES: [u32; 4] = [44100, 48000, 37800, 32000];

/// 码流版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamVersion {
    /// SV4
    Sv4,
    /// SV5
    Sv5,
    /// SV6
    Sv6,
    /// SV7
    Sv7,
    /// SV7.1 (头部版本字节 0x17)
    Sv71,
}

/// 帧内码流布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// SV4-SV6: 分辨率按区域码表直接编码
    Legacy,
    /// SV7: 分辨率与比例因子差分编码, 量化系数成组编码
    Sv7,
}

impl StreamVersion {
    /// 由头部版本字段构造
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0x04 => Some(Self::Sv4),
            0x05 => Some(Self::Sv5),
            0x06 => Some(Self::Sv6),
            0x07 => Some(Self::Sv7),
            0x17 => Some(Self::Sv71),
            _ => None,
        }
    }

    /// 头部版本字段
    pub const fn tag(self) -> u32 {
        match self {
            Self::Sv4 => 0x04,
            Self::Sv5 => 0x05,
            Self::Sv6 => 0x06,
            Self::Sv7 => 0x07,
            Self::Sv71 => 0x17,
        }
    }

    /// 帧内码流布局
    pub const fn layout(self) -> Layout {
        match self {
            Self::Sv4 | Self::Sv5 | Self::Sv6 => Layout::Legacy,
            Self::Sv7 | Self::Sv71 => Layout::Sv7,
        }
    }

    /// 第一帧相对头部起点的位偏移
    pub const fn data_start_bit(self) -> u64 {
        match self {
            Self::Sv4 => 48,
            Self::Sv5 | Self::Sv6 => 64,
            Self::Sv7 | Self::Sv71 => 200,
        }
    }

    /// 末帧后是否跟随 11 位有效采样数
    pub const fn has_length_trailer(self) -> bool {
        self.tag() >= 6
    }
}

/// 流描述信息
///
/// 由头部解析器在打开流时创建, 之后只读.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// 码流版本
    pub version: StreamVersion,
    /// 声道数 (固定为 2)
    pub channels: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 最大子带索引 (0-31)
    pub max_band: u8,
    /// 是否启用 M/S 立体声
    pub mid_side: bool,
    /// 总帧数
    pub frame_count: u64,
    /// 是否为真无缝 (true gapless) 流
    pub true_gapless: bool,
    /// 末帧有效采样数 (0 表示未知, 由码流末尾给出)
    pub last_frame_samples: u32,
    /// 头部在字节流中的偏移
    pub header_offset: u64,
    /// 编码器版本 (SV7 头部给出, 旧版本为 0)
    pub encoder_version: u8,
}

impl StreamDescriptor {
    /// 以常用字段创建描述信息, 其余字段取默认值
    pub fn new(
        version: StreamVersion,
        sample_rate: u32,
        max_band: u8,
        mid_side: bool,
        frame_count: u64,
    ) -> Self {
        Self {
            version,
            channels: 2,
            sample_rate,
            max_band,
            mid_side,
            frame_count,
            true_gapless: false,
            last_frame_samples: 0,
            header_offset: 0,
            encoder_version: 0,
        }
    }

    /// 检查字段是否在格式允许的范围内
    pub fn validate(&self) -> MpcResult<()> {
        if self.channels != CHANNELS as u32 {
            return Err(MpcError::Unsupported(format!(
                "Musepack 仅支持立体声, 实际声道数 {}",
                self.channels
            )));
        }
        if !SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(MpcError::Unsupported(format!(
                "不支持的采样率: {}",
                self.sample_rate
            )));
        }
        if usize::from(self.max_band) >= SUBBANDS {
            return Err(MpcError::InvalidData(format!(
                "最大子带索引越界: {}",
                self.max_band
            )));
        }
        if self.last_frame_samples as usize > FRAME_LEN {
            return Err(MpcError::InvalidData(format!(
                "末帧采样数越界: {}",
                self.last_frame_samples
            )));
        }
        Ok(())
    }

    /// 解码输出的总采样数 (每声道)
    ///
    /// 末帧长度写在码流末尾且头部未给出时按整帧估算.
    pub fn total_samples(&self) -> u64 {
        let frame_len = FRAME_LEN as u64;
        match self.frame_count {
            0 => 0,
            1 => frame_len - SYNTH_DELAY as u64,
            n if self.version.has_length_trailer() => {
                let last = match self.last_frame_samples {
                    0 => frame_len,
                    v => u64::from(v),
                };
                frame_len * (n - 1) + last
            }
            n => frame_len * n - SYNTH_DELAY as u64,
        }
    }

    /// 时长 (毫秒)
    pub fn duration_ms(&self) -> u64 {
        self.total_samples() * 1000 / u64::from(self.sample_rate.max(1))
    }
}

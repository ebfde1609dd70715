//! 跨帧携带的解码状态与单帧临时数据.

use super::random::NoiseGenerator;
use super::stream::{BAND_SAMPLES, SUBBANDS};

/// 单声道的逐子带携带状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelState {
    /// 量化分辨率 (负值为特殊填充模式)
    pub resolution: [i32; SUBBANDS],
    /// 每子带三个 12 采样段的比例因子索引
    pub scf_index: [[i32; 3]; SUBBANDS],
    /// 比例因子差分解码的参考值 (上一帧最后一段)
    pub dscf_reference: [i32; SUBBANDS],
    /// 比例因子选择信息
    pub scfi: [i32; SUBBANDS],
    /// 比例因子是否差分编码 (仅 SV4-SV6)
    pub dscf_flag: [bool; SUBBANDS],
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            resolution: [0; SUBBANDS],
            scf_index: [[0; 3]; SUBBANDS],
            dscf_reference: [0; SUBBANDS],
            scfi: [0; SUBBANDS],
            dscf_flag: [false; SUBBANDS],
        }
    }
}

/// 解码器携带状态
///
/// 由单个解码器实例独占, 每帧更新; 只在打开流或无法保证连续性时重置.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderState {
    /// 左声道 (M/S 时为 M)
    pub left: ChannelState,
    /// 右声道 (M/S 时为 S)
    pub right: ChannelState,
    /// 每子带 M/S 标志
    pub ms_flag: [bool; SUBBANDS],
    /// 噪声填充发生器
    pub noise: NoiseGenerator,
}

impl DecoderState {
    /// 以给定噪声种子创建初始状态
    pub fn new(noise_seed: u64) -> Self {
        Self {
            left: ChannelState::default(),
            right: ChannelState::default(),
            ms_flag: [false; SUBBANDS],
            noise: NoiseGenerator::new(noise_seed),
        }
    }
}

/// 单帧量化系数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameData {
    /// 左声道系数 [子带][采样]
    pub left: [[i32; BAND_SAMPLES]; SUBBANDS],
    /// 右声道系数 [子带][采样]
    pub right: [[i32; BAND_SAMPLES]; SUBBANDS],
    /// 本帧实际携带数据的最大子带
    pub max_used_band: usize,
    /// 帧头声明的帧长 (位)
    pub declared_bits: u32,
}

impl FrameData {
    /// 清零全部系数
    pub fn clear(&mut self) {
        self.left = [[0; BAND_SAMPLES]; SUBBANDS];
        self.right = [[0; BAND_SAMPLES]; SUBBANDS];
        self.max_used_band = 0;
        self.declared_bits = 0;
    }
}

impl Default for FrameData {
    fn default() -> Self {
        Self {
            left: [[0; BAND_SAMPLES]; SUBBANDS],
            right: [[0; BAND_SAMPLES]; SUBBANDS],
            max_used_band: 0,
            declared_bits: 0,
        }
    }
}

/// 反量化后的子带采样, 按 [时隙][子带] 排列供合成滤波器逐时隙读取
#[derive(Debug, Clone, PartialEq)]
pub struct SubbandSamples {
    /// 左声道
    pub left: [[f32; SUBBANDS]; BAND_SAMPLES],
    /// 右声道
    pub right: [[f32; SUBBANDS]; BAND_SAMPLES],
}

impl SubbandSamples {
    /// 清零
    pub fn clear(&mut self) {
        self.left = [[0.0; SUBBANDS]; BAND_SAMPLES];
        self.right = [[0.0; SUBBANDS]; BAND_SAMPLES];
    }
}

impl Default for SubbandSamples {
    fn default() -> Self {
        Self {
            left: [[0.0; SUBBANDS]; BAND_SAMPLES],
            right: [[0.0; SUBBANDS]; BAND_SAMPLES],
        }
    }
}

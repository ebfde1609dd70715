//! 解码后的音频帧.

use bytes::Bytes;
use mpc_core::{ChannelLayout, SampleFormat};

/// 音频帧
///
/// 交错排列的小端采样数据, 格式由 `sample_format` 描述.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// 交错采样数据 (LRLR..., 小端)
    pub data: Bytes,
    /// 本帧包含的采样数 (每声道)
    pub nb_samples: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 采样格式
    pub sample_format: SampleFormat,
    /// 声道布局
    pub channel_layout: ChannelLayout,
    /// 显示时间戳 (以采样为单位)
    pub pts: i64,
    /// 产生本帧的码流帧序号
    pub frame_index: u64,
    /// 帧长度自校验是否通过
    pub valid: bool,
}

impl AudioFrame {
    /// 按 F32 解释采样数据
    ///
    /// 采样格式不是 F32 时返回空.
    pub fn samples_f32(&self) -> Vec<f32> {
        if self.sample_format != SampleFormat::F32 {
            return Vec::new();
        }
        self.data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    /// 按 S16 解释采样数据
    ///
    /// 采样格式不是 S16 时返回空.
    pub fn samples_i16(&self) -> Vec<i16> {
        if self.sample_format != SampleFormat::S16 {
            return Vec::new();
        }
        self.data
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect()
    }

    /// 帧时长 (秒)
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        f64::from(self.nb_samples) / f64::from(self.sample_rate)
    }
}

//! 输出阶段: 浮点归一化或 16 位 PCM 量化.
//!
//! 16 位输出可选一阶噪声整形的三角分布 (TPDF) 抖动, 抖动源与噪声填充发生器相互独立.

use super::random::NoiseGenerator;
use super::stream::CHANNELS;

/// 合成输出到 ±1.0 浮点的缩放系数
pub const FLOAT_SCALE: f32 = 1.0 / 32768.0;

/// 交错合成输出转换为 ±1.0 浮点
pub fn to_f32(src: &[f32], dst: &mut [f32]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d = s * FLOAT_SCALE;
    }
}

/// 16 位量化器
#[derive(Debug, Clone)]
pub struct Dither {
    enabled: bool,
    seed: u64,
    rng: NoiseGenerator,
    /// 每声道上一采样的量化误差
    error: [f32; CHANNELS],
}

impl Dither {
    /// 创建量化器; `enabled` 为 false 时仅做舍入与削波
    pub fn new(enabled: bool, seed: u64) -> Self {
        Self {
            enabled,
            seed,
            rng: NoiseGenerator::new(seed),
            error: [0.0; CHANNELS],
        }
    }

    /// 恢复到初始状态
    pub fn reset(&mut self) {
        self.rng = NoiseGenerator::new(self.seed);
        self.error = [0.0; CHANNELS];
    }

    /// [-0.5, 0.5) LSB 均匀分布
    fn uniform(&mut self) -> f32 {
        (self.rng.next_u32() as f64 / 4_294_967_296.0 - 0.5) as f32
    }

    /// 量化交错采样, 返回被削波的采样数
    pub fn to_s16(&mut self, src: &[f32], dst: &mut [i16]) -> u64 {
        let mut clipped = 0;
        for (i, (d, &s)) in dst.iter_mut().zip(src).enumerate() {
            let ch = i % CHANNELS;
            let value = if self.enabled {
                let shaped = s - self.error[ch];
                let noise = self.uniform() - self.uniform();
                let q = (shaped + noise).round();
                self.error[ch] = q - shaped;
                q
            } else {
                s.round()
            };
            if value > f32::from(i16::MAX) || value < f32::from(i16::MIN) {
                clipped += 1;
            }
            *d = value.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
        }
        clipped
    }
}

//! 噪声填充伪随机数发生器.
//!
//! 两个 32 位奇偶反馈移位寄存器, 输出为二者异或.

/// 默认种子: 两个寄存器均为 1
pub const DEFAULT_NOISE_SEED: u64 = 0x0000_0001_0000_0001;

/// 噪声发生器, 每个解码器实例独立持有
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseGenerator {
    r1: u32,
    r2: u32,
}

impl NoiseGenerator {
    /// 由 64 位种子创建: 低 32 位为寄存器 1, 高 32 位为寄存器 2
    ///
    /// 全零寄存器会停在 0, 因此零值寄存器按 1 处理.
    pub fn new(seed: u64) -> Self {
        Self {
            r1: (seed as u32).max(1),
            r2: ((seed >> 32) as u32).max(1),
        }
    }

    /// 下一个 32 位输出
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let t1 = parity(self.r1 & 0xF5) << 31;
        let t2 = parity((self.r2 >> 25) & 0x63);
        self.r1 = (self.r1 >> 1) | t1;
        self.r2 = (self.r2 << 1) | t2;
        self.r1 ^ self.r2
    }

    /// 噪声填充系数: 四个字节之和减 510, 范围 -510..=510
    #[inline]
    pub fn next_coefficient(&mut self) -> i32 {
        let v = self.next_u32();
        let sum: u32 = v.to_le_bytes().iter().map(|&b| u32::from(b)).sum();
        sum as i32 - 510
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_SEED)
    }
}

#[inline]
fn parity(x: u32) -> u32 {
    x.count_ones() & 1
}

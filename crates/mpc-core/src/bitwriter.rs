//! 比特流写入器.
//!
//! Musepack 码流以 32 位小端字存储, 字内按高位在前 (MSB first) 排列.
//! 写入器按位累积到当前字, 满 32 位后落入字序列, 输出时逐字转为小端字节.
//! 主要用于构造测试与基准所需的合成码流.

/// 比特流写入器
///
/// # 示例
/// ```
/// use mpc_core::bitwriter::BitWriter;
///
/// let mut bw = BitWriter::new();
/// bw.write_bits(0xABC, 12);
/// bw.write_bits(0x12345, 20);
/// let data = bw.finish();
/// assert_eq!(data, 0xABC1_2345u32.to_le_bytes().to_vec());
/// ```
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    /// 已完成的字
    words: Vec<u32>,
    /// 当前字 (正在填充, 低位对齐)
    current: u64,
    /// 当前字中已填充的位数 (0-31)
    bit_count: u32,
}

impl BitWriter {
    /// 创建新的比特流写入器
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取已写入的总位数
    pub fn bits_written(&self) -> u64 {
        self.words.len() as u64 * 32 + u64::from(self.bit_count)
    }

    /// 写入 1 个位
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(u32::from(bit), 1);
    }

    /// 写入 N 个位 (最多 32 位)
    ///
    /// 值的低 N 位被写入, 高位在前.
    pub fn write_bits(&mut self, value: u32, n: u32) {
        debug_assert!(n <= 32, "write_bits: n={} 超过 32 位", n);
        if n == 0 {
            return;
        }
        let mask = if n == 32 { u32::MAX } else { (1u32 << n) - 1 };
        self.current = (self.current << n) | u64::from(value & mask);
        self.bit_count += n;
        if self.bit_count >= 32 {
            self.bit_count -= 32;
            self.words.push((self.current >> self.bit_count) as u32);
            self.current &= (1u64 << self.bit_count) - 1;
        }
    }

    /// 写入一个完整的 32 位字
    pub fn write_word(&mut self, word: u32) {
        self.write_bits(word, 32);
    }

    /// 对齐到字边界 (用 0 填充)
    pub fn align_to_word(&mut self) {
        if self.bit_count > 0 {
            self.write_bits(0, 32 - self.bit_count);
        }
    }

    /// 完成写入, 返回小端字节序列
    ///
    /// 如果当前不在字边界, 自动用 0 填充.
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_word();
        self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }
}

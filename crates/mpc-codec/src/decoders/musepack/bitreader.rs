//! Musepack 位流读取器.
//!
//! 码流以 32 位小端字存储, 字内高位在前 (MSB first).
//! 读取器维护一个环形字缓冲区, 每跨过半个缓冲区就从底层字节流补充刚离开的半区,
//! 因此当前字之后的下一个字总是可供 `peek` 直接使用.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use mpc_core::{MpcError, MpcResult};

/// 环形缓冲区字数
const RING_WORDS: usize = 1 << 13;
/// 半区字数
const HALF_WORDS: usize = RING_WORDS / 2;
const RING_MASK: usize = RING_WORDS - 1;

/// 位流读取器
///
/// 位置以相对 `origin` (流头部字节偏移) 的位数表示.
pub struct BitReader<R> {
    inner: R,
    /// 流头部在字节流中的偏移
    origin: u64,
    /// 环形字缓冲区
    ring: Vec<u32>,
    /// 字节读取暂存区
    scratch: Vec<u8>,
    /// 当前字在环中的下标
    index: usize,
    /// 当前字
    word: u32,
    /// 当前字中已消耗的位数 (0-31)
    pos: u32,
    /// 当前字相对 origin 的字序号
    word_number: u64,
    /// 有真实数据支撑的位数上限 (相对 origin)
    valid_bits: u64,
}

impl<R: Read + Seek> BitReader<R> {
    /// 创建读取器, 不做任何 I/O; 读取前须先调用 `seek_to_bit()`
    pub fn new(inner: R, origin: u64) -> Self {
        Self {
            inner,
            origin,
            ring: vec![0; RING_WORDS],
            scratch: vec![0; RING_WORDS * 4],
            index: 0,
            word: 0,
            pos: 0,
            word_number: 0,
            valid_bits: 0,
        }
    }

    /// 定位到相对 origin 的指定位, 并重新装满环形缓冲区
    pub fn seek_to_bit(&mut self, bit: u64) -> MpcResult<()> {
        self.word_number = bit / 32;
        self.inner
            .seek(SeekFrom::Start(self.origin + self.word_number * 4))?;
        let got = self.fill(0, RING_WORDS)?;
        self.valid_bits = self.word_number * 32 + got as u64 * 8;
        self.index = 0;
        self.word = self.ring[0];
        self.pos = (bit % 32) as u32;
        Ok(())
    }

    /// 读取 `bits` 位 (1-32), 高位在前
    ///
    /// 读取越过真实数据末尾时返回 `UnexpectedEof`.
    pub fn read(&mut self, bits: u32) -> MpcResult<u32> {
        debug_assert!((1..=32).contains(&bits), "read: bits={} 越界", bits);
        let mut out = self.word;
        self.pos += bits;
        if self.pos < 32 {
            out >>= 32 - self.pos;
        } else {
            self.advance()?;
            self.pos -= 32;
            if self.pos > 0 {
                out = (out << self.pos) | (self.word >> (32 - self.pos));
            }
        }
        let position = self.position();
        if position > self.valid_bits {
            return Err(MpcError::UnexpectedEof(position));
        }
        Ok(out & mask(bits))
    }

    /// 读取 1 位
    pub fn read_bool(&mut self) -> MpcResult<bool> {
        Ok(self.read(1)? != 0)
    }

    /// 跳过任意位数
    pub fn skip(&mut self, mut bits: u64) -> MpcResult<()> {
        while bits > 0 {
            let step = bits.min(32) as u32;
            self.read(step)?;
            bits -= u64::from(step);
        }
        Ok(())
    }

    /// 从当前位置窥视 32 位 (高位对齐), 不消耗
    ///
    /// 只保证高 `width` 位有效; 超出真实数据的部分为 0.
    pub fn peek(&self, width: u32) -> u32 {
        let mut code = self.word << self.pos;
        if self.pos > 32 - width {
            code |= self.ring[(self.index + 1) & RING_MASK] >> (32 - self.pos);
        }
        code
    }

    /// 当前位置 (相对 origin 的位数)
    pub fn position(&self) -> u64 {
        self.word_number * 32 + u64::from(self.pos)
    }

    /// 前进到下一个字, 跨过半区边界时补充刚离开的半区
    fn advance(&mut self) -> MpcResult<()> {
        self.index = (self.index + 1) & RING_MASK;
        self.word_number += 1;
        if self.index & (HALF_WORDS - 1) == 0 {
            let got = self.fill(self.index ^ HALF_WORDS, HALF_WORDS)?;
            self.valid_bits += got as u64 * 8;
        }
        self.word = self.ring[self.index];
        Ok(())
    }

    /// 从底层字节流读取 `words` 个字到环的 `start` 处, 不足部分补 0
    fn fill(&mut self, start: usize, words: usize) -> MpcResult<usize> {
        let buf = &mut self.scratch[..words * 4];
        let mut got = 0;
        while got < buf.len() {
            match self.inner.read(&mut buf[got..]) {
                Ok(0) => break,
                Ok(n) => got += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        buf[got..].fill(0);
        for (slot, chunk) in self.ring[start..start + words]
            .iter_mut()
            .zip(buf.chunks_exact(4))
        {
            *slot = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(got)
    }
}

#[inline]
const fn mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

//! Musepack Huffman 码表构建与解码.
//!
//! 码表以 (码字, 码长) 字面量给出, 构建时将码字左对齐到 32 位,
//! 按码字降序排列, 并依据最大码长选择查找方式:
//! - ≤5 位: 32 项直接查找表
//! - ≤10 位: 1024 项直接查找表
//! - ≤14 位: 在降序码字上二分查找

use std::io::{Read, Seek};
use std::sync::OnceLock;

use log::debug;
use mpc_core::{MpcError, MpcResult};

use super::bitreader::BitReader;
use super::tables;

/// 支持的最大码长
pub const MAX_CODE_LEN: u8 = 14;

/// 码长类别, 决定解码时窥视的位宽与查找方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupClass {
    /// 码长 ≤5
    Faster,
    /// 码长 ≤10
    Fast,
    /// 码长 ≤14
    Slow,
}

impl LookupClass {
    /// 按最大码长选择类别
    pub fn for_max_len(len: u8) -> MpcResult<Self> {
        match len {
            1..=5 => Ok(Self::Faster),
            6..=10 => Ok(Self::Fast),
            11..=MAX_CODE_LEN => Ok(Self::Slow),
            _ => Err(MpcError::InvalidData(format!("Huffman 码长越界: {len}"))),
        }
    }

    /// 解码时窥视的位宽
    pub const fn peek_bits(self) -> u32 {
        match self {
            Self::Faster => 5,
            Self::Fast => 10,
            Self::Slow => 14,
        }
    }
}

/// 码表项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HuffmanEntry {
    /// 左对齐到 32 位的码字
    pub code: u32,
    /// 码长
    pub length: u8,
    /// 解码值
    pub value: i8,
}

/// Huffman 码表
///
/// 构建后只读, 可在多个解码器实例间共享.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HuffmanTable {
    /// 按码字降序排列的表项
    entries: Vec<HuffmanEntry>,
    /// 码长类别
    class: LookupClass,
    /// 直接查找表: 窥视值 -> 表项下标 (Slow 类别为空)
    lookup: Vec<u8>,
}

impl HuffmanTable {
    /// 由字面量构建码表
    ///
    /// 第 i 项的解码值为 `i - offset`.
    pub fn build(literals: &[(u32, u8)], offset: i32) -> MpcResult<Self> {
        if literals.is_empty() || literals.len() > 64 {
            return Err(MpcError::InvalidData(format!(
                "Huffman 码表项数无效: {}",
                literals.len()
            )));
        }

        let mut entries = Vec::with_capacity(literals.len());
        for (index, &(code, length)) in literals.iter().enumerate() {
            if length == 0 || length > MAX_CODE_LEN || code >> length != 0 {
                return Err(MpcError::InvalidData(format!(
                    "Huffman 码字无效: 第 {index} 项 code={code:#x} len={length}"
                )));
            }
            let value = i8::try_from(index as i32 - offset)
                .map_err(|_| MpcError::InvalidData(format!("Huffman 偏移无效: {offset}")))?;
            entries.push(HuffmanEntry {
                code: code << (32 - u32::from(length)),
                length,
                value,
            });
        }
        entries.sort_by(|a, b| b.code.cmp(&a.code).then(a.length.cmp(&b.length)));

        // 降序相邻项共享较短码长的前缀即为前缀冲突
        for pair in entries.windows(2) {
            let shorter = pair[0].length.min(pair[1].length);
            if (pair[0].code ^ pair[1].code) >> (32 - u32::from(shorter)) == 0 {
                return Err(MpcError::InvalidData(format!(
                    "Huffman 码字前缀冲突: {:#010x}/{} 与 {:#010x}/{}",
                    pair[0].code, pair[0].length, pair[1].code, pair[1].length
                )));
            }
        }

        let max_len = entries.iter().map(|e| e.length).max().unwrap_or(0);
        let class = LookupClass::for_max_len(max_len)?;

        let mut lookup = Vec::new();
        if class != LookupClass::Slow {
            let width = class.peek_bits();
            // 未被任何码字覆盖的槽位指向越界下标, 解码时报错
            lookup = vec![u8::MAX; 1 << width];
            for (index, entry) in entries.iter().enumerate() {
                let first = (entry.code >> (32 - width)) as usize;
                let span = 1usize << (width - u32::from(entry.length));
                lookup[first..first + span].fill(index as u8);
            }
        }

        Ok(Self {
            entries,
            class,
            lookup,
        })
    }

    /// 码长类别
    pub fn class(&self) -> LookupClass {
        self.class
    }

    /// 按码字降序排列的表项
    pub fn entries(&self) -> &[HuffmanEntry] {
        &self.entries
    }

    /// Kraft 和是否恰为 1 (码表完备)
    pub fn is_complete(&self) -> bool {
        let total: u32 = self
            .entries
            .iter()
            .map(|e| 1u32 << (MAX_CODE_LEN - e.length))
            .sum();
        total == 1 << MAX_CODE_LEN
    }

    /// 按值查找码字, 返回右对齐码字与码长
    pub fn encode(&self, value: i32) -> Option<(u32, u8)> {
        self.entries
            .iter()
            .find(|e| i32::from(e.value) == value)
            .map(|e| (e.code >> (32 - u32::from(e.length)), e.length))
    }

    /// 从位流解码一个符号
    #[inline]
    pub fn decode<R: Read + Seek>(&self, br: &mut BitReader<R>) -> MpcResult<i32> {
        let width = self.class.peek_bits();
        let code = br.peek(width);
        let index = match self.class {
            LookupClass::Slow => self.entries.partition_point(|e| e.code > code),
            _ => usize::from(self.lookup[(code >> (32 - width)) as usize]),
        };
        let entry = self.entries.get(index).ok_or_else(|| {
            MpcError::InvalidData(format!("Huffman 码字未定义: {:#010x}", code))
        })?;
        if entry.code & !(u32::MAX >> entry.length) != code & !(u32::MAX >> entry.length) {
            return Err(MpcError::InvalidData(format!(
                "Huffman 码字未定义: {:#010x}",
                code
            )));
        }
        br.read(u32::from(entry.length))?;
        Ok(i32::from(entry.value))
    }
}

/// SV7 码表集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sv7Codebooks {
    /// 子带分辨率差分
    pub resolution: HuffmanTable,
    /// 比例因子选择信息 (SCFI)
    pub scfi: HuffmanTable,
    /// 比例因子差分
    pub dscf: HuffmanTable,
    /// 量化系数, 下标 [分辨率 - 1][形状变体]
    pub quant: Vec<[HuffmanTable; 2]>,
}

impl Sv7Codebooks {
    fn build() -> MpcResult<Self> {
        let mut quant = Vec::with_capacity(tables::SV7_QUANT.len());
        for (pair, &offset) in tables::SV7_QUANT.iter().zip(&tables::SV7_QUANT_OFFSET) {
            quant.push([
                HuffmanTable::build(pair[0], offset)?,
                HuffmanTable::build(pair[1], offset)?,
            ]);
        }
        Ok(Self {
            resolution: HuffmanTable::build(&tables::SV7_RESOLUTION, 5)?,
            scfi: HuffmanTable::build(&tables::SV7_SCFI, 0)?,
            dscf: HuffmanTable::build(&tables::SV7_DSCF, 7)?,
            quant,
        })
    }

    /// 分辨率 1-7 与形状变体对应的量化码表
    pub fn quant(&self, resolution: i32, variant: usize) -> Option<&HuffmanTable> {
        let index = usize::try_from(resolution - 1).ok()?;
        self.quant.get(index).map(|pair| &pair[variant & 1])
    }
}

/// SV4-SV6 码表集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyCodebooks {
    /// 分辨率码表, 子带 0-10 / 11-22 / 23-31
    pub region: [HuffmanTable; 3],
    /// SCFI 与差分标志的组合
    pub scfi_bundle: HuffmanTable,
    /// 比例因子差分
    pub dscf: HuffmanTable,
    /// 量化系数, 下标 [分辨率 - 1]
    pub quant: Vec<HuffmanTable>,
}

impl LegacyCodebooks {
    fn build() -> MpcResult<Self> {
        let mut quant = Vec::with_capacity(tables::LEGACY_QUANT.len());
        for (literals, &offset) in tables::LEGACY_QUANT.iter().zip(&tables::LEGACY_QUANT_OFFSET) {
            quant.push(HuffmanTable::build(literals, offset)?);
        }
        Ok(Self {
            region: [
                HuffmanTable::build(&tables::LEGACY_REGION_A, 0)?,
                HuffmanTable::build(&tables::LEGACY_REGION_B, 0)?,
                HuffmanTable::build(&tables::LEGACY_REGION_C, 0)?,
            ],
            scfi_bundle: HuffmanTable::build(&tables::LEGACY_SCFI_BUNDLE, 0)?,
            dscf: HuffmanTable::build(&tables::LEGACY_DSCF, 6)?,
            quant,
        })
    }

    /// 子带对应的分辨率码表
    pub fn region(&self, band: usize) -> &HuffmanTable {
        match band {
            0..=10 => &self.region[0],
            11..=22 => &self.region[1],
            _ => &self.region[2],
        }
    }

    /// 分辨率 1-7 对应的量化码表
    pub fn quant(&self, resolution: i32) -> Option<&HuffmanTable> {
        let index = usize::try_from(resolution - 1).ok()?;
        self.quant.get(index)
    }
}

/// 两代码流布局的全部码表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebooks {
    /// SV7 码表
    pub sv7: Sv7Codebooks,
    /// SV4-SV6 码表
    pub legacy: LegacyCodebooks,
}

impl Codebooks {
    /// 构建全部码表
    pub fn build() -> MpcResult<Self> {
        let books = Self {
            sv7: Sv7Codebooks::build()?,
            legacy: LegacyCodebooks::build()?,
        };
        debug!("Musepack 码表构建完成");
        Ok(books)
    }
}

/// 获取全局共享码表, 首次调用时构建
pub fn codebooks() -> MpcResult<&'static Codebooks> {
    static CODEBOOKS: OnceLock<Result<Codebooks, String>> = OnceLock::new();
    match CODEBOOKS.get_or_init(|| Codebooks::build().map_err(|e| e.to_string())) {
        Ok(books) => Ok(books),
        Err(msg) => Err(MpcError::Internal(format!("码表构建失败: {msg}"))),
    }
}

//! Musepack 常量表.
//!
//! Huffman 码表以 (右对齐码字, 码长) 给出, 第 i 项解码为 `i - offset`.

/// SV7 各分辨率量化码表的解码值偏移 (分辨率 1、2 为成组索引, 无偏移)
pub const SV7_QUANT_OFFSET: [i32; 7] = [0, 0, 3, 4, 7, 15, 31];

/// SV7 量化码表, 下标 [分辨率 - 1][形状变体]
pub const SV7_QUANT: [[&[(u32, u8)]; 2]; 7] = [
    [&SV7_Q1_0, &SV7_Q1_1],
    [&SV7_Q2_0, &SV7_Q2_1],
    [&SV7_Q3_0, &SV7_Q3_1],
    [&SV7_Q4_0, &SV7_Q4_1],
    [&SV7_Q5_0, &SV7_Q5_1],
    [&SV7_Q6_0, &SV7_Q6_1],
    [&SV7_Q7_0, &SV7_Q7_1],
];

/// SV4-SV6 各分辨率量化码表的解码值偏移
pub const LEGACY_QUANT_OFFSET: [i32; 7] = [1, 2, 3, 4, 7, 15, 31];

/// SV4-SV6 量化码表, 下标 [分辨率 - 1]
pub const LEGACY_QUANT: [&[(u32, u8)]; 7] = [
    &LEGACY_Q1, &LEGACY_Q2, &LEGACY_Q3, &LEGACY_Q4, &LEGACY_Q5, &LEGACY_Q6, &LEGACY_Q7,
];

/// SV4-SV6 子带 0-10 的分辨率取值
const LEGACY_RESOLUTION_A: [i32; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 17];
/// SV4-SV6 子带 11-22 的分辨率取值
const LEGACY_RESOLUTION_B: [i32; 8] = [0, 1, 2, 3, 4, 5, 6, 17];
/// SV4-SV6 子带 23-31 的分辨率取值
const LEGACY_RESOLUTION_C: [i32; 4] = [0, 1, 2, 17];

/// SV4-SV6 分辨率码表符号到分辨率的映射
pub fn legacy_resolution(band: usize, symbol: i32) -> Option<i32> {
    let table: &[i32] = match band {
        0..=10 => &LEGACY_RESOLUTION_A,
        11..=22 => &LEGACY_RESOLUTION_B,
        _ => &LEGACY_RESOLUTION_C,
    };
    usize::try_from(symbol)
        .ok()
        .and_then(|i| table.get(i))
        .copied()
}

/// 固定位宽量化 (分辨率 8-17) 的位数, 下标为分辨率
pub const RES_BITS: [u32; 18] = [0, 0, 0, 0, 0, 0, 0, 0, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];

/// 量化零点偏移, 下标为分辨率 + 1
const DC: [i32; 19] = [
    2, 0, 1, 2, 3, 4, 7, 15, 31, 63, 127, 255, 511, 1023, 2047, 4095, 8191, 16383, 32767,
];

/// 量化缩放常数 65536 / (2 * Dc + 1), 下标为分辨率 + 1 (分辨率 -1 为噪声填充)
#[allow(clippy::excessive_precision)]
const CC: [f32; 19] = [
    111.285962475327,
    65536.0,
    21845.333333333332,
    13107.200000000001,
    9362.285714285713,
    7281.777777777777,
    4369.066666666666,
    2114.064516129032,
    1040.253968253968,
    516.031496062992,
    257.003921568627,
    128.250489236790,
    64.062561094819,
    32.015632633121,
    16.003907203907,
    8.000976681723,
    4.000244155527,
    2.000061037018,
    1.000015259021,
];

/// 分辨率对应的零点偏移, 越界时为 0
pub fn dc(resolution: i32) -> i32 {
    usize::try_from(resolution + 1)
        .ok()
        .and_then(|i| DC.get(i))
        .copied()
        .unwrap_or(0)
}

/// 分辨率对应的缩放常数, 越界 (含 -2..=-17 的空子带) 时为 0
pub fn cc(resolution: i32) -> f32 {
    usize::try_from(resolution + 1)
        .ok()
        .and_then(|i| CC.get(i))
        .copied()
        .unwrap_or(0.0)
}

/// SV7 分辨率差分, 值 -5..=4, 4 表示随后 4 位原始值
pub const SV7_RESOLUTION: [(u32, u8); 10] = [
    (0x5C, 8), (0x2F, 7), (0xA, 5), (0x4, 4), (0x0, 2), (0x1, 1), (0x3, 3), (0x16, 6),
    (0xBB, 9), (0xBA, 9),
];

/// SV7 比例因子选择信息, 值 0..=3
pub const SV7_SCFI: [(u32, u8); 4] = [
    (0x2, 3), (0x1, 1), (0x3, 3), (0x0, 2),
];

/// SV7 比例因子差分, 值 -7..=8, 8 表示随后 6 位原始值
pub const SV7_DSCF: [(u32, u8); 16] = [
    (0x20, 6), (0x4, 5), (0x11, 5), (0x1E, 5), (0xD, 4), (0x0, 3), (0x3, 3), (0x9, 4),
    (0x5, 3), (0x2, 3), (0xE, 4), (0x3, 4), (0x1F, 5), (0x5, 5), (0x21, 6), (0xC, 4),
];

/// SV7 量化码表 分辨率 1 (三级, 3 个系数成组, 27 个符号), 形状变体 0
pub const SV7_Q1_0: [(u32, u8); 27] = [
    (0x36, 6), (0x9, 5), (0x20, 6), (0x5, 5), (0xA, 4), (0x7, 5), (0x34, 6), (0x0, 5), (0x23, 6),
    (0xA, 5), (0x6, 4), (0x4, 5), (0xB, 4), (0x7, 3), (0xC, 4), (0x3, 5), (0x7, 4), (0xB, 5),
    (0x22, 6), (0x1, 5), (0x35, 6), (0x6, 5), (0x9, 4), (0x2, 5), (0x21, 6), (0x8, 5), (0x37, 6),
];

/// SV7 量化码表 分辨率 1 (三级, 3 个系数成组, 27 个符号), 形状变体 1
pub const SV7_Q1_1: [(u32, u8); 27] = [
    (0x67, 8), (0x3E, 7), (0xE1, 9), (0x37, 7), (0x3, 4), (0x34, 7), (0x65, 8), (0x3C, 7),
    (0xE3, 9), (0x18, 6), (0x0, 4), (0x3D, 7), (0x4, 4), (0x1, 1), (0x5, 4), (0x3F, 7), (0x1, 4),
    (0x3B, 7), (0xE2, 9), (0x39, 7), (0x64, 8), (0x35, 7), (0x2, 4), (0x36, 7), (0xE0, 9),
    (0x3A, 7), (0x66, 8),
];

/// SV7 量化码表 分辨率 2 (五级, 2 个系数成组, 25 个符号), 形状变体 0
pub const SV7_Q2_0: [(u32, u8); 25] = [
    (0x59, 7), (0x2F, 6), (0xF, 5), (0x0, 5), (0x5B, 7), (0x4, 5), (0x6, 4), (0xD, 4), (0x4, 4),
    (0x5, 5), (0x14, 5), (0xC, 4), (0x4, 3), (0xF, 4), (0xE, 5), (0x3, 5), (0x3, 4), (0xE, 4),
    (0x5, 4), (0x1, 5), (0x5A, 7), (0x2, 5), (0x15, 5), (0x2E, 6), (0x58, 7),
];

/// SV7 量化码表 分辨率 2 (五级, 2 个系数成组, 25 个符号), 形状变体 1
pub const SV7_Q2_1: [(u32, u8); 25] = [
    (0x399, 10), (0x71, 7), (0x33, 6), (0xE7, 8), (0x39A, 10), (0x68, 7), (0x1E, 5), (0x0, 3),
    (0x1D, 5), (0x69, 7), (0x32, 6), (0x1, 3), (0x2, 2), (0x3, 3), (0x31, 6), (0x6B, 7), (0x1B, 5),
    (0x2, 3), (0x1F, 5), (0x70, 7), (0x398, 10), (0x6A, 7), (0x30, 6), (0x72, 7), (0x39B, 10),
];

/// SV7 量化码表 分辨率 3 (七级), 形状变体 0
pub const SV7_Q3_0: [(u32, u8); 7] = [
    (0xC, 4), (0x4, 3), (0x0, 2), (0x1, 2), (0x7, 3), (0x5, 3), (0xD, 4),
];

/// SV7 量化码表 分辨率 3 (七级), 形状变体 1
pub const SV7_Q3_1: [(u32, u8); 7] = [
    (0x4, 5), (0x3, 4), (0x2, 2), (0x3, 2), (0x1, 2), (0x0, 3), (0x5, 5),
];

/// SV7 量化码表 分辨率 4 (九级), 形状变体 0
pub const SV7_Q4_0: [(u32, u8); 9] = [
    (0x5, 4), (0x4, 4), (0x4, 3), (0x6, 3), (0x7, 3), (0x5, 3), (0x3, 3), (0x1, 3), (0x0, 3),
];

/// SV7 量化码表 分辨率 4 (九级), 形状变体 1
pub const SV7_Q4_1: [(u32, u8); 9] = [
    (0x9, 5), (0xC, 4), (0x3, 3), (0x0, 2), (0x2, 2), (0x7, 3), (0xD, 4), (0x5, 4), (0x8, 5),
];

/// SV7 量化码表 分辨率 5 (十五级), 形状变体 0
pub const SV7_Q5_0: [(u32, u8); 15] = [
    (0x39, 6), (0x17, 5), (0x8, 4), (0xA, 4), (0xD, 4), (0x0, 3), (0x2, 3), (0x3, 3), (0x1, 3),
    (0xF, 4), (0xC, 4), (0x9, 4), (0x1D, 5), (0x16, 5), (0x38, 6),
];

/// SV7 量化码表 分辨率 5 (十五级), 形状变体 1
pub const SV7_Q5_1: [(u32, u8); 15] = [
    (0xE5, 8), (0x38, 6), (0x7, 5), (0x2, 4), (0x0, 3), (0x2, 3), (0x5, 3), (0x6, 3), (0x4, 3),
    (0x3, 3), (0xF, 4), (0x1D, 5), (0x6, 5), (0x73, 7), (0xE4, 8),
];

/// SV7 量化码表 分辨率 6 (三十一级), 形状变体 0
pub const SV7_Q6_0: [(u32, u8); 31] = [
    (0xFFC, 12), (0xFFD, 12), (0x7FC, 11), (0x3FC, 10), (0x1FA, 9), (0x1FB, 9), (0xFA, 8),
    (0xFB, 8), (0x7A, 7), (0x3A, 6), (0x3B, 6), (0x1A, 5), (0xA, 4), (0xB, 4), (0x2, 3),
    (0x0, 2), (0x3, 3), (0x4, 3), (0xC, 4), (0x1B, 5), (0x1C, 5), (0x3C, 6), (0x7B, 7),
    (0x7C, 7), (0xFC, 8), (0x1FC, 9), (0x1FD, 9), (0x3FD, 10), (0x7FD, 11), (0xFFE, 12),
    (0xFFF, 12),
];

/// SV7 量化码表 分辨率 6 (三十一级), 形状变体 1
pub const SV7_Q6_1: [(u32, u8); 31] = [
    (0x78, 7), (0x79, 7), (0x7A, 7), (0x7B, 7), (0x34, 6), (0x35, 6), (0x36, 6), (0x37, 6),
    (0x14, 5), (0x15, 5), (0x16, 5), (0x2, 4), (0x3, 4), (0x4, 4), (0x5, 4), (0x0, 3),
    (0x6, 4), (0x7, 4), (0x8, 4), (0x9, 4), (0x17, 5), (0x18, 5), (0x19, 5), (0x38, 6),
    (0x39, 6), (0x3A, 6), (0x3B, 6), (0x7C, 7), (0x7D, 7), (0x7E, 7), (0x7F, 7),
];

/// SV7 量化码表 分辨率 7 (六十三级), 形状变体 0
pub const SV7_Q7_0: [(u32, u8); 63] = [
    (0x3FFE, 14), (0x1FFA, 13), (0x1FFB, 13), (0x1FFC, 13), (0xFF6, 12), (0xFF7, 12),
    (0xFF8, 12), (0x7F6, 11), (0x7F7, 11), (0x7F8, 11), (0x3F4, 10), (0x3F5, 10), (0x3F6, 10),
    (0x1F4, 9), (0x1F5, 9), (0x1F6, 9), (0xF4, 8), (0xF5, 8), (0xF6, 8), (0x74, 7), (0x75, 7),
    (0x76, 7), (0x34, 6), (0x35, 6), (0x36, 6), (0x14, 5), (0x15, 5), (0x16, 5), (0x6, 4),
    (0x7, 4), (0x0, 3), (0x1, 3), (0x2, 3), (0x8, 4), (0x9, 4), (0x17, 5), (0x18, 5),
    (0x19, 5), (0x37, 6), (0x38, 6), (0x39, 6), (0x77, 7), (0x78, 7), (0x79, 7), (0xF7, 8),
    (0xF8, 8), (0xF9, 8), (0x1F7, 9), (0x1F8, 9), (0x1F9, 9), (0x3F7, 10), (0x3F8, 10),
    (0x3F9, 10), (0x3FA, 10), (0x7F9, 11), (0x7FA, 11), (0xFF9, 12), (0xFFA, 12), (0xFFB, 12),
    (0xFFC, 12), (0x1FFD, 13), (0x1FFE, 13), (0x3FFF, 14),
];

/// SV7 量化码表 分辨率 7 (六十三级), 形状变体 1
pub const SV7_Q7_1: [(u32, u8); 63] = [
    (0x1F6, 9), (0x1F7, 9), (0x1F8, 9), (0x1F9, 9), (0x1FA, 9), (0xEE, 8), (0xEF, 8),
    (0xF0, 8), (0xF1, 8), (0xF2, 8), (0xF3, 8), (0xF4, 8), (0x6C, 7), (0x6D, 7), (0x6E, 7),
    (0x6F, 7), (0x70, 7), (0x2A, 6), (0x2B, 6), (0x2C, 6), (0x2D, 6), (0x2E, 6), (0x2F, 6),
    (0x8, 5), (0x9, 5), (0xA, 5), (0xB, 5), (0xC, 5), (0xD, 5), (0xE, 5), (0x0, 4), (0x1, 4),
    (0x2, 4), (0x3, 4), (0xF, 5), (0x10, 5), (0x11, 5), (0x12, 5), (0x13, 5), (0x14, 5),
    (0x30, 6), (0x31, 6), (0x32, 6), (0x33, 6), (0x34, 6), (0x35, 6), (0x71, 7), (0x72, 7),
    (0x73, 7), (0x74, 7), (0x75, 7), (0x76, 7), (0xF5, 8), (0xF6, 8), (0xF7, 8), (0xF8, 8),
    (0xF9, 8), (0xFA, 8), (0x1FB, 9), (0x1FC, 9), (0x1FD, 9), (0x1FE, 9), (0x1FF, 9),
];

/// SV4-SV6 子带 0-10 分辨率码表, 16 个符号
pub const LEGACY_REGION_A: [(u32, u8); 16] = [
    (0x0, 2), (0x2, 3), (0x3, 3), (0x4, 3), (0xA, 4), (0xB, 4), (0xC, 4), (0xD, 4), (0x1C, 5),
    (0x1D, 5), (0x3C, 6), (0x3D, 6), (0x7C, 7), (0x7D, 7), (0x7E, 7), (0x7F, 7),
];

/// SV4-SV6 子带 11-22 分辨率码表, 8 个符号
pub const LEGACY_REGION_B: [(u32, u8); 8] = [
    (0x0, 1), (0x2, 2), (0x6, 3), (0xE, 4), (0x1E, 5), (0x3E, 6), (0x7E, 7), (0x7F, 7),
];

/// SV4-SV6 子带 23-31 分辨率码表, 4 个符号
pub const LEGACY_REGION_C: [(u32, u8); 4] = [
    (0x0, 1), (0x2, 2), (0x6, 3), (0x7, 3),
];

/// SV4-SV6 SCFI 与差分标志组合: 值 = SCFI << 1 | 差分标志
pub const LEGACY_SCFI_BUNDLE: [(u32, u8); 8] = [
    (0xB, 6), (0x7, 5), (0x6, 5), (0x1, 2), (0x4, 5), (0x0, 3), (0xA, 6), (0x1, 1),
];

/// SV4-SV6 比例因子差分, 值 -6..=6
pub const LEGACY_DSCF: [(u32, u8); 13] = [
    (0x7E, 7), (0x3C, 6), (0x3D, 6), (0x1C, 5), (0xC, 4), (0x4, 3), (0x0, 2), (0x1, 2),
    (0x5, 3), (0xD, 4), (0x1D, 5), (0x3E, 6), (0x7F, 7),
];

/// SV4-SV6 量化码表 分辨率 1
pub const LEGACY_Q1: [(u32, u8); 3] = [
    (0x2, 2), (0x0, 1), (0x3, 2),
];

/// SV4-SV6 量化码表 分辨率 2
pub const LEGACY_Q2: [(u32, u8); 5] = [
    (0xE, 4), (0x6, 3), (0x0, 1), (0x2, 2), (0xF, 4),
];

/// SV4-SV6 量化码表 分辨率 3
pub const LEGACY_Q3: [(u32, u8); 7] = [
    (0xE, 4), (0x4, 3), (0x5, 3), (0x0, 2), (0x1, 2), (0x6, 3), (0xF, 4),
];

/// SV4-SV6 量化码表 分辨率 4
pub const LEGACY_Q4: [(u32, u8); 9] = [
    (0xC, 4), (0xD, 4), (0x2, 3), (0x3, 3), (0x0, 2), (0x4, 3), (0x5, 3), (0xE, 4), (0xF, 4),
];

/// SV4-SV6 量化码表 分辨率 5
pub const LEGACY_Q5: [(u32, u8); 15] = [
    (0x3E, 6), (0x1A, 5), (0x1B, 5), (0x1C, 5), (0xA, 4), (0x0, 3), (0x1, 3), (0x2, 3),
    (0x3, 3), (0x4, 3), (0xB, 4), (0xC, 4), (0x1D, 5), (0x1E, 5), (0x3F, 6),
];

/// SV4-SV6 量化码表 分辨率 6
pub const LEGACY_Q6: [(u32, u8); 31] = [
    (0x7C, 7), (0x7D, 7), (0x34, 6), (0x35, 6), (0x36, 6), (0x37, 6), (0x38, 6), (0x12, 5),
    (0x13, 5), (0x14, 5), (0x15, 5), (0x0, 4), (0x1, 4), (0x2, 4), (0x3, 4), (0x4, 4),
    (0x5, 4), (0x6, 4), (0x7, 4), (0x8, 4), (0x16, 5), (0x17, 5), (0x18, 5), (0x19, 5),
    (0x39, 6), (0x3A, 6), (0x3B, 6), (0x3C, 6), (0x3D, 6), (0x7E, 7), (0x7F, 7),
];

/// SV4-SV6 量化码表 分辨率 7
pub const LEGACY_Q7: [(u32, u8); 63] = [
    (0xF4, 8), (0xF5, 8), (0xF6, 8), (0xF7, 8), (0xF8, 8), (0xF9, 8), (0x68, 7), (0x69, 7),
    (0x6A, 7), (0x6B, 7), (0x6C, 7), (0x6D, 7), (0x6E, 7), (0x6F, 7), (0x70, 7), (0x24, 6),
    (0x25, 6), (0x26, 6), (0x27, 6), (0x28, 6), (0x29, 6), (0x2A, 6), (0x2B, 6), (0x2, 5),
    (0x3, 5), (0x4, 5), (0x5, 5), (0x6, 5), (0x7, 5), (0x8, 5), (0x9, 5), (0x0, 4), (0xA, 5),
    (0xB, 5), (0xC, 5), (0xD, 5), (0xE, 5), (0xF, 5), (0x10, 5), (0x11, 5), (0x2C, 6),
    (0x2D, 6), (0x2E, 6), (0x2F, 6), (0x30, 6), (0x31, 6), (0x32, 6), (0x33, 6), (0x71, 7),
    (0x72, 7), (0x73, 7), (0x74, 7), (0x75, 7), (0x76, 7), (0x77, 7), (0x78, 7), (0x79, 7),
    (0xFA, 8), (0xFB, 8), (0xFC, 8), (0xFD, 8), (0xFE, 8), (0xFF, 8),
];

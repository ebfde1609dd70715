//! 集成测试共用的 Musepack 文件构造器.
//!
//! 按解码器的字段顺序逐位写出头部与帧数据, 生成可被 `mpc::open` 直接打开的完整文件.

#![allow(dead_code)]

use mpc::codec::decoders::musepack::huffman::{HuffmanTable, codebooks};
use mpc::codec::decoders::musepack::tables::{self, RES_BITS};
use mpc::codec::decoders::musepack::{Layout, StreamVersion};
use mpc::core::BitWriter;

/// 安装测试日志输出, 可重复调用
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 每子带每声道的样本数
pub const BAND_SAMPLES: usize = 36;

/// 子带 0 左声道的编码内容, 其余子带与右声道静音
#[derive(Debug, Clone, Copy)]
pub struct Tone {
    /// 分辨率: 0, 3-7 (Huffman) 或 8-17 (定长)
    pub res: i32,
    /// 三个分段共用的比例因子
    pub scf: i32,
    /// 量化值
    pub q: [i32; BAND_SAMPLES],
}

/// 以步长 5 取模生成的量化值序列
pub fn ramp(modulo: i32, bias: i32) -> [i32; BAND_SAMPLES] {
    std::array::from_fn(|k| (k as i32 * 5) % modulo - bias)
}

/// 第 `frame` 帧的测试内容
///
/// 比例因子每 16 帧跳变一次, 使差分编码转义为原始值.
pub fn tone(frame: usize) -> Tone {
    let scf = if frame % 16 == 0 {
        60
    } else {
        20 + (frame % 5) as i32
    };
    Tone {
        res: 4,
        scf,
        q: ramp(9, 4),
    }
}

#[derive(Default)]
struct Bits(Vec<(u32, u32)>);

impl Bits {
    fn put(&mut self, value: u32, n: u32) {
        self.0.push((value, n));
    }

    fn code(&mut self, table: &HuffmanTable, value: i32) {
        let (code, len) = table.encode(value).expect("值不在码表中");
        self.put(code, u32::from(len));
    }

    fn len(&self) -> u32 {
        self.0.iter().map(|&(_, n)| n).sum()
    }
}

/// 完整文件构造器
pub struct StreamBuilder {
    version: StreamVersion,
    max_band: usize,
    prefix: Vec<u8>,
    dscf_reference: i32,
    bw: BitWriter,
    header_written: bool,
    sample_rate_index: u32,
    true_gapless: bool,
    last_frame_samples: u32,
    encoder_version: u8,
}

impl StreamBuilder {
    pub fn new(version: StreamVersion, max_band: usize) -> Self {
        Self {
            version,
            max_band,
            prefix: Vec::new(),
            dscf_reference: 0,
            bw: BitWriter::new(),
            header_written: false,
            sample_rate_index: 0,
            true_gapless: false,
            last_frame_samples: 0,
            encoder_version: 0,
        }
    }

    /// 在头部之前放置一个 ID3v2.4 标签
    pub fn id3v2(mut self, body_len: u32) -> Self {
        let mut tag = b"ID3\x04\x00\x00".to_vec();
        tag.extend((0..4).rev().map(|i| ((body_len >> (7 * i)) & 0x7F) as u8));
        tag.resize(tag.len() + body_len as usize, 0);
        self.prefix = tag;
        self
    }

    /// SV7 采样率下标 (0: 44100, 1: 48000, 2: 37800, 3: 32000)
    pub fn sample_rate_index(mut self, index: u32) -> Self {
        self.sample_rate_index = index;
        self
    }

    /// SV7 真无缝标志与末帧有效采样数
    pub fn gapless(mut self, last_frame_samples: u32) -> Self {
        self.true_gapless = true;
        self.last_frame_samples = last_frame_samples;
        self
    }

    pub fn encoder_version(mut self, version: u8) -> Self {
        self.encoder_version = version;
        self
    }

    /// 写入头部, 帧数须事先给定
    pub fn header(mut self, frame_count: u32) -> Self {
        match self.version.layout() {
            Layout::Sv7 => {
                self.bw
                    .write_word(u32::from_le_bytes([b'M', b'P', b'+', self.version.tag() as u8]));
                self.bw.write_word(frame_count);
                self.bw
                    .write_word(((self.max_band as u32) << 24) | (self.sample_rate_index << 16));
                self.bw.write_word(0);
                self.bw.write_word(0);
                let gapless = if self.true_gapless {
                    (1 << 31) | (self.last_frame_samples << 20)
                } else {
                    0
                };
                self.bw.write_word(gapless);
                self.bw.write_bits(u32::from(self.encoder_version), 8);
            }
            Layout::Legacy => {
                self.bw
                    .write_word((self.version.tag() << 11) | ((self.max_band as u32) << 6));
                if self.version == StreamVersion::Sv4 {
                    self.bw.write_bits(frame_count, 16);
                } else {
                    self.bw.write_word(frame_count);
                }
            }
        }
        assert_eq!(self.bw.bits_written(), self.version.data_start_bit());
        self.header_written = true;
        self
    }

    /// 写入一帧, `tone` 为空时整帧静音
    pub fn frame(mut self, tone: Option<Tone>) -> Self {
        assert!(self.header_written, "须先写入头部");
        let bits = match self.version.layout() {
            Layout::Sv7 => self.sv7_payload(tone),
            Layout::Legacy => self.legacy_payload(tone),
        };
        self.bw.write_bits(bits.len(), 20);
        for &(value, n) in &bits.0 {
            self.bw.write_bits(value, n);
        }
        self
    }

    pub fn frames(mut self, count: usize, tone_of: impl Fn(usize) -> Option<Tone>) -> Self {
        for i in 0..count {
            self = self.frame(tone_of(i));
        }
        self
    }

    /// 末帧后的 11 位有效采样数
    pub fn trailer(mut self, valid: u32) -> Self {
        self.bw.write_bits(valid % 1152, 11);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = self.prefix;
        out.extend(self.bw.finish());
        out
    }

    fn sv7_payload(&mut self, tone: Option<Tone>) -> Bits {
        let books = &codebooks().expect("码表构建失败").sv7;
        let mut bits = Bits::default();
        let res = tone.map_or(0, |t| t.res);

        // 子带 0 为 4 位绝对值, 其余子带相对前一子带差分
        bits.put(res as u32, 4);
        bits.put(0, 4);
        for band in 1..=self.max_band {
            let delta = if band == 1 { -res } else { 0 };
            if (-5..=3).contains(&delta) {
                bits.code(&books.resolution, delta);
            } else {
                // 超出差分范围时转义为 4 位绝对值
                bits.code(&books.resolution, 4);
                bits.put(0, 4);
            }
            bits.code(&books.resolution, 0);
        }

        let Some(tone) = tone.filter(|t| t.res != 0) else {
            return bits;
        };
        bits.code(&books.scfi, 3);
        let delta = tone.scf - self.dscf_reference;
        if (-7..=7).contains(&delta) {
            bits.code(&books.dscf, delta);
        } else {
            bits.code(&books.dscf, 8);
            bits.put(tone.scf as u32, 6);
        }
        self.dscf_reference = tone.scf;

        match tone.res {
            r @ 3..=7 => {
                bits.put(0, 1);
                let table = books.quant(r, 0).expect("缺少量化码表");
                for &v in &tone.q {
                    bits.code(table, v);
                }
            }
            r @ 8..=17 => {
                for &v in &tone.q {
                    bits.put((v + tables::dc(r)) as u32, RES_BITS[r as usize]);
                }
            }
            r => panic!("构造器不支持分辨率 {r}"),
        }
        bits
    }

    fn legacy_payload(&mut self, tone: Option<Tone>) -> Bits {
        let books = &codebooks().expect("码表构建失败").legacy;
        let mut bits = Bits::default();
        let res = tone.map_or(0, |t| t.res);
        let symbol = (0..16)
            .find(|&s| tables::legacy_resolution(0, s) == Some(res))
            .expect("子带 0 不允许此分辨率");

        for band in 0..=self.max_band {
            let table = books.region(band);
            bits.code(table, if band == 0 { symbol } else { 0 });
            bits.code(table, 0);
        }

        let Some(tone) = tone.filter(|t| t.res != 0) else {
            return bits;
        };
        bits.code(&books.scfi_bundle, 3 << 1);
        bits.put(tone.scf as u32, 6);
        match books.quant(tone.res) {
            Some(table) => {
                for &v in &tone.q {
                    bits.code(table, v);
                }
            }
            None => {
                for &v in &tone.q {
                    bits.put((v + tables::dc(tone.res)) as u32, RES_BITS[tone.res as usize]);
                }
            }
        }
        bits
    }
}

//! 解码流程测试.
//!
//! 测试码流由下方的 `StreamWriter` 按解析器的字段顺序逐位构造.

use std::io::Cursor;

use mpc_core::{BitWriter, MpcError};

use super::huffman::{HuffmanTable, codebooks};
use super::stream::BAND_SAMPLES;
use super::tables::{self, RES_BITS};
use super::*;

// ============================================================
// 测试码流构造
// ============================================================

/// 一个子带两个声道的编码内容
#[derive(Debug, Clone)]
struct Band {
    res: [i32; 2],
    scf: [[i32; 3]; 2],
    q: [[i32; BAND_SAMPLES]; 2],
    ms: bool,
}

impl Band {
    fn silent() -> Self {
        Self {
            res: [0, 0],
            scf: [[0; 3]; 2],
            q: [[0; BAND_SAMPLES]; 2],
            ms: false,
        }
    }

    fn left(res: i32, scf: [i32; 3], q: [i32; BAND_SAMPLES]) -> Self {
        Self {
            res: [res, 0],
            scf: [scf, [0; 3]],
            q: [q, [0; BAND_SAMPLES]],
            ms: false,
        }
    }
}

/// 待写入的位段序列, 先收集再整体写出, 以便求帧长
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

    fn flush(&self, bw: &mut BitWriter) {
        for &(value, n) in &self.0 {
            bw.write_bits(value, n);
        }
    }
}

fn scfi_of(scf: &[i32; 3]) -> i32 {
    if scf[0] == scf[1] && scf[1] == scf[2] { 3 } else { 0 }
}

struct StreamWriter {
    version: StreamVersion,
    max_band: usize,
    mid_side: bool,
    refs: [[i32; 32]; 2],
    bw: BitWriter,
}

impl StreamWriter {
    fn new(version: StreamVersion, max_band: usize, mid_side: bool) -> Self {
        let mut bw = BitWriter::new();
        let mut pad = version.data_start_bit();
        while pad > 0 {
            let n = pad.min(32) as u32;
            bw.write_bits(0, n);
            pad -= u64::from(n);
        }
        Self {
            version,
            max_band,
            mid_side,
            refs: [[0; 32]; 2],
            bw,
        }
    }

    fn bands(&self, bands: &[Band]) -> Vec<Band> {
        (0..=self.max_band)
            .map(|i| bands.get(i).cloned().unwrap_or_else(Band::silent))
            .collect()
    }

    fn payload(&mut self, bands: &[Band]) -> Bits {
        let bands = self.bands(bands);
        match self.version.layout() {
            Layout::Sv7 => self.sv7_payload(&bands),
            Layout::Legacy => self.legacy_payload(&bands),
        }
    }

    fn sv7_payload(&mut self, bands: &[Band]) -> Bits {
        let books = &codebooks().unwrap().sv7;
        let mut bits = Bits::default();
        let mut max_used = 0;
        for (i, band) in bands.iter().enumerate() {
            for ch in 0..2 {
                let res = band.res[ch];
                if i == 0 {
                    bits.put(res as u32, 4);
                    continue;
                }
                let delta = res - bands[i - 1].res[ch];
                if (-5..=3).contains(&delta) {
                    bits.code(&books.resolution, delta);
                } else {
                    bits.code(&books.resolution, 4);
                    bits.put(res as u32, 4);
                }
            }
            let coded = band.res != [0, 0];
            if self.mid_side && coded {
                bits.put(u32::from(band.ms), 1);
            }
            if coded {
                max_used = i;
            }
        }

        for band in &bands[..=max_used] {
            for ch in 0..2 {
                if band.res[ch] != 0 {
                    bits.code(&books.scfi, scfi_of(&band.scf[ch]));
                }
            }
        }

        for (i, band) in bands[..=max_used].iter().enumerate() {
            for ch in 0..2 {
                if band.res[ch] == 0 {
                    continue;
                }
                let scf = band.scf[ch];
                let mut put = |base: i32, value: i32| {
                    let delta = value - base;
                    if (-7..=7).contains(&delta) {
                        bits.code(&books.dscf, delta);
                    } else {
                        bits.code(&books.dscf, 8);
                        bits.put(value as u32, 6);
                    }
                };
                put(self.refs[ch][i], scf[0]);
                if scfi_of(&scf) == 0 {
                    put(scf[0], scf[1]);
                    put(scf[1], scf[2]);
                }
                self.refs[ch][i] = scf[2];
            }
        }

        for band in &bands[..=max_used] {
            for ch in 0..2 {
                let q = &band.q[ch];
                match band.res[ch] {
                    1 => {
                        bits.put(0, 1);
                        let table = books.quant(1, 0).unwrap();
                        for t in q.chunks_exact(3) {
                            bits.code(table, (t[0] + 1) + 3 * (t[1] + 1) + 9 * (t[2] + 1));
                        }
                    }
                    2 => {
                        bits.put(0, 1);
                        let table = books.quant(2, 0).unwrap();
                        for p in q.chunks_exact(2) {
                            bits.code(table, (p[0] + 2) + 5 * (p[1] + 2));
                        }
                    }
                    r @ 3..=7 => {
                        bits.put(0, 1);
                        let table = books.quant(r, 0).unwrap();
                        for &v in q {
                            bits.code(table, v);
                        }
                    }
                    r @ 8..=17 => {
                        for &v in q {
                            bits.put((v + tables::dc(r)) as u32, RES_BITS[r as usize]);
                        }
                    }
                    _ => {}
                }
            }
        }
        bits
    }

    fn legacy_payload(&mut self, bands: &[Band]) -> Bits {
        let books = &codebooks().unwrap().legacy;
        let mut bits = Bits::default();
        let symbol = |band: usize, res: i32| {
            (0..16)
                .find(|&s| tables::legacy_resolution(band, s) == Some(res))
                .expect("该子带不允许此分辨率")
        };
        let mut max_used = 0;
        for (i, band) in bands.iter().enumerate() {
            let table = books.region(i);
            bits.code(table, symbol(i, band.res[0]));
            if self.mid_side {
                bits.put(u32::from(band.ms), 1);
            }
            bits.code(table, symbol(i, band.res[1]));
            if band.res != [0, 0] {
                max_used = i;
            }
        }

        // 比例因子一律以 6 位原始值写出
        for band in &bands[..=max_used] {
            for ch in 0..2 {
                if band.res[ch] != 0 {
                    bits.code(&books.scfi_bundle, scfi_of(&band.scf[ch]) << 1);
                }
            }
        }
        for band in &bands[..=max_used] {
            for ch in 0..2 {
                if band.res[ch] == 0 {
                    continue;
                }
                let scf = band.scf[ch];
                bits.put(scf[0] as u32, 6);
                if scfi_of(&scf) == 0 {
                    bits.put(scf[1] as u32, 6);
                    bits.put(scf[2] as u32, 6);
                }
            }
        }

        for band in &bands[..=max_used] {
            let tables = [books.quant(band.res[0]), books.quant(band.res[1])];
            if tables.iter().any(Option::is_some) {
                for k in 0..BAND_SAMPLES {
                    for ch in 0..2 {
                        if let Some(table) = tables[ch] {
                            bits.code(table, band.q[ch][k]);
                        }
                    }
                }
            }
            for k in 0..BAND_SAMPLES {
                for ch in 0..2 {
                    let res = band.res[ch];
                    if res > 7 {
                        bits.put((band.q[ch][k] + tables::dc(res)) as u32, RES_BITS[res as usize]);
                    }
                }
            }
        }
        bits
    }

    fn frame(&mut self, bands: &[Band]) -> &mut Self {
        let payload = self.payload(bands);
        self.bw.write_bits(payload.len(), 20);
        payload.flush(&mut self.bw);
        self
    }

    fn frame_with_jump(&mut self, bands: &[Band], jump: u32) -> &mut Self {
        let payload = self.payload(bands);
        self.bw.write_bits(jump, 20);
        payload.flush(&mut self.bw);
        self
    }

    fn silent_frames(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.frame(&[]);
        }
        self
    }

    fn trailer(&mut self, valid: u32) -> &mut Self {
        self.bw.write_bits(valid, 11);
        self
    }

    fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bw).finish()
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn open(
    bytes: Vec<u8>,
    stream: StreamDescriptor,
    config: DecoderConfig,
) -> MpcDecoder<Cursor<Vec<u8>>> {
    MpcDecoder::new(Cursor::new(bytes), stream, config).unwrap()
}

fn decode_all<R: std::io::Read + std::io::Seek>(
    decoder: &mut MpcDecoder<R>,
) -> MpcResult<Vec<f32>> {
    let mut out = Vec::new();
    let mut buf = vec![0f32; MAX_FRAME_SAMPLES];
    loop {
        let n = decoder.decode_f32(&mut buf)?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..n]);
    }
}

fn ramp(modulo: i32, bias: i32) -> [i32; BAND_SAMPLES] {
    std::array::from_fn(|k| (k as i32 * 5) % modulo - bias)
}

/// 子带 0 左声道为分辨率 4 的非零内容
///
/// 每 16 帧比例因子跳变一次, 迫使差分编码转义为原始值.
fn tonal_band(frame: usize) -> Band {
    let scf = if frame % 16 == 0 { 60 } else { 20 + (frame % 5) as i32 };
    Band::left(4, [scf; 3], ramp(9, 4))
}

// ============================================================
// 顺序解码
// ============================================================

#[test]
fn test_静音帧输出零() {
    let bytes = StreamWriter::new(StreamVersion::Sv7, 5, false)
        .silent_frames(3)
        .trailer(0)
        .finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 5, false, 3);
    let mut decoder = open(bytes, stream, DecoderConfig::default());

    let mut buf = vec![1f32; MAX_FRAME_SAMPLES];
    let n = decoder.decode_f32(&mut buf).unwrap();
    assert_eq!(n, (FRAME_LEN - SYNTH_DELAY) * CHANNELS);
    assert!(buf[..n].iter().all(|&v| v == 0.0));
    assert!(decoder.frame_was_valid());
    assert_eq!(decoder.frame_data().declared_bits, 18);
    assert_eq!(decoder.stats().last_frame_bits, 38);
    let kbps = 38.0 * 44100.0 / FRAME_LEN as f64 / 1000.0;
    assert!((decoder.current_bitrate() - kbps).abs() < 1e-9);

    let rest = decode_all(&mut decoder).unwrap();
    assert_eq!((n + rest.len()) / CHANNELS, 3 * FRAME_LEN);
    assert!(rest.iter().all(|&v| v == 0.0));
    assert_eq!(decoder.stats().frames_decoded, 3);
    assert_eq!(decoder.stats().invalid_frames, 0);
}

#[test]
fn test_已知符号序列() {
    let q_left = ramp(7, 3);
    let q_right: [i32; BAND_SAMPLES] = std::array::from_fn(|k| (k as i32 * 7) % 200 - 100);
    let mut band0 = Band::left(3, [10; 3], q_left);
    band0.ms = true;
    let band2 = Band {
        res: [0, 9],
        scf: [[0; 3], [20, 22, 25]],
        q: [[0; BAND_SAMPLES], q_right],
        ms: false,
    };
    let bands = [band0, Band::silent(), band2];
    let bytes = StreamWriter::new(StreamVersion::Sv7, 4, true)
        .frame(&bands)
        .frame(&[])
        .trailer(0)
        .finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 4, true, 2);
    let mut decoder = open(bytes, stream, DecoderConfig::default());

    let mut buf = vec![0f32; MAX_FRAME_SAMPLES];
    decoder.decode_f32(&mut buf).unwrap();
    assert!(decoder.frame_was_valid());

    let frame = decoder.frame_data();
    assert_eq!(frame.max_used_band, 2);
    assert_eq!(frame.left[0], q_left);
    assert_eq!(frame.right[2], q_right);
    assert!(frame.left[1].iter().all(|&v| v == 0));

    let state = decoder.state();
    assert_eq!(state.left.resolution[..3], [3, 0, 0]);
    assert_eq!(state.right.resolution[..3], [0, 0, 9]);
    assert_eq!(state.left.scf_index[0], [10, 10, 10]);
    assert_eq!(state.left.scfi[0], 3);
    assert_eq!(state.right.scf_index[2], [20, 22, 25]);
    assert_eq!(state.right.dscf_reference[2], 25);
    assert!(state.ms_flag[0]);
}

#[test]
fn test_固定码字帧解码() {
    let mut writer = StreamWriter::new(StreamVersion::Sv7, 1, false);
    let bw = &mut writer.bw;
    bw.write_bits(104, 20);
    // 子带 0 分辨率: 左 3, 右 0
    bw.write_bits(0b0011, 4);
    bw.write_bits(0b0000, 4);
    // 子带 1 分辨率差分: 左 -3, 右 0
    bw.write_bits(0b01010, 5);
    bw.write_bits(0b1, 1);
    // SCFI 3
    bw.write_bits(0b00, 2);
    // 比例因子转义 + 6 位原始值 20
    bw.write_bits(0b1100, 4);
    bw.write_bits(20, 6);
    // 形状变体 0, 系数 -3, 3, 1, 其余 0
    bw.write_bits(0, 1);
    bw.write_bits(0b1100, 4);
    bw.write_bits(0b1101, 4);
    bw.write_bits(0b111, 3);
    for _ in 3..BAND_SAMPLES {
        bw.write_bits(0b01, 2);
    }
    let bytes = writer.trailer(0).finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 1, false, 1);
    let mut decoder = open(bytes, stream, DecoderConfig::default());

    let out = decode_all(&mut decoder).unwrap();
    assert!(decoder.frame_was_valid());
    assert!(out.iter().any(|&v| v != 0.0));
    let frame = decoder.frame_data();
    assert_eq!(frame.max_used_band, 0);
    assert_eq!(frame.left[0][..4], [-3, 3, 1, 0]);
    assert!(frame.left[0][3..].iter().all(|&v| v == 0));
    let state = decoder.state();
    assert_eq!(state.left.resolution[..2], [3, 0]);
    assert_eq!(state.right.resolution[..2], [0, 0]);
    assert_eq!(state.left.scfi[0], 3);
    assert_eq!(state.left.scf_index[0], [20; 3]);
}

#[test]
fn test_帧长不符标记无效并继续() {
    init_logger();
    let mut writer = StreamWriter::new(StreamVersion::Sv7, 3, false);
    writer.frame_with_jump(&[], 99);
    writer.frame(&[tonal_band(1)]);
    let bytes = writer.trailer(0).finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 3, false, 2);
    let mut decoder = open(bytes, stream, DecoderConfig::default());

    let mut buf = vec![0f32; MAX_FRAME_SAMPLES];
    assert!(decoder.decode_f32(&mut buf).unwrap() > 0);
    assert!(!decoder.frame_was_valid());
    assert!(decoder.decode_f32(&mut buf).unwrap() > 0);
    assert!(decoder.frame_was_valid());
    assert_eq!(decoder.stats().invalid_frames, 1);
    assert_eq!(decoder.state().left.scf_index[0], [21; 3]);
}

#[test]
fn test_噪声填充确定性() {
    // 子带 1 左声道分辨率 -1 (由 0 差分 -1 得到)
    let noise = Band::left(-1, [30; 3], [0; BAND_SAMPLES]);
    let bands = [Band::silent(), noise];
    let mut writer = StreamWriter::new(StreamVersion::Sv7, 2, false);
    for _ in 0..4 {
        writer.frame(&bands);
    }
    let bytes = writer.trailer(0).finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 2, false, 4);

    let run = |seed: u64| {
        let config = DecoderConfig {
            noise_seed: seed,
            ..DecoderConfig::default()
        };
        let mut decoder = open(bytes.clone(), stream.clone(), config);
        let out = decode_all(&mut decoder).unwrap();
        assert_eq!(decoder.stats().invalid_frames, 0);
        out
    };

    let a = run(DEFAULT_NOISE_SEED);
    let b = run(DEFAULT_NOISE_SEED);
    let c = run(0x1234_5678_9ABC_DEF0);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.iter().any(|&v| v != 0.0));
}

#[test]
fn test_末帧有效长度() {
    for valid in [1u32, 600, 670, 671, 1000, 1152] {
        let bytes = StreamWriter::new(StreamVersion::Sv7, 3, false)
            .silent_frames(2)
            .trailer(valid % 1152)
            .finish();
        let mut stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 3, false, 2);
        stream.last_frame_samples = valid;
        let mut decoder = open(bytes, stream.clone(), DecoderConfig::default());
        let out = decode_all(&mut decoder).unwrap();
        assert_eq!(out.len() / CHANNELS, FRAME_LEN + valid as usize, "valid={valid}");
        assert_eq!(stream.total_samples(), (FRAME_LEN as u64) + u64::from(valid));
    }
}

#[test]
fn test_真无缝末帧() {
    let bands = [tonal_band(0)];
    let mut writer = StreamWriter::new(StreamVersion::Sv7, 3, false);
    writer.frame(&bands).frame(&bands).trailer(1000);
    // 无缝流末尾的额外一帧
    writer.frame(&bands);
    let bytes = writer.finish();

    let mut stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 3, false, 2);
    stream.true_gapless = true;
    let mut decoder = open(bytes, stream, DecoderConfig::default());
    let out = decode_all(&mut decoder).unwrap();
    assert_eq!(out.len() / CHANNELS, FRAME_LEN + 1000);
    // 尾部来自额外一帧的合成, 不应全为零
    assert!(out[out.len() - 200..].iter().any(|&v| v != 0.0));
}

#[test]
fn test_单帧流() {
    let bytes = StreamWriter::new(StreamVersion::Sv7, 1, false)
        .silent_frames(1)
        .trailer(300)
        .finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 1, false, 1);
    let mut decoder = open(bytes, stream, DecoderConfig::default());
    let out = decode_all(&mut decoder).unwrap();
    assert_eq!(out.len(), (FRAME_LEN - SYNTH_DELAY) * CHANNELS);
}

#[test]
fn test_旧版布局解析() {
    let q_left = ramp(5, 2);
    let q_right: [i32; BAND_SAMPLES] = std::array::from_fn(|k| (k as i32 * 3) % 100 - 50);
    let band0 = Band {
        res: [2, 8],
        scf: [[12, 14, 16], [7; 3]],
        q: [q_left, q_right],
        ms: true,
    };
    let bytes = StreamWriter::new(StreamVersion::Sv6, 3, true)
        .frame(&[band0])
        .silent_frames(1)
        .trailer(0)
        .finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv6, 44100, 3, true, 2);
    let mut decoder = open(bytes, stream, DecoderConfig::default());

    let mut buf = vec![0f32; MAX_FRAME_SAMPLES];
    decoder.decode_f32(&mut buf).unwrap();
    assert!(decoder.frame_was_valid());
    assert_eq!(decoder.frame_data().left[0], q_left);
    assert_eq!(decoder.frame_data().right[0], q_right);
    let state = decoder.state();
    assert_eq!(state.left.scf_index[0], [12, 14, 16]);
    assert_eq!(state.right.scf_index[0], [7, 7, 7]);
    assert!(!state.left.dscf_flag[0]);
    assert!(state.ms_flag[0]);

    let rest = decode_all(&mut decoder).unwrap();
    assert_eq!(rest.len() / CHANNELS, 2 * FRAME_LEN - (FRAME_LEN - SYNTH_DELAY));
}

#[test]
fn test_sv4_无末帧长度() {
    let bytes = StreamWriter::new(StreamVersion::Sv4, 2, false)
        .silent_frames(3)
        .finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv4, 44100, 2, false, 3);
    let mut decoder = open(bytes, stream.clone(), DecoderConfig::default());
    let out = decode_all(&mut decoder).unwrap();
    assert_eq!(out.len() / CHANNELS, 3 * FRAME_LEN - SYNTH_DELAY);
    assert_eq!(stream.total_samples(), (3 * FRAME_LEN - SYNTH_DELAY) as u64);
}

#[test]
fn test_截断码流() {
    let bytes = StreamWriter::new(StreamVersion::Sv7, 5, false)
        .silent_frames(2)
        .finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 5, false, 10);
    let mut decoder = open(bytes, stream, DecoderConfig::default());
    let err = decode_all(&mut decoder).unwrap_err();
    assert!(matches!(err, MpcError::UnexpectedEof(_)), "实际错误: {err}");
}

#[test]
fn test_输出缓冲区过小() {
    let bytes = StreamWriter::new(StreamVersion::Sv7, 1, false)
        .silent_frames(1)
        .trailer(0)
        .finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 1, false, 1);
    let mut decoder = open(bytes, stream, DecoderConfig::default());
    let mut small = vec![0f32; FRAME_LEN];
    assert!(matches!(
        decoder.decode_f32(&mut small),
        Err(MpcError::InvalidArgument(_))
    ));
}

#[test]
fn test_无效描述信息被拒绝() {
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 22050, 1, false, 1);
    let result = MpcDecoder::new(Cursor::new(Vec::new()), stream, DecoderConfig::default());
    assert!(matches!(result, Err(MpcError::Unsupported(_))));
}

#[test]
fn test_16位输出与帧接口() {
    let mut writer = StreamWriter::new(StreamVersion::Sv7, 3, false);
    for i in 0..3 {
        writer.frame(&[tonal_band(i)]);
    }
    let bytes = writer.trailer(0).finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 3, false, 3);
    let config = DecoderConfig {
        output: OutputFormat::S16,
        dither: false,
        ..DecoderConfig::default()
    };
    let mut decoder = open(bytes, stream, config);

    let mut pts = Vec::new();
    let mut total = 0;
    while let Some(frame) = decoder.receive_frame().unwrap() {
        assert_eq!(frame.sample_format, mpc_core::SampleFormat::S16);
        assert_eq!(frame.samples_i16().len(), frame.nb_samples as usize * CHANNELS);
        assert!(frame.valid);
        pts.push(frame.pts);
        total += frame.nb_samples as usize;
    }
    assert_eq!(pts, vec![0, 671, 1823]);
    assert_eq!(total, 3 * FRAME_LEN);
    assert_eq!(decoder.name(), "musepack");
}

// ============================================================
// 定位
// ============================================================

fn seek_stream(frames: usize) -> (Vec<u8>, StreamDescriptor) {
    let mut writer = StreamWriter::new(StreamVersion::Sv7, 3, false);
    for i in 0..frames {
        writer.frame(&[tonal_band(i)]);
    }
    let bytes = writer.trailer(0).finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 3, false, frames as u64);
    (bytes, stream)
}

fn decode_frames<R: std::io::Read + std::io::Seek>(
    decoder: &mut MpcDecoder<R>,
    count: usize,
) -> Vec<f32> {
    let mut out = Vec::new();
    let mut buf = vec![0f32; MAX_FRAME_SAMPLES];
    for _ in 0..count {
        let n = decoder.decode_f32(&mut buf).unwrap();
        out.extend_from_slice(&buf[..n]);
    }
    out
}

/// 含噪声填充、M/S 与成组分辨率 1/2 的多子带内容
///
/// 有数据的声道子带集合逐帧不变, 比例因子每 16 帧跳变一次.
fn mixed_bands(frame: usize) -> Vec<Band> {
    let s = |band: usize| {
        if frame % 16 == 0 { 60 } else { 20 + ((frame + band) % 5) as i32 }
    };
    let q = |modulo: i32, bias: i32| -> [i32; BAND_SAMPLES] {
        std::array::from_fn(|k| ((k + frame) as i32 * 5) % modulo - bias)
    };
    let none = [0; BAND_SAMPLES];
    vec![
        Band {
            res: [1, 2],
            scf: [[s(0), s(0) + 1, s(0) + 2], [s(0); 3]],
            q: [q(3, 1), q(5, 2)],
            ms: true,
        },
        Band {
            res: [3, -1],
            scf: [[s(1); 3], [s(1); 3]],
            q: [q(7, 3), none],
            ms: false,
        },
        Band {
            res: [-1, 3],
            scf: [[s(2); 3], [s(2) + 1; 3]],
            q: [none, q(7, 3)],
            ms: frame % 2 == 0,
        },
        Band {
            res: [0, 9],
            scf: [[0; 3], [s(3); 3]],
            q: [none, q(200, 100)],
            ms: true,
        },
        Band {
            res: [-1, 5],
            scf: [[s(4); 3], [s(4); 3]],
            q: [none, q(15, 7)],
            ms: false,
        },
    ]
}

fn mixed_stream(frames: usize, declared: u64) -> (Vec<u8>, StreamDescriptor) {
    let mut writer = StreamWriter::new(StreamVersion::Sv7, 5, true);
    for i in 0..frames {
        writer.frame(&mixed_bands(i));
    }
    if frames as u64 == declared {
        writer.trailer(0);
    }
    let bytes = writer.finish();
    let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 5, true, declared);
    (bytes, stream)
}

#[test]
fn test_混合子带定位状态与输出一致() {
    init_logger();
    let (bytes, stream) = mixed_stream(120, 120);
    let exact = DecoderConfig {
        seek_mode: SeekMode::Exact,
        ..DecoderConfig::default()
    };
    for config in [DecoderConfig::default(), exact] {
        for target in [33usize, 70, 101] {
            let mut reference = open(bytes.clone(), stream.clone(), config.clone());
            decode_frames(&mut reference, target);

            let mut decoder = open(bytes.clone(), stream.clone(), config.clone());
            decoder.seek_frame(target as u64).unwrap();
            assert_eq!(decoder.position(), reference.position(), "target={target}");
            assert_eq!(decoder.state(), reference.state(), "target={target}");
            assert_eq!(decoder.frame_data(), reference.frame_data(), "target={target}");
            assert_eq!(
                decode_frames(&mut decoder, 6),
                decode_frames(&mut reference, 6),
                "target={target}"
            );
            assert_eq!(decoder.state(), reference.state(), "target={target}");
            assert_eq!(decoder.stats().invalid_frames, 0);
        }
    }
}

#[test]
fn test_沿帧长跳转推进噪声发生器() {
    let (bytes, stream) = mixed_stream(120, 120);
    let mut reference = open(bytes.clone(), stream.clone(), DecoderConfig::default());
    decode_frames(&mut reference, 110);
    let noise_at_110 = reference.state().noise;

    // 先远跳建立索引, 再向后定位到只由跳转记录的帧
    let mut decoder = open(bytes.clone(), stream.clone(), DecoderConfig::default());
    decoder.seek_frame(110).unwrap();
    assert_eq!(decoder.state().noise, noise_at_110);
    decoder.seek_frame(50).unwrap();

    let mut reference = open(bytes, stream, DecoderConfig::default());
    decode_frames(&mut reference, 50);
    assert_eq!(decoder.state(), reference.state());
    assert_eq!(decode_frames(&mut decoder, 4), decode_frames(&mut reference, 4));
}

#[test]
fn test_越过截断尾部定位失败后继续解码() {
    // 头部声明 100 帧, 实际只有 60 帧
    let (bytes, stream) = mixed_stream(60, 100);
    let mut reference = open(bytes.clone(), stream.clone(), DecoderConfig::default());
    decode_frames(&mut reference, 20);
    let state_at_20 = reference.state().clone();
    let expected = decode_frames(&mut reference, 10);

    let mut decoder = open(bytes, stream, DecoderConfig::default());
    decode_frames(&mut decoder, 20);
    let before = decoder.position();

    // 重放阶段越界 (第 58 帧起重放) 与跳转阶段越界 (第 67 帧不存在)
    for target in [90u64, 99] {
        let err = decoder.seek_frame(target).unwrap_err();
        assert!(matches!(err, MpcError::UnexpectedEof(_)), "实际错误: {err}");
        assert_eq!(decoder.position(), before);
        assert_eq!(decoder.state(), &state_at_20);
        assert_eq!(decoder.stats().invalid_frames, 0);
    }
    assert_eq!(decode_frames(&mut decoder, 10), expected);
}

#[test]
fn test_快速定位与顺序解码一致() {
    init_logger();
    let (bytes, stream) = seek_stream(120);
    let mut reference = open(bytes.clone(), stream.clone(), DecoderConfig::default());
    let expected = {
        decode_frames(&mut reference, 80);
        decode_frames(&mut reference, 5)
    };

    let mut decoder = open(bytes, stream, DecoderConfig::default());
    decoder.seek_frame(80).unwrap();
    assert_eq!(decoder.position().frame, 80);
    assert!(decoder.seek_table().known_frames() > 80);
    assert_eq!(decode_frames(&mut decoder, 5), expected);
}

#[test]
fn test_精确定位向后() {
    let (bytes, stream) = seek_stream(60);
    let config = DecoderConfig {
        seek_mode: SeekMode::Exact,
        ..DecoderConfig::default()
    };
    let mut reference = open(bytes.clone(), stream.clone(), config.clone());
    decode_frames(&mut reference, 20);
    let expected = decode_frames(&mut reference, 3);

    let mut decoder = open(bytes, stream, config);
    decode_frames(&mut decoder, 40);
    decoder.seek_frame(20).unwrap();
    assert_eq!(decode_frames(&mut decoder, 3), expected);
}

#[test]
fn test_定位到开头与末尾() {
    let (bytes, stream) = seek_stream(50);
    let mut decoder = open(bytes, stream, DecoderConfig::default());
    let first = decode_frames(&mut decoder, 2);
    decode_frames(&mut decoder, 10);

    decoder.seek_frame(0).unwrap();
    assert_eq!(decode_frames(&mut decoder, 2), first);

    decoder.seek_frame(1000).unwrap();
    let mut buf = vec![0f32; MAX_FRAME_SAMPLES];
    assert_eq!(decoder.decode_f32(&mut buf).unwrap(), 0);
}

#[test]
fn test_按毫秒定位() {
    let (bytes, stream) = seek_stream(100);
    let mut decoder = open(bytes, stream, DecoderConfig::default());
    // 2000 ms * 44100 / 1000 / 1152 = 76.56 -> 77
    decoder.seek_ms(2000).unwrap();
    assert_eq!(decoder.position().frame, 77);
}

#[test]
fn test_帧时间戳() {
    assert_eq!(frame_pts(0), 0);
    assert_eq!(frame_pts(1), 671);
    assert_eq!(frame_pts(10), 11520 - 481);
}

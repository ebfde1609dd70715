//! Musepack (SV4-SV7) 解码器.
//!
//! 每帧解码流程:
//! 1. 读取 20 位帧长字段, 记入帧位置索引
//! 2. 按码流布局解析分辨率、比例因子与量化系数
//! 3. 校验实际消耗位数与帧长字段一致, 不一致时标记本帧无效但继续处理
//! 4. 反量化 (含 M/S 重建), 32 子带多相合成
//! 5. 首帧丢弃滤波器延迟; 末帧按有效采样数截断, 必要时再合成一帧冲刷滤波器尾部
//!
//! 跨帧携带的状态 (分辨率、比例因子参考值、滤波器历史、噪声发生器) 只在打开流、
//! `reset()` 以及无法保证连续性的定位操作中重置.

pub mod bitreader;
pub mod huffman;
pub mod output;
pub mod parse;
pub mod random;
pub mod requantize;
pub mod seek;
pub mod state;
pub mod stream;
pub mod synthesis;
pub mod tables;

#[cfg(test)]
mod tests;

use std::io::{Read, Seek};
use std::ops::Range;

use bytes::Bytes;
use log::{debug, warn};
use mpc_core::{ChannelLayout, MpcError, MpcResult, SampleFormat};

use crate::decoder::Decoder;
use crate::frame::AudioFrame;

use self::bitreader::BitReader;
use self::huffman::Codebooks;
use self::output::Dither;
use self::random::NoiseGenerator;
use self::requantize::requantize;
use self::seek::SeekTable;
use self::state::{DecoderState, FrameData, SubbandSamples};
use self::synthesis::FilterBank;

pub use self::random::DEFAULT_NOISE_SEED;
pub use self::seek::SEEK_PREROLL;
pub use self::stream::{
    CHANNELS, FRAME_LEN, Layout, MAX_FRAME_SAMPLES, SAMPLE_RATES, SYNTH_DELAY, StreamDescriptor,
    StreamVersion,
};

/// 默认抖动种子
pub const DEFAULT_DITHER_SEED: u64 = 0x2545_F491_4F6C_DD1D;

/// 输出采样格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// ±1.0 浮点
    #[default]
    F32,
    /// 16 位整数
    S16,
}

impl OutputFormat {
    /// 对应的采样格式
    pub fn sample_format(self) -> SampleFormat {
        match self {
            Self::F32 => SampleFormat::F32,
            Self::S16 => SampleFormat::S16,
        }
    }
}

/// 定位策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekMode {
    /// 沿帧长字段跳转, 在目标前 32 帧重新进入熵解码以重建携带状态
    #[default]
    Fast,
    /// 从一致状态逐帧解析到目标, 结果与顺序解码完全一致
    Exact,
}

/// 解码器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// 输出格式 (仅影响 `Decoder::receive_frame`)
    pub output: OutputFormat,
    /// 16 位输出是否抖动
    pub dither: bool,
    /// 噪声填充发生器种子
    pub noise_seed: u64,
    /// 抖动发生器种子
    pub dither_seed: u64,
    /// 定位策略
    pub seek_mode: SeekMode,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::F32,
            dither: true,
            noise_seed: DEFAULT_NOISE_SEED,
            dither_seed: DEFAULT_DITHER_SEED,
            seek_mode: SeekMode::Fast,
        }
    }
}

/// 解码统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// 输出过音频的帧数
    pub frames_decoded: u64,
    /// 帧长校验失败的帧数
    pub invalid_frames: u64,
    /// 16 位输出中被削波的采样数
    pub clipped_samples: u64,
    /// 最近一帧占用的位数 (含帧长字段)
    pub last_frame_bits: u64,
}

/// 解码位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodePosition {
    /// 下一个待解码的帧序号
    pub frame: u64,
    /// 码流读取位置 (相对头部的位数)
    pub bit: u64,
}

/// Musepack 解码器
pub struct MpcDecoder<R> {
    reader: BitReader<R>,
    stream: StreamDescriptor,
    config: DecoderConfig,
    books: &'static Codebooks,
    state: DecoderState,
    frame: Box<FrameData>,
    subband: Box<SubbandSamples>,
    synth: FilterBank,
    /// 合成输出暂存, 可容纳两帧
    pcm: Vec<f32>,
    dither: Dither,
    seek_table: SeekTable,
    /// 已解析的帧数, 即下一帧的序号
    decoded_frames: u64,
    frame_valid: bool,
    stats: DecodeStats,
}

impl<R: Read + Seek> MpcDecoder<R> {
    /// 打开解码器并定位到第一帧
    pub fn new(inner: R, stream: StreamDescriptor, config: DecoderConfig) -> MpcResult<Self> {
        stream.validate()?;
        let books = huffman::codebooks()?;
        let mut decoder = Self {
            reader: BitReader::new(inner, stream.header_offset),
            seek_table: SeekTable::new(
                stream.version.data_start_bit(),
                NoiseGenerator::new(config.noise_seed),
            ),
            state: DecoderState::new(config.noise_seed),
            frame: Box::default(),
            subband: Box::default(),
            synth: FilterBank::default(),
            pcm: vec![0.0; MAX_FRAME_SAMPLES],
            dither: Dither::new(config.dither, config.dither_seed),
            decoded_frames: 0,
            frame_valid: true,
            stats: DecodeStats::default(),
            books,
            stream,
            config,
        };
        decoder.reset()?;
        debug!(
            "打开 Musepack 流: {:?}, {} Hz, {} 帧, 最大子带 {}, M/S={}, 无缝={}",
            decoder.stream.version,
            decoder.stream.sample_rate,
            decoder.stream.frame_count,
            decoder.stream.max_band,
            decoder.stream.mid_side,
            decoder.stream.true_gapless,
        );
        Ok(decoder)
    }

    /// 流描述信息
    pub fn stream(&self) -> &StreamDescriptor {
        &self.stream
    }

    /// 解码器配置
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// 跨帧携带状态
    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    /// 最近一帧的量化系数
    pub fn frame_data(&self) -> &FrameData {
        &self.frame
    }

    /// 解码统计
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// 最近一帧是否通过帧长校验
    pub fn frame_was_valid(&self) -> bool {
        self.frame_valid
    }

    /// 当前解码位置
    pub fn position(&self) -> DecodePosition {
        DecodePosition {
            frame: self.decoded_frames,
            bit: self.reader.position(),
        }
    }

    /// 由最近一帧大小估算的瞬时码率 (kbps)
    pub fn current_bitrate(&self) -> f64 {
        self.stats.last_frame_bits as f64 * f64::from(self.stream.sample_rate)
            / FRAME_LEN as f64
            / 1000.0
    }

    /// 帧位置索引
    pub fn seek_table(&self) -> &SeekTable {
        &self.seek_table
    }

    /// 重置全部携带状态并回到第一帧
    pub fn reset(&mut self) -> MpcResult<()> {
        self.state = DecoderState::new(self.config.noise_seed);
        self.frame.clear();
        self.subband.clear();
        self.synth.reset();
        self.dither.reset();
        self.decoded_frames = 0;
        self.frame_valid = true;
        self.reader
            .seek_to_bit(self.stream.version.data_start_bit())
    }

    /// 解码下一帧为 ±1.0 浮点交错采样
    ///
    /// `out` 至少需要 `MAX_FRAME_SAMPLES` 个元素. 返回写入的采样数, 0 表示流结束.
    pub fn decode_f32(&mut self, out: &mut [f32]) -> MpcResult<usize> {
        check_capacity(out.len())?;
        let Some(range) = self.decode_next()? else {
            return Ok(0);
        };
        let count = range.len();
        output::to_f32(&self.pcm[range], &mut out[..count]);
        Ok(count)
    }

    /// 解码下一帧为 16 位交错采样
    ///
    /// `out` 至少需要 `MAX_FRAME_SAMPLES` 个元素. 返回写入的采样数, 0 表示流结束.
    pub fn decode_s16(&mut self, out: &mut [i16]) -> MpcResult<usize> {
        check_capacity(out.len())?;
        let Some(range) = self.decode_next()? else {
            return Ok(0);
        };
        let count = range.len();
        let clipped = self.dither.to_s16(&self.pcm[range], &mut out[..count]);
        if clipped > 0 {
            self.stats.clipped_samples += clipped;
            debug!("第 {} 帧削波 {} 个采样", self.decoded_frames - 1, clipped);
        }
        Ok(count)
    }

    /// 保存定位前的位置与携带状态
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            bit: self.reader.position(),
            decoded_frames: self.decoded_frames,
            state: self.state.clone(),
            frame: self.frame.clone(),
            synth: self.synth.clone(),
            frame_valid: self.frame_valid,
            stats: self.stats,
        }
    }

    /// 回到快照时的位置与状态
    fn restore(&mut self, snapshot: Snapshot) -> MpcResult<()> {
        self.decoded_frames = snapshot.decoded_frames;
        self.state = snapshot.state;
        self.frame = snapshot.frame;
        self.synth = snapshot.synth;
        self.frame_valid = snapshot.frame_valid;
        self.stats = snapshot.stats;
        self.reader.seek_to_bit(snapshot.bit)
    }

    /// 解码一帧到合成暂存区, 返回有效输出范围; 流结束时返回 None
    fn decode_next(&mut self) -> MpcResult<Option<Range<usize>>> {
        if self.decoded_frames >= self.stream.frame_count {
            return Ok(None);
        }
        let frame_start = self.reader.position();
        self.read_frame()?;
        self.synthesize(0);
        self.decoded_frames += 1;
        self.stats.frames_decoded += 1;
        self.stats.last_frame_bits = self.reader.position() - frame_start;

        if self.decoded_frames == 1 {
            return Ok(Some(SYNTH_DELAY * CHANNELS..FRAME_LEN * CHANNELS));
        }
        if self.decoded_frames == self.stream.frame_count
            && self.stream.version.has_length_trailer()
        {
            return self.finish_last_frame().map(Some);
        }
        Ok(Some(0..FRAME_LEN * CHANNELS))
    }

    /// 读取帧长字段与帧负载, 更新帧位置索引与有效性标志
    fn read_frame(&mut self) -> MpcResult<()> {
        let start = self.reader.position();
        let declared = self.reader.read(20)?;
        self.frame.clear();
        self.frame.declared_bits = declared;

        let payload_start = self.reader.position();
        self.read_payload()?;
        let consumed = self.reader.position() - payload_start;
        self.seek_table.record(
            self.decoded_frames,
            start,
            20 + u64::from(declared),
            self.state.noise,
        );
        self.frame_valid = consumed == u64::from(declared);
        if !self.frame_valid {
            self.stats.invalid_frames += 1;
            warn!(
                "第 {} 帧长度校验失败: 声明 {} 位, 实际 {} 位",
                self.decoded_frames, declared, consumed
            );
        }
        Ok(())
    }

    fn read_payload(&mut self) -> MpcResult<()> {
        let books = self.books;
        let max_band = usize::from(self.stream.max_band);
        let mid_side = self.stream.mid_side;
        match self.stream.version.layout() {
            Layout::Sv7 => parse::read_sv7(
                &mut self.reader,
                &books.sv7,
                &mut self.state,
                &mut self.frame,
                max_band,
                mid_side,
            ),
            Layout::Legacy => parse::read_legacy(
                &mut self.reader,
                &books.legacy,
                &mut self.state,
                &mut self.frame,
                max_band,
                mid_side,
            ),
        }
    }

    /// 反量化当前帧并合成到暂存区的第 `slot` 帧位置
    fn synthesize(&mut self, slot: usize) {
        requantize(
            &self.state,
            &self.frame,
            usize::from(self.stream.max_band),
            &mut self.subband,
        );
        let offset = slot * FRAME_LEN * CHANNELS;
        self.synth.run(&self.subband, &mut self.pcm[offset..]);
    }

    /// 末帧: 读取有效采样数, 必要时再合成一帧冲刷滤波器尾部
    fn finish_last_frame(&mut self) -> MpcResult<Range<usize>> {
        let valid = match self.reader.read(11)? as usize {
            0 => FRAME_LEN,
            n => n,
        };
        let decay = (valid + SYNTH_DELAY) % FRAME_LEN;
        if SYNTH_DELAY + valid < FRAME_LEN {
            return Ok(0..decay * CHANNELS);
        }

        if self.stream.true_gapless {
            // 无缝流在末帧之后还存有一帧真实数据
            self.reader.read(20)?;
            self.frame.clear();
            self.read_payload()?;
            self.synthesize(1);
        } else {
            self.subband.clear();
            let offset = FRAME_LEN * CHANNELS;
            self.synth.run(&self.subband, &mut self.pcm[offset..]);
        }
        Ok(0..(FRAME_LEN + decay) * CHANNELS)
    }
}

/// 定位失败时恢复用的解码器快照
struct Snapshot {
    bit: u64,
    decoded_frames: u64,
    state: DecoderState,
    frame: Box<FrameData>,
    synth: FilterBank,
    frame_valid: bool,
    stats: DecodeStats,
}

fn check_capacity(len: usize) -> MpcResult<()> {
    if len < MAX_FRAME_SAMPLES {
        return Err(MpcError::InvalidArgument(format!(
            "输出缓冲区过小: {len} < {MAX_FRAME_SAMPLES}"
        )));
    }
    Ok(())
}

/// 第 `frame` 帧首个输出采样在整条流中的位置
pub fn frame_pts(frame: u64) -> i64 {
    match frame {
        0 => 0,
        n => (n * FRAME_LEN as u64 - SYNTH_DELAY as u64) as i64,
    }
}

impl<R: Read + Seek + Send> Decoder for MpcDecoder<R> {
    fn name(&self) -> &str {
        "musepack"
    }

    fn stream(&self) -> &StreamDescriptor {
        &self.stream
    }

    fn receive_frame(&mut self) -> MpcResult<Option<AudioFrame>> {
        let frame_index = self.decoded_frames;
        let format = self.config.output;
        let data: Vec<u8> = match format {
            OutputFormat::F32 => {
                let mut buf = vec![0f32; MAX_FRAME_SAMPLES];
                let count = self.decode_f32(&mut buf)?;
                buf[..count].iter().flat_map(|v| v.to_le_bytes()).collect()
            }
            OutputFormat::S16 => {
                let mut buf = vec![0i16; MAX_FRAME_SAMPLES];
                let count = self.decode_s16(&mut buf)?;
                buf[..count].iter().flat_map(|v| v.to_le_bytes()).collect()
            }
        };
        if data.is_empty() {
            return Ok(None);
        }
        let sample_format = format.sample_format();
        let nb_samples =
            data.len() as u32 / (sample_format.bytes_per_sample() * CHANNELS as u32);
        Ok(Some(AudioFrame {
            data: Bytes::from(data),
            nb_samples,
            sample_rate: self.stream.sample_rate,
            sample_format,
            channel_layout: ChannelLayout::STEREO,
            pts: frame_pts(frame_index),
            frame_index,
            valid: self.frame_valid,
        }))
    }

    fn seek(&mut self, frame: u64) -> MpcResult<()> {
        self.seek_frame(frame)
    }

    fn reset(&mut self) -> MpcResult<()> {
        MpcDecoder::reset(self)
    }
}

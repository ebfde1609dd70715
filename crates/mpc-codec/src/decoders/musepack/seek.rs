//! 帧位置索引与定位.
//!
//! Musepack 帧之间携带分辨率与比例因子差分参考, 任意帧都不能独立解码.
//! 快速定位先沿帧长字段跳到目标前 `SEEK_PREROLL` 帧, 再逐帧解析 (不合成) 到目标,
//! 以这段重放刷新携带状态; 最后一帧重放数据会合成一次以填满滤波器历史.
//!
//! 噪声填充发生器的状态取决于此前全部帧, 因此索引为每帧记录帧首的发生器状态;
//! 沿帧长字段跳转时只解析分辨率字段, 按噪声填充子带数推进发生器.

use std::io::{Read, Seek};

use log::{debug, warn};
use mpc_core::MpcResult;

use super::parse;
use super::random::NoiseGenerator;
use super::state::DecoderState;
use super::stream::{BAND_SAMPLES, FRAME_LEN, Layout};
use super::{MpcDecoder, SeekMode};

/// 快速定位时在目标之前重放的帧数
pub const SEEK_PREROLL: u64 = 32;

/// 帧起点标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMark {
    /// 帧起始位置 (相对头部的位数)
    pub bit: u64,
    /// 该帧开始解析时的噪声发生器状态
    pub noise: NoiseGenerator,
}

/// 帧位置索引
///
/// 记录每帧起点标记. 帧位置只能由前一帧的帧长字段推出,
/// 因此已知部分总是从第 0 帧开始的连续前缀, 随解码与定位逐步延长.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekTable {
    marks: Vec<FrameMark>,
}

impl SeekTable {
    /// 以第 0 帧起始位置与初始噪声状态创建索引
    pub fn new(first_frame_bit: u64, noise: NoiseGenerator) -> Self {
        Self {
            marks: vec![FrameMark {
                bit: first_frame_bit,
                noise,
            }],
        }
    }

    /// 起始位置已知的帧数
    pub fn known_frames(&self) -> u64 {
        self.marks.len() as u64
    }

    /// 第 `frame` 帧的起点标记
    pub fn mark(&self, frame: u64) -> Option<FrameMark> {
        usize::try_from(frame)
            .ok()
            .and_then(|i| self.marks.get(i).copied())
    }

    /// 第 `frame` 帧的起始位置
    pub fn frame_start(&self, frame: u64) -> Option<u64> {
        self.mark(frame).map(|m| m.bit)
    }

    /// 第 `frame` 帧占用的位数 (含帧长字段)
    pub fn frame_bits(&self, frame: u64) -> Option<u64> {
        Some(self.frame_start(frame + 1)? - self.frame_start(frame)?)
    }

    /// 记录第 `frame` 帧的位置与长度, 以及解析完该帧后的噪声状态
    ///
    /// 只有紧接已知前缀的帧会延长索引, 其余记录被忽略.
    pub fn record(&mut self, frame: u64, start: u64, bits: u64, noise_after: NoiseGenerator) {
        if frame + 1 == self.known_frames() && self.frame_start(frame) == Some(start) {
            self.marks.push(FrameMark {
                bit: start + bits,
                noise: noise_after,
            });
        }
    }

    /// 最后一个已知帧的序号与起点标记
    fn last_known(&self) -> (u64, FrameMark) {
        let frame = self.known_frames() - 1;
        (frame, self.marks[self.marks.len() - 1])
    }
}

impl<R: Read + Seek> MpcDecoder<R> {
    /// 定位到第 `frame` 帧, 超出总帧数时定位到流末尾
    ///
    /// 失败时解码器保持定位前的位置与状态, 可继续顺序解码.
    pub fn seek_frame(&mut self, frame: u64) -> MpcResult<()> {
        let target = frame.min(self.stream.frame_count);
        let replay_from = target.saturating_sub(SEEK_PREROLL);
        let resume = self.snapshot();
        let result = self.seek_inner(target, replay_from);
        if let Err(e) = &result {
            warn!("定位到第 {target} 帧失败, 恢复到第 {} 帧: {e}", resume.decoded_frames);
            self.restore(resume)?;
        }
        result
    }

    fn seek_inner(&mut self, target: u64, replay_from: u64) -> MpcResult<()> {
        match self.config.seek_mode {
            SeekMode::Exact => {
                if target < self.decoded_frames {
                    self.reset()?;
                }
            }
            SeekMode::Fast => {
                if replay_from == 0 {
                    self.reset()?;
                } else if !(replay_from..=target).contains(&self.decoded_frames) {
                    let mark = self.locate(replay_from)?;
                    self.reader.seek_to_bit(mark.bit)?;
                    // 携带状态从零重建, 噪声发生器取该帧帧首的状态
                    self.state = DecoderState::new(self.config.noise_seed);
                    self.state.noise = mark.noise;
                    self.decoded_frames = replay_from;
                }
            }
        }
        debug!(
            "定位到第 {} 帧, 从第 {} 帧开始重放",
            target, self.decoded_frames
        );
        self.replay(target)
    }

    /// 定位到指定毫秒处所在的帧
    pub fn seek_ms(&mut self, ms: u64) -> MpcResult<()> {
        let frame = ms as f64 * f64::from(self.stream.sample_rate) / 1000.0 / FRAME_LEN as f64;
        self.seek_frame(frame.round() as u64)
    }

    /// 求第 `frame` 帧的起点标记, 索引未覆盖时沿帧长字段向后追踪
    fn locate(&mut self, frame: u64) -> MpcResult<FrameMark> {
        if let Some(mark) = self.seek_table.mark(frame) {
            return Ok(mark);
        }
        let (mut current, mut mark) = self.seek_table.last_known();
        self.reader.seek_to_bit(mark.bit)?;
        while current < frame {
            let declared = u64::from(self.reader.read(20)?);
            let payload_start = self.reader.position();
            let mut noise = mark.noise;
            for _ in 0..self.noise_bands()? * BAND_SAMPLES {
                noise.next_coefficient();
            }
            let consumed = self.reader.position() - payload_start;
            if consumed <= declared {
                self.reader.skip(declared - consumed)?;
            } else {
                self.reader.seek_to_bit(payload_start + declared)?;
            }
            self.seek_table.record(current, mark.bit, 20 + declared, noise);
            mark = FrameMark {
                bit: mark.bit + 20 + declared,
                noise,
            };
            current += 1;
        }
        Ok(mark)
    }

    /// 解析当前帧的分辨率字段, 返回需要噪声填充的声道子带数
    fn noise_bands(&mut self) -> MpcResult<usize> {
        match self.stream.version.layout() {
            Layout::Sv7 => parse::count_noise_sv7(
                &mut self.reader,
                &self.books.sv7,
                usize::from(self.stream.max_band),
                self.stream.mid_side,
            ),
            // 旧版布局没有噪声填充
            Layout::Legacy => Ok(0),
        }
    }

    /// 从当前帧逐帧解析到 `target` 之前, 只合成最后一帧
    fn replay(&mut self, target: u64) -> MpcResult<()> {
        while self.decoded_frames < target {
            self.read_frame()?;
            self.decoded_frames += 1;
            if self.decoded_frames == target {
                self.synthesize(0);
            }
        }
        Ok(())
    }
}

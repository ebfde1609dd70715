//! WAV (RIFF WAVE) 输出.
//!
//! 将解码得到的交错 PCM 写入标准 WAV 文件.
//!
//! 写入流程:
//! 1. `WavWriter::write_header()` - 写入 RIFF 和 fmt 块, 预留 data 块大小
//! 2. `write_frame()` / `write_pcm()` - 追加 PCM 数据
//! 3. `finish()` - 回填 RIFF 大小和 data 块大小

use std::io::SeekFrom;

use log::debug;
use mpc_codec::AudioFrame;
use mpc_core::{MpcError, MpcResult, SampleFormat};

use crate::io::IoContext;

/// WAV 音频格式码: PCM 整数
const WAV_FORMAT_PCM: u16 = 0x0001;
/// WAV 音频格式码: IEEE 浮点
const WAV_FORMAT_IEEE_FLOAT: u16 = 0x0003;
/// RIFF 大小字段的文件偏移
const RIFF_SIZE_OFFSET: u64 = 4;
/// data 块大小字段的文件偏移: 12 (RIFF) + 24 (fmt) + 4 (data 标签)
const DATA_SIZE_OFFSET: u64 = 40;

/// WAV 写入器
#[derive(Debug)]
pub struct WavWriter {
    sample_format: SampleFormat,
    channels: u16,
    /// 已写入的数据字节数
    data_written: u64,
}

impl WavWriter {
    /// 写入 WAV 头部, 返回写入器
    pub fn write_header(
        io: &mut IoContext,
        sample_rate: u32,
        channels: u16,
        sample_format: SampleFormat,
    ) -> MpcResult<Self> {
        if channels == 0 || sample_rate == 0 {
            return Err(MpcError::InvalidArgument(format!(
                "WAV 参数无效: {sample_rate} Hz, {channels} 声道"
            )));
        }
        let audio_format = match sample_format {
            SampleFormat::S16 => WAV_FORMAT_PCM,
            SampleFormat::F32 => WAV_FORMAT_IEEE_FLOAT,
        };
        let bits_per_sample = (sample_format.bytes_per_sample() * 8) as u16;
        let block_align = channels * (bits_per_sample / 8);
        let byte_rate = sample_rate * u32::from(block_align);

        // RIFF header
        io.write_tag(b"RIFF")?;
        io.write_u32_le(0)?; // 占位, finish 中回填
        io.write_tag(b"WAVE")?;

        // fmt chunk
        io.write_tag(b"fmt ")?;
        io.write_u32_le(16)?;
        io.write_u16_le(audio_format)?;
        io.write_u16_le(channels)?;
        io.write_u32_le(sample_rate)?;
        io.write_u32_le(byte_rate)?;
        io.write_u16_le(block_align)?;
        io.write_u16_le(bits_per_sample)?;

        // data chunk header
        io.write_tag(b"data")?;
        io.write_u32_le(0)?; // 占位, finish 中回填

        debug!(
            "WAV 写入头部: {} Hz, {} 声道, {} 位",
            sample_rate, channels, bits_per_sample,
        );

        Ok(Self {
            sample_format,
            channels,
            data_written: 0,
        })
    }

    /// 已写入的 PCM 字节数
    pub fn data_written(&self) -> u64 {
        self.data_written
    }

    /// 追加一个解码帧
    pub fn write_frame(&mut self, io: &mut IoContext, frame: &AudioFrame) -> MpcResult<()> {
        if frame.sample_format != self.sample_format
            || frame.channel_layout.channels != u32::from(self.channels)
        {
            return Err(MpcError::InvalidArgument(format!(
                "帧格式 {}/{} 与 WAV 头部 {}/{} 声道不一致",
                frame.sample_format, frame.channel_layout.channels, self.sample_format, self.channels
            )));
        }
        self.write_pcm(io, &frame.data)
    }

    /// 追加原始交错 PCM 字节
    pub fn write_pcm(&mut self, io: &mut IoContext, data: &[u8]) -> MpcResult<()> {
        io.write_all(data)?;
        self.data_written += data.len() as u64;
        Ok(())
    }

    /// 回填大小字段
    pub fn finish(self, io: &mut IoContext) -> MpcResult<()> {
        if !io.is_seekable() {
            debug!("WAV 输出不支持 seek, 无法回填大小字段");
            return Ok(());
        }

        let data_size = u32::try_from(self.data_written).unwrap_or(u32::MAX);
        let riff_size = data_size.saturating_add(36); // 整个文件大小 - 8

        io.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
        io.write_u32_le(riff_size)?;
        io.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
        io.write_u32_le(data_size)?;
        io.seek(SeekFrom::End(0))?;

        debug!(
            "WAV 写入尾部: riff_size={}, data_size={}",
            riff_size, data_size,
        );
        Ok(())
    }
}

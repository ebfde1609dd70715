//! Musepack 流头部解析.
//!
//! 支持的头部:
//! - 可选的前置 ID3v2 标签 (整体跳过)
//! - `MP+` 开头的 SV7 / SV7.1 头部, 占 200 位; 第一帧从第 7 个字的低 24 位开始
//! - SV4-SV6 头部, 版本号位于第一个小端字的第 11-20 位
//!
//! `MPCK` 开头的 SV8 流不在支持范围内.

use std::io::SeekFrom;

use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use mpc_codec::decoders::musepack::{SAMPLE_RATES, StreamDescriptor, StreamVersion};
use mpc_core::{MpcError, MpcResult};

use crate::io::IoContext;

/// ID3v2 标签头长度
const ID3V2_HEADER_LEN: u64 = 10;
/// ID3v2 页脚标志
const ID3V2_FOOTER_FLAG: u8 = 0x10;
/// SV7 头部所在的 7 个小端字 (字节)
const SV7_HEADER_LEN: usize = 28;
/// SV4-SV6 头部解析所需字节数
const LEGACY_HEADER_LEN: usize = 8;

/// 从当前位置读取流头部
///
/// 返回的描述信息中 `header_offset` 指向头部首字节 (已跳过 ID3v2 标签),
/// 读取完成后 `io` 的位置不做保证.
pub fn read_stream_descriptor(io: &mut IoContext) -> MpcResult<StreamDescriptor> {
    let start = io.position()?;
    let header_offset = start + id3v2_size(io)?;
    io.seek(SeekFrom::Start(header_offset))?;

    let mut raw = [0u8; SV7_HEADER_LEN];
    read_header_bytes(io, &mut raw[..LEGACY_HEADER_LEN])?;

    let mut stream = match &raw[..4] {
        [b'M', b'P', b'+', _] => {
            read_header_bytes(io, &mut raw[LEGACY_HEADER_LEN..])?;
            parse_sv7(&raw)?
        }
        b"MPCK" => {
            return Err(MpcError::Unsupported("不支持 SV8 (MPCK) 流".into()));
        }
        _ => parse_legacy(&raw[..LEGACY_HEADER_LEN])?,
    };
    stream.header_offset = header_offset;
    stream.validate()?;

    debug!(
        "Musepack 头部: {:?}, 偏移 {}, {} Hz, {} 帧, 最大子带 {}, M/S={}",
        stream.version,
        header_offset,
        stream.sample_rate,
        stream.frame_count,
        stream.max_band,
        stream.mid_side,
    );
    Ok(stream)
}

/// 探测并返回前置 ID3v2 标签的总长度, 没有标签时为 0
fn id3v2_size(io: &mut IoContext) -> MpcResult<u64> {
    let mut head = [0u8; ID3V2_HEADER_LEN as usize];
    match io.read_exact(&mut head) {
        Ok(()) => {}
        Err(MpcError::Eof) => return Ok(0),
        Err(e) => return Err(e),
    }
    if &head[..3] != b"ID3" {
        return Ok(0);
    }
    // 长度为 4 个 7 位同步安全字节
    if head[6..10].iter().any(|&b| b & 0x80 != 0) {
        return Err(MpcError::InvalidData("ID3v2 标签长度无效".into()));
    }
    let size = head[6..10]
        .iter()
        .fold(0u64, |acc, &b| (acc << 7) | u64::from(b));
    let footer = if head[5] & ID3V2_FOOTER_FLAG != 0 {
        ID3V2_HEADER_LEN
    } else {
        0
    };
    debug!("跳过 ID3v2.{} 标签: {} 字节", head[3], size + footer);
    Ok(ID3V2_HEADER_LEN + size + footer)
}

fn read_header_bytes(io: &mut IoContext, buf: &mut [u8]) -> MpcResult<()> {
    io.read_exact(buf).map_err(|e| match e {
        MpcError::Eof => MpcError::InvalidData("Musepack 头部不完整".into()),
        other => other,
    })
}

/// 解析 SV7 头部
fn parse_sv7(raw: &[u8]) -> MpcResult<StreamDescriptor> {
    let version = match raw[3] {
        0x07 => StreamVersion::Sv7,
        0x17 => StreamVersion::Sv71,
        v => {
            return Err(MpcError::Unsupported(format!(
                "不支持的 SV7 子版本: {v:#04x}"
            )));
        }
    };
    let frame_count = LittleEndian::read_u32(&raw[4..8]);
    let flags = LittleEndian::read_u32(&raw[8..12]);
    // raw[12..20]: 标题/专辑增益与峰值, 解码不使用
    let gapless = LittleEndian::read_u32(&raw[20..24]);

    let mid_side = (flags >> 30) & 1 != 0;
    let max_band = ((flags >> 24) & 0x3F) as u8;
    let sample_rate = SAMPLE_RATES[((flags >> 16) & 0x3) as usize];

    let mut stream = StreamDescriptor::new(
        version,
        sample_rate,
        max_band,
        mid_side,
        u64::from(frame_count),
    );
    stream.true_gapless = gapless >> 31 != 0;
    if stream.true_gapless {
        stream.last_frame_samples = (gapless >> 20) & 0x7FF;
    }
    // 编码器版本位于第 7 个字的最高字节
    stream.encoder_version = raw[27];
    Ok(stream)
}

/// 解析 SV4-SV6 头部的前两个字
fn parse_legacy(raw: &[u8]) -> MpcResult<StreamDescriptor> {
    let w0 = LittleEndian::read_u32(&raw[0..4]);
    let w1 = LittleEndian::read_u32(&raw[4..8]);

    let tag = (w0 >> 11) & 0x3FF;
    let version = match tag {
        4..=6 => StreamVersion::from_tag(tag),
        _ => None,
    }
    .ok_or_else(|| MpcError::Unsupported(format!("无法识别的 Musepack 流版本: {tag}")))?;

    let max_band = ((w0 >> 6) & 0x1F) as u8;
    let mid_side = (w0 >> 21) & 1 != 0;
    let frame_count = match version {
        StreamVersion::Sv4 => w1 >> 16,
        _ => w1,
    };
    Ok(StreamDescriptor::new(
        version,
        44100,
        max_band,
        mid_side,
        u64::from(frame_count),
    ))
}

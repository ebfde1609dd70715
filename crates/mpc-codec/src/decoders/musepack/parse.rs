//! 帧解析: 分辨率、比例因子选择信息、比例因子与量化系数.
//!
//! 两代布局的字段顺序相同: 全部子带的分辨率 (含 M/S 标志) -> SCFI -> 比例因子 -> 系数,
//! 每个字段内按子带递增、先左后右读取.

use std::io::{Read, Seek};

use log::debug;
use mpc_core::{MpcError, MpcResult};

use super::bitreader::BitReader;
use super::huffman::{HuffmanTable, LegacyCodebooks, Sv7Codebooks};
use super::random::NoiseGenerator;
use super::state::{ChannelState, DecoderState, FrameData};
use super::stream::{BAND_SAMPLES, SUBBANDS};
use super::tables::{self, RES_BITS};

/// 解析 SV7 帧负载 (帧长字段之后的部分)
///
/// 分辨率超出可解码范围时停止解析本帧剩余部分, 由帧长校验标记无效.
pub fn read_sv7<R: Read + Seek>(
    br: &mut BitReader<R>,
    books: &Sv7Codebooks,
    state: &mut DecoderState,
    frame: &mut FrameData,
    max_band: usize,
    mid_side: bool,
) -> MpcResult<()> {
    let DecoderState {
        left,
        right,
        ms_flag,
        noise,
    } = state;

    // 子带 0 为 4 位原始值, 其后相对前一子带差分
    left.resolution[0] = br.read(4)? as i32;
    right.resolution[0] = br.read(4)? as i32;
    if mid_side && (left.resolution[0] != 0 || right.resolution[0] != 0) {
        ms_flag[0] = br.read_bool()?;
    }
    let mut max_used = 0;
    for band in 1..=max_band {
        for ch in [&mut *left, &mut *right] {
            let delta = books.resolution.decode(br)?;
            ch.resolution[band] = if delta != 4 {
                ch.resolution[band - 1] + delta
            } else {
                br.read(4)? as i32
            };
        }
        let coded = left.resolution[band] != 0 || right.resolution[band] != 0;
        if mid_side && coded {
            ms_flag[band] = br.read_bool()?;
        }
        if coded {
            max_used = band;
        }
    }
    frame.max_used_band = max_used;

    for band in 0..=max_used {
        for ch in [&mut *left, &mut *right] {
            if ch.resolution[band] != 0 {
                ch.scfi[band] = books.scfi.decode(br)?;
            }
        }
    }

    for band in 0..=max_used {
        for ch in [&mut *left, &mut *right] {
            if ch.resolution[band] != 0 {
                read_scf_sv7(br, &books.dscf, ch, band)?;
            }
        }
    }

    for band in 0..=max_used {
        let channels = [
            (left.resolution[band], &mut frame.left[band]),
            (right.resolution[band], &mut frame.right[band]),
        ];
        for (resolution, coefficients) in channels {
            if !read_samples_sv7(br, books, resolution, coefficients, noise)? {
                debug!("SV7 子带 {band} 分辨率 {resolution} 无法解码, 停止解析本帧");
                return Ok(());
            }
        }
    }
    Ok(())
}

/// 只解析 SV7 分辨率字段, 返回本帧噪声填充 (分辨率 -1) 的声道子带数
///
/// 计数在第一个无法解码的分辨率处截止, 与完整解析时噪声发生器的推进一致.
pub fn count_noise_sv7<R: Read + Seek>(
    br: &mut BitReader<R>,
    books: &Sv7Codebooks,
    max_band: usize,
    mid_side: bool,
) -> MpcResult<usize> {
    let mut resolution = [[0i32; 2]; SUBBANDS];
    resolution[0] = [br.read(4)? as i32, br.read(4)? as i32];
    if mid_side && resolution[0] != [0, 0] {
        br.skip(1)?;
    }
    for band in 1..=max_band {
        for ch in 0..2 {
            let delta = books.resolution.decode(br)?;
            resolution[band][ch] = if delta != 4 {
                resolution[band - 1][ch] + delta
            } else {
                br.read(4)? as i32
            };
        }
        if mid_side && resolution[band] != [0, 0] {
            br.skip(1)?;
        }
    }

    let mut count = 0;
    for &res in resolution[..=max_band].iter().flatten() {
        match res {
            -1 => count += 1,
            -17..=17 => {}
            _ => break,
        }
    }
    Ok(count)
}

/// SV7 比例因子: 首段相对上一帧参考值差分, 后续段相对前一段; 差分值 8 转义为 6 位原始值
fn read_scf_sv7<R: Read + Seek>(
    br: &mut BitReader<R>,
    dscf: &HuffmanTable,
    ch: &mut ChannelState,
    band: usize,
) -> MpcResult<()> {
    let mut next = |base: i32| -> MpcResult<i32> {
        let delta = dscf.decode(br)?;
        Ok(if delta == 8 {
            br.read(6)? as i32
        } else {
            base + delta
        })
    };
    let reference = ch.dscf_reference[band];
    let scf = &mut ch.scf_index[band];
    match ch.scfi[band] {
        1 => {
            scf[0] = next(reference)?;
            scf[1] = next(scf[0])?;
            scf[2] = scf[1];
        }
        2 => {
            scf[0] = next(reference)?;
            scf[1] = scf[0];
            scf[2] = next(scf[1])?;
        }
        3 => {
            scf[0] = next(reference)?;
            scf[1] = scf[0];
            scf[2] = scf[0];
        }
        _ => {
            scf[0] = next(reference)?;
            scf[1] = next(scf[0])?;
            scf[2] = next(scf[1])?;
        }
    }
    ch.dscf_reference[band] = scf[2];
    Ok(())
}

/// 读取一个子带一个声道的 36 个系数, 返回 false 表示分辨率无法解码
fn read_samples_sv7<R: Read + Seek>(
    br: &mut BitReader<R>,
    books: &Sv7Codebooks,
    resolution: i32,
    q: &mut [i32; BAND_SAMPLES],
    noise: &mut NoiseGenerator,
) -> MpcResult<bool> {
    match resolution {
        // 无熵编码数据
        -17..=-2 | 0 => {}
        -1 => {
            for v in q.iter_mut() {
                *v = noise.next_coefficient();
            }
        }
        1 => {
            let table = sv7_quant(books, resolution, br.read(1)?)?;
            for triple in q.chunks_exact_mut(3) {
                let idx = table.decode(br)?;
                triple[0] = idx % 3 - 1;
                triple[1] = (idx / 3) % 3 - 1;
                triple[2] = idx / 9 - 1;
            }
        }
        2 => {
            let table = sv7_quant(books, resolution, br.read(1)?)?;
            for pair in q.chunks_exact_mut(2) {
                let idx = table.decode(br)?;
                pair[0] = idx % 5 - 2;
                pair[1] = idx / 5 - 2;
            }
        }
        3..=7 => {
            let table = sv7_quant(books, resolution, br.read(1)?)?;
            for v in q.iter_mut() {
                *v = table.decode(br)?;
            }
        }
        8..=17 => read_fixed(br, resolution, q)?,
        _ => return Ok(false),
    }
    Ok(true)
}

fn sv7_quant(books: &Sv7Codebooks, resolution: i32, variant: u32) -> MpcResult<&HuffmanTable> {
    books
        .quant(resolution, variant as usize)
        .ok_or_else(|| MpcError::Internal(format!("缺少 SV7 量化码表: 分辨率 {resolution}")))
}

/// 分辨率 8-17 的固定位宽系数
fn read_fixed<R: Read + Seek>(
    br: &mut BitReader<R>,
    resolution: i32,
    q: &mut [i32],
) -> MpcResult<()> {
    let bits = RES_BITS[resolution as usize];
    let dc = tables::dc(resolution);
    for v in q.iter_mut() {
        *v = br.read(bits)? as i32 - dc;
    }
    Ok(())
}

/// 解析 SV4-SV6 帧负载
pub fn read_legacy<R: Read + Seek>(
    br: &mut BitReader<R>,
    books: &LegacyCodebooks,
    state: &mut DecoderState,
    frame: &mut FrameData,
    max_band: usize,
    mid_side: bool,
) -> MpcResult<()> {
    let DecoderState {
        left,
        right,
        ms_flag,
        ..
    } = state;

    let mut max_used = 0;
    for band in 0..=max_band {
        let table = books.region(band);
        left.resolution[band] = legacy_resolution(band, table.decode(br)?)?;
        if mid_side {
            ms_flag[band] = br.read_bool()?;
        }
        right.resolution[band] = legacy_resolution(band, table.decode(br)?)?;
        if left.resolution[band] != 0 || right.resolution[band] != 0 {
            max_used = band;
        }
    }
    frame.max_used_band = max_used;

    for band in 0..=max_used {
        for ch in [&mut *left, &mut *right] {
            if ch.resolution[band] != 0 {
                let bundle = books.scfi_bundle.decode(br)?;
                ch.scfi[band] = bundle >> 1;
                ch.dscf_flag[band] = bundle & 1 != 0;
            }
        }
    }

    for band in 0..=max_used {
        for ch in [&mut *left, &mut *right] {
            if ch.resolution[band] != 0 {
                read_scf_legacy(br, &books.dscf, ch, band)?;
            }
        }
    }

    for band in 0..=max_used {
        let (res_l, res_r) = (left.resolution[band], right.resolution[band]);
        let (q_l, q_r) = (&mut frame.left[band], &mut frame.right[band]);
        let table_l = books.quant(res_l);
        let table_r = books.quant(res_r);
        // 熵编码系数左右交替
        if table_l.is_some() || table_r.is_some() {
            for k in 0..BAND_SAMPLES {
                if let Some(table) = table_l {
                    q_l[k] = table.decode(br)?;
                }
                if let Some(table) = table_r {
                    q_r[k] = table.decode(br)?;
                }
            }
        }
        if res_l > 7 || res_r > 7 {
            let bits_l = RES_BITS[res_l as usize];
            let bits_r = RES_BITS[res_r as usize];
            for k in 0..BAND_SAMPLES {
                if res_l > 7 {
                    q_l[k] = br.read(bits_l)? as i32 - tables::dc(res_l);
                }
                if res_r > 7 {
                    q_r[k] = br.read(bits_r)? as i32 - tables::dc(res_r);
                }
            }
        }
    }
    Ok(())
}

fn legacy_resolution(band: usize, symbol: i32) -> MpcResult<i32> {
    tables::legacy_resolution(band, symbol).ok_or_else(|| {
        MpcError::Internal(format!("旧版分辨率符号越界: 子带 {band} 符号 {symbol}"))
    })
}

/// SV4-SV6 比例因子: 差分标志置位时相对参考值链式差分, 否则为 6 位原始值
fn read_scf_legacy<R: Read + Seek>(
    br: &mut BitReader<R>,
    dscf: &HuffmanTable,
    ch: &mut ChannelState,
    band: usize,
) -> MpcResult<()> {
    let differential = ch.dscf_flag[band];
    let mut next = |base: i32| -> MpcResult<i32> {
        if differential {
            Ok(base + dscf.decode(br)?)
        } else {
            Ok(br.read(6)? as i32)
        }
    };
    let reference = ch.dscf_reference[band];
    let scf = &mut ch.scf_index[band];
    match ch.scfi[band] {
        1 => {
            scf[0] = next(reference)?;
            scf[1] = next(scf[0])?;
            scf[2] = scf[1];
        }
        2 => {
            scf[0] = next(reference)?;
            scf[1] = scf[0];
            scf[2] = next(scf[1])?;
        }
        3 => {
            scf[0] = next(reference)?;
            scf[1] = scf[0];
            scf[2] = scf[0];
        }
        _ => {
            scf[0] = next(reference)?;
            scf[1] = next(scf[0])?;
            scf[2] = next(scf[1])?;
        }
    }
    ch.dscf_reference[band] = scf[2];
    Ok(())
}

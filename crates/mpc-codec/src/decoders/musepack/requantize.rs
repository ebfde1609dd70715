//! 反量化与 M/S 立体声重建.
//!
//! 系数 = 整数码值 × 分辨率缩放常数 × 段比例因子, 每子带 3 段各 12 个采样.

use std::sync::OnceLock;

use super::state::{DecoderState, FrameData, SubbandSamples};
use super::stream::{BAND_SAMPLES, SUBBANDS};
use super::tables;

/// 每个比例因子段的采样数
const SEGMENT_LEN: usize = BAND_SAMPLES / 3;

/// 比例因子表, 按索引低 8 位查找
///
/// `SCF[1] = 1.0`, 索引每增 1 幅度乘 0.83298066476582673961, 每减 1 乘 1.20050805774840750476.
pub fn scale_factors() -> &'static [f32; 256] {
    static TABLE: OnceLock<[f32; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0f32; 256];
        let (mut up, mut down) = (1.0f64, 1.0f64);
        table[1] = 1.0;
        for n in 1..=128i32 {
            up *= 0.832_980_664_765_826_739_61;
            down *= 1.200_508_057_748_407_504_76;
            table[((1 + n) as u8) as usize] = up as f32;
            table[((1 - n) as u8) as usize] = down as f32;
        }
        table
    })
}

#[inline]
fn scf(index: i32) -> f32 {
    scale_factors()[(index as u8) as usize]
}

/// 子带立体声编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BandCoding {
    Silent,
    /// M/S, 两路均有数据
    MidSide,
    /// M/S, 仅 M 有数据: 左右相同
    MidOnly,
    /// M/S, 仅 S 有数据: 左右反相
    SideOnly,
    /// 左右独立
    LeftRight,
}

/// 反量化第 `0..=last_band` 个子带, 其余子带输出 0
pub fn requantize(
    state: &DecoderState,
    frame: &FrameData,
    last_band: usize,
    out: &mut SubbandSamples,
) {
    for band in 0..SUBBANDS {
        if band > last_band {
            for slot in 0..BAND_SAMPLES {
                out.left[slot][band] = 0.0;
                out.right[slot][band] = 0.0;
            }
            continue;
        }

        let res_l = state.left.resolution[band];
        let res_r = state.right.resolution[band];
        let coding = match (state.ms_flag[band], res_l != 0, res_r != 0) {
            (_, false, false) => BandCoding::Silent,
            (true, true, true) => BandCoding::MidSide,
            (true, true, false) => BandCoding::MidOnly,
            (true, false, true) => BandCoding::SideOnly,
            (false, _, _) => BandCoding::LeftRight,
        };

        let q_l = &frame.left[band];
        let q_r = &frame.right[band];
        let cc_l = tables::cc(res_l);
        let cc_r = tables::cc(res_r);

        for segment in 0..3 {
            let fac_l = cc_l * scf(state.left.scf_index[band][segment]);
            let fac_r = cc_r * scf(state.right.scf_index[band][segment]);
            let range = segment * SEGMENT_LEN..(segment + 1) * SEGMENT_LEN;
            for n in range {
                let (l, r) = match coding {
                    BandCoding::Silent => (0.0, 0.0),
                    BandCoding::MidSide => {
                        let m = q_l[n] as f32 * fac_l;
                        let s = q_r[n] as f32 * fac_r;
                        (m + s, m - s)
                    }
                    BandCoding::MidOnly => {
                        let m = q_l[n] as f32 * fac_l;
                        (m, m)
                    }
                    BandCoding::SideOnly => {
                        let s = q_r[n] as f32 * fac_r;
                        (s, -s)
                    }
                    BandCoding::LeftRight => {
                        let l = if res_l != 0 { q_l[n] as f32 * fac_l } else { 0.0 };
                        let r = if res_r != 0 { q_r[n] as f32 * fac_r } else { 0.0 };
                        (l, r)
                    }
                };
                out.left[n][band] = l;
                out.right[n][band] = r;
            }
        }
    }
}

//! 32 子带多相合成滤波器组.
//!
//! 每个时隙: V 向量整体后移 64, 由 32 个子带采样矩阵变换得到新的 64 个 V 值,
//! 再以 512 点窗口 D 加权累加输出 32 个时域采样. 每帧 36 个时隙, 共 1152 个采样.

use std::f64::consts::PI;
use std::sync::OnceLock;

use super::state::SubbandSamples;
use super::stream::{BAND_SAMPLES, CHANNELS, FRAME_LEN, SUBBANDS};

/// 合成窗口 D 的前半部分 (含中点), 放大 65536 倍
const ENWINDOW: [i32; 257] = [
    0, -1, -1, -1, -1, -1, -1, -2, -2, -2, -2, -3, -3, -4, -4, -5,
    -5, -6, -7, -7, -8, -9, -10, -11, -13, -14, -16, -17, -19, -21, -24, -26,
    -29, -31, -35, -38, -41, -45, -49, -53, -58, -63, -68, -73, -79, -85, -91, -97,
    -104, -111, -117, -125, -132, -139, -147, -154, -161, -169, -176, -183, -190, -196, -202, -208,
    213, 218, 222, 225, 227, 228, 228, 227, 224, 221, 215, 208, 200, 189, 177, 163,
    146, 127, 106, 83, 57, 29, -2, -36, -72, -111, -153, -197, -244, -294, -347, -401,
    -459, -519, -581, -645, -711, -779, -848, -919, -991, -1064, -1137, -1210, -1283, -1356, -1428, -1498,
    -1567, -1634, -1698, -1759, -1817, -1870, -1919, -1962, -2001, -2032, -2057, -2075, -2085, -2087, -2080, -2063,
    2037, 2000, 1952, 1893, 1822, 1739, 1644, 1535, 1414, 1280, 1131, 970, 794, 605, 402, 185,
    -45, -288, -545, -814, -1095, -1388, -1692, -2006, -2330, -2663, -3004, -3351, -3705, -4063, -4425, -4788,
    -5153, -5517, -5879, -6237, -6589, -6935, -7271, -7597, -7910, -8209, -8491, -8755, -8998, -9219, -9416, -9585,
    -9727, -9838, -9916, -9959, -9966, -9935, -9863, -9750, -9592, -9389, -9139, -8840, -8492, -8092, -7640, -7134,
    6574, 5959, 5288, 4561, 3776, 2935, 2037, 1082, 70, -998, -2122, -3300, -4533, -5818, -7154, -8540,
    -9975, -11455, -12980, -14548, -16155, -17799, -19478, -21189, -22929, -24694, -26482, -28289, -30112, -31947, -33791, -35640,
    -37489, -39336, -41176, -43006, -44821, -46617, -48390, -50137, -51853, -53534, -55178, -56778, -58333, -59838, -61289, -62684,
    -64019, -65290, -66494, -67629, -68692, -69679, -70590, -71420, -72169, -72835, -73415, -73908, -74313, -74630, -74856, -74992,
    75038,
];

/// V 向量长度
const V_LEN: usize = 1024;

/// 合成窗口 D (512 点)
fn window() -> &'static [f32; 512] {
    static WINDOW: OnceLock<[f32; 512]> = OnceLock::new();
    WINDOW.get_or_init(|| {
        let mut window = [0f32; 512];
        for (i, &raw) in ENWINDOW.iter().enumerate() {
            let v = f64::from(raw) / 65536.0;
            window[i] = v as f32;
            if i > 0 {
                // 后半部分镜像, 除 64 的整数倍位置外取反
                let mirrored = if i % 64 != 0 { -v } else { v };
                window[512 - i] = mirrored as f32;
            }
        }
        window
    })
}

/// 矩阵变换系数 cos((16 + i)(2k + 1)π / 64)
fn matrix() -> &'static [[f32; SUBBANDS]; 64] {
    static MATRIX: OnceLock<[[f32; SUBBANDS]; 64]> = OnceLock::new();
    MATRIX.get_or_init(|| {
        let mut m = [[0f32; SUBBANDS]; 64];
        for (i, row) in m.iter_mut().enumerate() {
            for (k, c) in row.iter_mut().enumerate() {
                *c = ((16 + i) as f64 * (2 * k + 1) as f64 * PI / 64.0).cos() as f32;
            }
        }
        m
    })
}

/// 单声道合成滤波器
#[derive(Debug, Clone)]
pub struct SynthesisFilter {
    /// V 向量 (跨帧携带的历史)
    v: [f32; V_LEN],
}

impl Default for SynthesisFilter {
    fn default() -> Self {
        Self { v: [0.0; V_LEN] }
    }
}

impl SynthesisFilter {
    /// 清空历史
    pub fn reset(&mut self) {
        self.v = [0.0; V_LEN];
    }

    /// 合成一个时隙: 32 个子带采样 -> 32 个时域采样
    pub fn synthesize_slot(&mut self, subband: &[f32; SUBBANDS], out: &mut [f32; SUBBANDS]) {
        let matrix = matrix();
        let window = window();

        self.v.copy_within(0..V_LEN - 64, 64);
        for (v, row) in self.v[..64].iter_mut().zip(matrix.iter()) {
            *v = row.iter().zip(subband).map(|(c, s)| c * s).sum();
        }

        for (j, sample) in out.iter_mut().enumerate() {
            let mut acc = 0f32;
            for i in 0..8 {
                acc += window[64 * i + j] * self.v[128 * i + j];
                acc += window[64 * i + 32 + j] * self.v[128 * i + 96 + j];
            }
            *sample = acc;
        }
    }
}

/// 双声道滤波器组
#[derive(Debug, Clone, Default)]
pub struct FilterBank {
    channels: [SynthesisFilter; CHANNELS],
}

impl FilterBank {
    /// 清空两个声道的历史
    pub fn reset(&mut self) {
        for filter in &mut self.channels {
            filter.reset();
        }
    }

    /// 合成一帧, 输出 1152 × 2 个交错采样到 `out` 开头
    ///
    /// 输出幅度与子带采样同尺度, 满幅约为 ±32768.
    pub fn run(&mut self, samples: &SubbandSamples, out: &mut [f32]) {
        debug_assert!(out.len() >= FRAME_LEN * CHANNELS);
        let mut slot_out = [0f32; SUBBANDS];
        for (ch, (filter, input)) in self
            .channels
            .iter_mut()
            .zip([&samples.left, &samples.right])
            .enumerate()
        {
            for (slot, subband) in input.iter().enumerate().take(BAND_SAMPLES) {
                filter.synthesize_slot(subband, &mut slot_out);
                let base = slot * SUBBANDS;
                for (j, &v) in slot_out.iter().enumerate() {
                    out[(base + j) * CHANNELS + ch] = v;
                }
            }
        }
    }
}

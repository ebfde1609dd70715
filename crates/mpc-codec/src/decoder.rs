//! 解码器 trait 定义.
//!
//! 宿主流水线通过 `Decoder` trait 拉取解码数据.

use mpc_core::MpcResult;

use crate::decoders::musepack::StreamDescriptor;
use crate::frame::AudioFrame;

/// 解码器 trait
///
/// 拉取式接口: 每次调用完整解码一帧后返回, 不使用后台线程或回调.
///
/// 解码流程:
/// 1. 反复调用 `receive_frame()` 取出解码后的帧
/// 2. 返回 `Ok(None)` 表示流已结束
/// 3. 需要随机访问时调用 `seek()`, 之后继续 `receive_frame()`
pub trait Decoder: Send {
    /// 获取解码器名称
    fn name(&self) -> &str;

    /// 获取流描述信息
    fn stream(&self) -> &StreamDescriptor;

    /// 解码下一帧
    ///
    /// # 返回
    /// - `Ok(Some(frame))`: 成功解码一帧
    /// - `Ok(None)`: 已到达流末尾
    /// - `Err(_)`: I/O 错误或码流意外截断
    fn receive_frame(&mut self) -> MpcResult<Option<AudioFrame>>;

    /// 定位到指定帧, 后续 `receive_frame()` 从该帧开始输出
    fn seek(&mut self, frame: u64) -> MpcResult<()>;

    /// 重置解码器到流起始状态
    fn reset(&mut self) -> MpcResult<()>;
}

//! 统一错误类型定义.
//!
//! 所有 mpc crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// Musepack 解码统一错误类型
#[derive(Debug, Error)]
pub enum MpcError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的流版本或特性
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 读取头部时已到达输入末尾
    #[error("已到达流末尾")]
    Eof,

    /// 帧数据读取中途码流耗尽
    #[error("码流意外结束: 位置 {0}")]
    UnexpectedEof(u64),

    /// 无效数据 (损坏的头部、码表等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 内部错误 (不应发生)
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一 Result 类型
pub type MpcResult<T> = Result<T, MpcError>;

//! # mpc-codec
//!
//! Musepack 解码器库, 提供解码器 trait、音频帧抽象以及 SV4-SV7 码流解码实现.
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use mpc_codec::decoders::musepack::{DecoderConfig, MpcDecoder, StreamDescriptor, StreamVersion};
//!
//! # fn demo(bytes: Vec<u8>) -> mpc_core::MpcResult<()> {
//! let stream = StreamDescriptor::new(StreamVersion::Sv7, 44100, 31, true, 100);
//! let mut decoder = MpcDecoder::new(Cursor::new(bytes), stream, DecoderConfig::default())?;
//! let mut pcm = vec![0f32; mpc_codec::decoders::musepack::MAX_FRAME_SAMPLES];
//! while decoder.decode_f32(&mut pcm)? > 0 {}
//! # Ok(())
//! # }
//! ```

pub mod decoder;
pub mod decoders;
pub mod frame;

// 重导出常用类型
pub use decoder::Decoder;
pub use decoders::musepack::{DecoderConfig, MpcDecoder, StreamDescriptor, StreamVersion};
pub use frame::AudioFrame;

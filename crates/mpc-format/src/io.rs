//! I/O 抽象层.
//!
//! 为头部解析、位流读取与 WAV 输出提供统一的字节流接口,
//! 支持文件与内存缓冲区两种后端. `IoContext` 同时实现 `std::io::Read` 与
//! `std::io::Seek`, 可直接交给解码器的位流读取器使用.

use std::io::{self, Read, Seek, SeekFrom, Write};

use mpc_core::{MpcError, MpcResult};

/// I/O 上下文
///
/// 封装底层 I/O 操作, 带读缓冲.
pub struct IoContext {
    /// 内部 I/O 实现
    inner: Box<dyn IoBackend>,
    /// 读缓冲区
    buffer: Vec<u8>,
    /// 缓冲区中的有效数据长度
    buf_len: usize,
    /// 缓冲区当前读取位置
    buf_pos: usize,
}

/// I/O 后端 trait
///
/// 实现此 trait 以支持不同的 I/O 来源.
pub trait IoBackend: Send {
    /// 读取数据到缓冲区
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// 全部写入
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;
    /// 定位 (seek)
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;
    /// 获取当前位置
    fn position(&mut self) -> io::Result<u64>;
    /// 是否支持 seek
    fn is_seekable(&self) -> bool;
}

/// 默认缓冲区大小 (32 KB)
const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

impl IoContext {
    /// 从 I/O 后端创建上下文
    pub fn new(backend: Box<dyn IoBackend>) -> Self {
        Self {
            inner: backend,
            buffer: vec![0u8; DEFAULT_BUFFER_SIZE],
            buf_len: 0,
            buf_pos: 0,
        }
    }

    /// 从文件路径打开 (只读)
    pub fn open_read(path: &str) -> MpcResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    /// 从文件路径打开 (写入)
    pub fn open_write(path: &str) -> MpcResult<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    /// 从内存数据创建 (可读可写)
    pub fn from_memory(data: Vec<u8>) -> Self {
        Self::new(Box::new(MemoryBackend::from_data(data)))
    }

    // ========================
    // 读取方法
    // ========================

    /// 读取指定字节数, 数据不足时返回 `Eof`
    pub fn read_exact(&mut self, buf: &mut [u8]) -> MpcResult<()> {
        let mut total_read = 0;
        while total_read < buf.len() {
            let buffered = self.buf_len - self.buf_pos;
            if buffered > 0 {
                let to_copy = buffered.min(buf.len() - total_read);
                buf[total_read..total_read + to_copy]
                    .copy_from_slice(&self.buffer[self.buf_pos..self.buf_pos + to_copy]);
                self.buf_pos += to_copy;
                total_read += to_copy;
            } else {
                self.buf_pos = 0;
                self.buf_len = self.inner.read(&mut self.buffer)?;
                if self.buf_len == 0 {
                    return Err(MpcError::Eof);
                }
            }
        }
        Ok(())
    }

    // ========================
    // 写入方法
    // ========================

    /// 写入全部数据
    ///
    /// 读缓冲中尚有未消耗数据时, 先把后端位置对齐到逻辑位置.
    pub fn write_all(&mut self, buf: &[u8]) -> MpcResult<()> {
        if self.buf_pos < self.buf_len {
            let pos = self.position()?;
            self.seek(SeekFrom::Start(pos))?;
        }
        self.inner.write_all(buf)?;
        Ok(())
    }

    /// 写入 u16 小端
    pub fn write_u16_le(&mut self, v: u16) -> MpcResult<()> {
        self.write_all(&v.to_le_bytes())
    }

    /// 写入 u32 小端
    pub fn write_u32_le(&mut self, v: u32) -> MpcResult<()> {
        self.write_all(&v.to_le_bytes())
    }

    /// 写入 4 字节标签
    pub fn write_tag(&mut self, tag: &[u8; 4]) -> MpcResult<()> {
        self.write_all(tag)
    }

    // ========================
    // 定位方法
    // ========================

    /// 定位 (seek)
    ///
    /// 注意: seek 会清空读缓冲区.
    pub fn seek(&mut self, pos: SeekFrom) -> MpcResult<u64> {
        Ok(self.seek_inner(pos)?)
    }

    /// 获取当前位置
    ///
    /// 考虑读缓冲区中尚未消耗的数据量.
    pub fn position(&mut self) -> MpcResult<u64> {
        Ok(self.logical_position()?)
    }

    /// 是否支持随机访问
    pub fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }

    fn logical_position(&mut self) -> io::Result<u64> {
        let raw_pos = self.inner.position()?;
        let buffered = (self.buf_len - self.buf_pos) as u64;
        Ok(raw_pos - buffered)
    }

    fn seek_inner(&mut self, pos: SeekFrom) -> io::Result<u64> {
        // 相对定位以逻辑位置为基准, 不能直接交给后端
        let pos = match pos {
            SeekFrom::Current(offset) => {
                let base = self.logical_position()?;
                let target = base.checked_add_signed(offset).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek 位置不能为负")
                })?;
                SeekFrom::Start(target)
            }
            other => other,
        };
        self.buf_pos = 0;
        self.buf_len = 0;
        self.inner.seek(pos)
    }
}

impl Read for IoContext {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.buf_pos == self.buf_len {
            // 大块读取绕过缓冲区
            if buf.len() >= self.buffer.len() {
                return self.inner.read(buf);
            }
            self.buf_pos = 0;
            self.buf_len = self.inner.read(&mut self.buffer)?;
        }
        let n = (self.buf_len - self.buf_pos).min(buf.len());
        buf[..n].copy_from_slice(&self.buffer[self.buf_pos..self.buf_pos + n]);
        self.buf_pos += n;
        Ok(n)
    }
}

impl Seek for IoContext {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.seek_inner(pos)
    }
}

/// 文件 I/O 后端
struct FileBackend {
    file: std::fs::File,
}

impl FileBackend {
    fn new(file: std::fs::File) -> Self {
        Self { file }
    }
}

impl IoBackend for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// 内存缓冲区 I/O 后端
///
/// 用于测试和内存中处理.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// 数据缓冲区
    data: Vec<u8>,
    /// 当前位置
    pos: usize,
}

impl MemoryBackend {
    /// 从已有数据创建 (用于读取)
    pub fn from_data(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// 创建空缓冲区 (用于写入)
    pub fn new() -> Self {
        Self::default()
    }
}

impl IoBackend for MemoryBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.data.len().saturating_sub(self.pos);
        let to_read = buf.len().min(available);
        if to_read == 0 {
            return Ok(0);
        }
        buf[..to_read].copy_from_slice(&self.data[self.pos..self.pos + to_read]);
        self.pos += to_read;
        Ok(to_read)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.pos > self.data.len() {
            self.data.resize(self.pos, 0);
        }
        // 覆盖已有数据, 超出部分追加
        let overlap = (self.data.len() - self.pos).min(buf.len());
        self.data[self.pos..self.pos + overlap].copy_from_slice(&buf[..overlap]);
        self.data.extend_from_slice(&buf[overlap..]);
        self.pos += buf.len();
        Ok(())
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(offset) => self.data.len() as i64 + offset,
            SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek 位置不能为负",
            ));
        }
        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.pos as u64)
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

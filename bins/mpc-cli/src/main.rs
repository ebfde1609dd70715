//! mpc-cli - Musepack 解码命令行工具
//!
//! 将 SV4-SV7 Musepack 文件解码为 16 位或浮点 WAV.

mod config;
mod logging;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use mpc_codec::decoders::musepack::{MpcDecoder, StreamDescriptor};
use mpc_codec::Decoder;
use mpc_format::{IoContext, WavWriter, read_stream_descriptor};

use config::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "mpc-cli", version, about = "纯 Rust Musepack 解码工具")]
struct Cli {
    /// 输入文件路径
    #[arg(short, long)]
    input: String,

    /// 输出 WAV 文件路径
    #[arg(short, long)]
    output: Option<String>,

    /// 输出 32 位浮点 WAV (默认 16 位)
    #[arg(long)]
    float: bool,

    /// 关闭 16 位输出的抖动
    #[arg(long)]
    no_dither: bool,

    /// 起始时间偏移 (秒)
    #[arg(long)]
    start: Option<f64>,

    /// 最多解码的帧数
    #[arg(long)]
    frames: Option<u64>,

    /// 使用精确定位 (逐帧解析到目标)
    #[arg(long)]
    exact_seek: bool,

    /// 噪声填充种子
    #[arg(long)]
    seed: Option<u64>,

    /// JSON 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 以 JSON 打印流信息
    #[arg(long)]
    info: bool,

    /// 日志级别 (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// `--info` 输出
#[derive(Serialize)]
struct StreamInfo<'a> {
    filename: &'a str,
    version: String,
    sample_rate: u32,
    channels: u32,
    max_band: u8,
    mid_side: bool,
    frame_count: u64,
    true_gapless: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_frame_samples: Option<u32>,
    total_samples: u64,
    duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoder_version: Option<u8>,
    header_offset: u64,
}

impl<'a> StreamInfo<'a> {
    fn new(filename: &'a str, stream: &StreamDescriptor) -> Self {
        Self {
            filename,
            version: format!("{:?}", stream.version),
            sample_rate: stream.sample_rate,
            channels: stream.channels,
            max_band: stream.max_band,
            mid_side: stream.mid_side,
            frame_count: stream.frame_count,
            true_gapless: stream.true_gapless,
            last_frame_samples: (stream.last_frame_samples > 0)
                .then_some(stream.last_frame_samples),
            total_samples: stream.total_samples(),
            duration: stream.duration_ms() as f64 / 1000.0,
            encoder_version: (stream.encoder_version > 0).then_some(stream.encoder_version),
            header_offset: stream.header_offset,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("错误: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    // 命令行参数覆盖配置文件
    config.float |= cli.float;
    config.dither &= !cli.no_dither;
    config.exact_seek |= cli.exact_seek;
    if let Some(seed) = cli.seed {
        config.noise_seed = seed;
    }
    logging::init(&config.logging, cli.verbose)?;

    let mut io = IoContext::open_read(&cli.input)
        .with_context(|| format!("无法打开输入文件 '{}'", cli.input))?;
    let stream = read_stream_descriptor(&mut io).context("无法解析 Musepack 头部")?;

    if cli.info {
        let text = serde_json::to_string_pretty(&StreamInfo::new(&cli.input, &stream))?;
        println!("{text}");
        if cli.output.is_none() {
            return Ok(());
        }
    }
    let output = cli
        .output
        .as_deref()
        .context("必须指定输出文件 (-o <输出文件>)")?;

    decode_to_wav(io, stream, &config, cli, output)
}

fn decode_to_wav(
    io: IoContext,
    stream: StreamDescriptor,
    config: &CliConfig,
    cli: &Cli,
    output: &str,
) -> Result<()> {
    let decoder_config = config.decoder_config();
    let sample_format = decoder_config.output.sample_format();
    let sample_rate = stream.sample_rate;
    let channels = stream.channels as u16;

    let mut decoder = MpcDecoder::new(io, stream, decoder_config).context("无法创建解码器")?;
    if let Some(start) = cli.start.filter(|s| *s > 0.0) {
        decoder
            .seek_ms((start * 1000.0) as u64)
            .with_context(|| format!("定位到 {start} 秒失败"))?;
        info!("从第 {} 帧开始解码", decoder.position().frame);
    }

    let mut out = IoContext::open_write(output)
        .with_context(|| format!("无法创建输出文件 '{output}'"))?;
    let mut wav = WavWriter::write_header(&mut out, sample_rate, channels, sample_format)?;

    let mut frames = 0u64;
    let mut samples = 0u64;
    let mut peak_kbps = 0f64;
    while cli.frames.is_none_or(|limit| frames < limit) {
        let Some(frame) = decoder.receive_frame()? else {
            break;
        };
        wav.write_frame(&mut out, &frame)?;
        frames += 1;
        samples += u64::from(frame.nb_samples);
        peak_kbps = peak_kbps.max(decoder.current_bitrate());
    }
    wav.finish(&mut out)?;

    let stats = decoder.stats();
    info!(
        "解码完成: {} 帧, {} 采样, 无效帧 {}, 削波 {}, 峰值码率 {:.1} kbps",
        frames, samples, stats.invalid_frames, stats.clipped_samples, peak_kbps
    );
    eprintln!(
        "{} -> {}: {} 帧, {:.2} 秒, {} Hz, {}",
        cli.input,
        output,
        frames,
        samples as f64 / f64::from(sample_rate),
        sample_rate,
        sample_format,
    );
    Ok(())
}

//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::constants::DEFAULT_DENSITY;
use clap::Parser;
use std::path::PathBuf;

/// 按感知亮度加权的 LSB 隐写工具：在无损格式图像 (如 PNG, BMP) 中隐藏或恢复任意数据。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "按感知亮度加权的 LSB 隐写工具。人眼越不敏感的颜色通道 (蓝 > 红 > 绿) 承载越多的比特，以减少可见失真。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏) 和 recover (恢复)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在无损格式图像 (如 PNG, BMP) 中隐藏文件内容。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的内容。
    Recover(RecoverArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的内容的文件路径。
    #[arg(short, long)]
    pub text: PathBuf,

    /// 结果图像的输出路径。默认为输入图像旁的 `doctored_<名称>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 每个像素写入的比特数 (0-24)，超过 24 按 24 处理。
    #[arg(short = 'n', long, default_value_t = DEFAULT_DENSITY)]
    pub density: u32,

    /// 输出文件已存在时直接覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复内容的输出路径。默认为图像旁的 `recovered_<名称>.txt`。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 隐藏时使用的密度，必须与 hide 时一致。
    #[arg(short = 'n', long, default_value_t = DEFAULT_DENSITY)]
    pub density: u32,

    /// 输出文件已存在时直接覆盖。
    #[arg(short, long)]
    pub force: bool,
}

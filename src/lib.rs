//! # weighted_lsb 库
//!
//! 本库包含按感知亮度加权的 LSB 隐写工具的核心逻辑。
//! [`bitstream`] 与 [`pixel`] 是不依赖任何 I/O 的比特分配与打包引擎，
//! 其余模块负责负载封装、文件读写与命令行交互。

// 声明库包含的所有模块。

pub mod bitstream;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod pixel;
pub mod steganography;

pub use bitstream::{BitStream, ChannelDensity};
pub use error::StegoError;
pub use pixel::{Channel, Pixel};

//! # 负载封装模块
//!
//! 在负载前加上大端序 `u32` 长度头后写入像素，读取时先解析长度头，
//! 再取出恰好该长度的负载。容量检查由调用方负责。

use crate::bitstream::{BitStream, ChannelDensity};
use crate::constants::LENGTH_HEADER_BYTES;
use crate::error::{Result, StegoError};
use crate::pixel::Pixel;

/// 将 `payload` 连同长度头写入 `pixels`，返回写入的比特数。
///
/// 像素不足时只写入能容纳的部分。
///
/// # Errors
///
/// 负载长度无法用 `u32` 表示时返回 [`StegoError::PayloadTooLarge`]，此时像素不会被修改。
pub fn conceal(pixels: &mut [Pixel], payload: &[u8], density: u32) -> Result<usize> {
    let header = length_header(payload.len())?;

    let mut stream = BitStream::new(density);
    stream.add_bytes(&header);
    stream.add_bytes(payload);

    let written = stream.write_pixels(pixels);
    log::info!(
        "concealed {} of {} frame bits in {} pixels",
        written,
        stream.len(),
        pixels.len()
    );
    Ok(written)
}

/// 从 `pixels` 中还原由 [`conceal`] 写入的负载。
///
/// 只读取长度头与负载所占的前缀像素，其后的像素不参与。
///
/// # Errors
///
/// 图像中的比特不足以容纳长度头或其声明的负载时，返回 [`StegoError::Truncated`]。
pub fn reveal(pixels: &[Pixel], density: u32) -> Result<Vec<u8>> {
    let header = read_prefix(pixels, density, LENGTH_HEADER_BYTES * 8);
    let len = (0..LENGTH_HEADER_BYTES)
        .map(|i| header.byte_at(i))
        .collect::<Option<Vec<u8>>>()
        .ok_or(StegoError::Truncated {
            expected: LENGTH_HEADER_BYTES,
            available: header.len() / 8,
        })?
        .iter()
        .fold(0usize, |len, &byte| (len << 8) | usize::from(byte));

    let frame_bits = LENGTH_HEADER_BYTES.saturating_add(len).saturating_mul(8);
    let frame = read_prefix(pixels, density, frame_bits);
    if frame.len() < frame_bits {
        return Err(StegoError::Truncated {
            expected: len,
            available: (frame.len() / 8).saturating_sub(LENGTH_HEADER_BYTES),
        });
    }

    let payload = (LENGTH_HEADER_BYTES..LENGTH_HEADER_BYTES + len)
        .filter_map(|i| frame.byte_at(i))
        .collect();

    log::info!("revealed {} payload bytes from {} pixels", len, pixels.len());
    Ok(payload)
}

/// `pixel_count` 个像素在给定密度下扣除长度头后能容纳的负载字节数。
pub fn capacity(pixel_count: usize, density: u32) -> usize {
    let bits_per_pixel = ChannelDensity::allocate(density).total() as usize;
    (pixel_count.saturating_mul(bits_per_pixel) / 8).saturating_sub(LENGTH_HEADER_BYTES)
}

fn length_header(len: usize) -> Result<[u8; LENGTH_HEADER_BYTES]> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| StegoError::PayloadTooLarge { len })
}

/// 读取足以覆盖前 `bits` 个比特的像素，像素不足时读完为止。
fn read_prefix(pixels: &[Pixel], density: u32, bits: usize) -> BitStream {
    let mut stream = BitStream::new(density);
    let bits_per_pixel = stream.bits_per_pixel() as usize;
    if bits_per_pixel > 0 {
        let count = bits.div_ceil(bits_per_pixel).min(pixels.len());
        stream.read_pixels(&pixels[..count]);
    }
    stream
}

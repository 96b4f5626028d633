//! # 命令处理逻辑模块
//!
//! 包含处理 `hide` 和 `recover` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::cli::{HideArgs, RecoverArgs};
use crate::constants::{HIDDEN_IMAGE_PREFIX, RECOVERED_TEXT_PREFIX};
use crate::pixel::Pixel;
use crate::steganography::{capacity, conceal, reveal};
use anyhow::{Context, Result};
use colored::Colorize;
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和待隐藏文件、检查隐写空间是否足够、将负载写入像素，
/// 最后将结果保存为目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径、密度与覆盖选项的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取或解码输入的图像，或无法读取待隐藏文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 图像没有足够的空间来隐藏内容。
/// * 内容长度超出长度头可表示的范围。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_output(&args.image, HIDDEN_IMAGE_PREFIX, "png"));
    ensure_writable(&dest, args.force)?;

    let mut picture = load_image(&args.image)?;

    let text = fs::read(&args.text).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    let mut pixels = picture_pixels(&picture);

    let required_space = text.len();
    let available_space = capacity(pixels.len(), args.density);
    anyhow::ensure!(
        available_space >= required_space,
        "Not enough space in the image to hide the text. \nRequired: {} bytes, Available: {} bytes",
        required_space.to_string().red().bold(),
        available_space.to_string().green().bold()
    );

    conceal(&mut pixels, &text, args.density).with_context(|| {
        format!(
            "Failed to hide the contents of {}.",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    picture
        .pixels_mut()
        .zip(&pixels)
        .for_each(|(target, pixel)| {
            let alpha = target.0[3];
            *target = Rgba([pixel.red, pixel.green, pixel.blue, alpha]);
        });

    picture.save(&dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    log::info!(
        "hid {} bytes at density {} in {}",
        text.len(),
        args.density,
        args.image.display()
    );
    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、按指定密度还原隐藏的负载，
/// 最后将恢复的内容写入目标文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径、密度与覆盖选项的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取或解码输入的图像文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 图像中的数据不完整 (密度不匹配或并未隐藏内容)。
/// * 无法写入到目标文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let text_path = args
        .text
        .clone()
        .unwrap_or_else(|| default_output(&args.image, RECOVERED_TEXT_PREFIX, "txt"));
    ensure_writable(&text_path, args.force)?;

    let picture = load_image(&args.image)?;
    let pixels = picture_pixels(&picture);

    let text = reveal(&pixels, args.density).with_context(|| {
        format!(
            "Failed to recover hidden data from '{}' at density {}. \nThe image may not contain a hidden message or was written with another density.",
            args.image.to_string_lossy().red().bold(),
            args.density.to_string().red().bold()
        )
    })?;

    fs::write(&text_path, &text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            text_path.to_string_lossy().red().bold()
        )
    })?;

    log::info!("recovered {} bytes from {}", text.len(), args.image.display());
    println!(
        "The text has been successfully recovered and saved: {}",
        text_path.to_string_lossy().green().bold()
    );
    Ok(())
}

fn load_image(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;
    Ok(image.to_rgba8())
}

/// 按行优先顺序取出每个像素的 RGB 值，透明度不参与隐写。
fn picture_pixels(picture: &RgbaImage) -> Vec<Pixel> {
    picture
        .pixels()
        .map(|&Rgba([red, green, blue, _])| Pixel::new(red, green, blue))
        .collect()
}

/// 在 `source` 所在目录下生成 `<prefix><文件名主干>.<extension>`。
fn default_output(source: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{prefix}{stem}.{extension}"))
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_sits_next_to_source() {
        let path = default_output(Path::new("dir/photo.bmp"), HIDDEN_IMAGE_PREFIX, "png");
        assert_eq!(path, Path::new("dir/doctored_photo.png"));

        let path = default_output(Path::new("doctored_photo.png"), RECOVERED_TEXT_PREFIX, "txt");
        assert_eq!(path, Path::new("recovered_doctored_photo.txt"));
    }
}

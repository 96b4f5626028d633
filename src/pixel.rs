//! # 像素模块
//!
//! 表示单个像素的三个 8 位颜色通道，并提供按通道的比特级读写。

use crate::constants::BITS_PER_CHANNEL;
use crate::error::{Result, StegoError};

/// 颜色通道。顺序即编码顺序：红、绿、蓝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Channel {
    /// 按编码顺序排列的全部通道。
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// 通道的感知亮度系数 (ITU-R BT.709)。
    pub const fn luminance(self) -> f64 {
        match self {
            Channel::Red => 0.2126,
            Channel::Green => 0.7152,
            Channel::Blue => 0.0722,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// 一个 RGB 像素。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Pixel {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// 从 `0xRRGGBB` 形式的整数构造像素，高于 24 位的部分被丢弃。
    pub const fn from_rgb(packed: u32) -> Self {
        Self {
            red: (packed >> 16) as u8,
            green: (packed >> 8) as u8,
            blue: packed as u8,
        }
    }

    /// 打包为 `0xRRGGBB`。
    pub const fn to_rgb(self) -> u32 {
        ((self.red as u32) << 16) | ((self.green as u32) << 8) | self.blue as u32
    }

    pub const fn channel(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut u8 {
        match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
        }
    }

    /// 读取指定通道的第 `index` 位 (0 为最低有效位)。
    ///
    /// # Errors
    ///
    /// `index` 大于 7 时返回 [`StegoError::IndexOutOfRange`]。
    pub fn bit(&self, channel: Channel, index: u8) -> Result<bool> {
        if index >= BITS_PER_CHANNEL {
            return Err(StegoError::IndexOutOfRange { index });
        }
        Ok((self.channel(channel) >> index) & 1 == 1)
    }

    /// 设置或清除指定通道的第 `index` 位，其余位保持不变。
    ///
    /// `index` 大于 7 时不做任何修改。
    pub fn set_bit(&mut self, channel: Channel, index: u8, value: bool) {
        if index >= BITS_PER_CHANNEL {
            return;
        }
        let byte = self.channel_mut(channel);
        if value {
            *byte |= 1 << index;
        } else {
            *byte &= !(1 << index);
        }
    }
}

impl From<u32> for Pixel {
    fn from(packed: u32) -> Self {
        Self::from_rgb(packed)
    }
}

impl From<Pixel> for u32 {
    fn from(pixel: Pixel) -> Self {
        pixel.to_rgb()
    }
}

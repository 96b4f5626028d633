//! # 比特流模块
//!
//! `BitStream` 持有一串按编码顺序排列的比特，并在构造时根据请求的密度
//! 决定每个颜色通道分得的比特数。读取像素与写入像素都遵循同一分配：
//! 每个像素内依次为红、绿、蓝，每个通道从最低有效位开始。

use crate::constants::{BITS_PER_CHANNEL, MAX_DENSITY};
use crate::error::{Result, StegoError};
use crate::pixel::{Channel, Pixel};

/// 每个颜色通道在单个像素中分得的比特数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ChannelDensity([u8; 3]);

impl ChannelDensity {
    /// 按感知亮度加权的贪心分配。
    ///
    /// 每一步把一个比特分给当前权重 `luminance * 2^bits` 最小的通道，
    /// 权重相同时优先红，其次绿，最后蓝。已满 8 位的通道不再参与。
    /// 超过 24 的密度按 24 处理。
    pub fn allocate(density: u32) -> Self {
        let mut allocation = Self::default();
        for _ in 0..density.min(MAX_DENSITY) {
            allocation.add_bit();
        }
        allocation
    }

    fn weight(&self, channel: Channel) -> f64 {
        let bits = self.get(channel);
        if bits >= BITS_PER_CHANNEL {
            return f64::INFINITY;
        }
        channel.luminance() * f64::from(1u32 << bits)
    }

    fn add_bit(&mut self) {
        let red = self.weight(Channel::Red);
        let green = self.weight(Channel::Green);
        let blue = self.weight(Channel::Blue);

        let channel = if red < green && red < blue {
            Channel::Red
        } else if green < red && green < blue {
            Channel::Green
        } else {
            Channel::Blue
        };
        self.0[channel.index()] += 1;
    }

    pub const fn get(&self, channel: Channel) -> u8 {
        self.0[channel as usize]
    }

    /// 每个像素承载的比特总数。
    pub fn total(&self) -> u32 {
        self.0.iter().map(|&bits| u32::from(bits)).sum()
    }

    /// 单个像素内按编码顺序排列的 `(通道, 位索引)`。
    pub fn slots(&self) -> impl Iterator<Item = (Channel, u8)> + '_ {
        Channel::ALL
            .into_iter()
            .flat_map(move |channel| (0..self.get(channel)).map(move |index| (channel, index)))
    }
}

/// 可增长的比特序列，附带固定的通道密度分配。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStream {
    bits: Vec<bool>,
    density: ChannelDensity,
}

impl BitStream {
    /// 创建一个空的比特流，并根据 `density` 计算通道分配。
    pub fn new(density: u32) -> Self {
        let allocation = ChannelDensity::allocate(density);
        log::debug!(
            "density {} allocated as r={} g={} b={}",
            density,
            allocation.get(Channel::Red),
            allocation.get(Channel::Green),
            allocation.get(Channel::Blue)
        );
        Self {
            bits: Vec::new(),
            density: allocation,
        }
    }

    pub fn density(&self) -> ChannelDensity {
        self.density
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.density.total()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn add_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// 追加一个字节，最高位在前。
    pub fn add_byte(&mut self, byte: u8) {
        self.bits.extend((0..8).rev().map(|shift| (byte >> shift) & 1 == 1));
    }

    pub fn add_bytes(&mut self, bytes: &[u8]) {
        self.bits.reserve(bytes.len() * 8);
        bytes.iter().for_each(|&byte| self.add_byte(byte));
    }

    /// 将整个比特流打包为字节，每 8 位一组，组内第一位为字节最高位。
    ///
    /// # Errors
    ///
    /// 比特数不是 8 的整数倍时返回 [`StegoError::IncompleteData`]。
    pub fn data(&self) -> Result<Vec<u8>> {
        if self.bits.len() % 8 != 0 {
            return Err(StegoError::IncompleteData {
                bits: self.bits.len(),
            });
        }
        Ok(self.bits.chunks_exact(8).map(pack_byte).collect())
    }

    /// 第 `index` 个完整字节；比特不足时返回 `None`。
    pub fn byte_at(&self, index: usize) -> Option<u8> {
        let start = index.checked_mul(8)?;
        let group = self.bits.get(start..start.checked_add(8)?)?;
        Some(pack_byte(group))
    }

    /// 按通道分配从像素中读取比特并追加到流末尾。
    pub fn read_pixel(&mut self, pixel: &Pixel) {
        for (channel, index) in self.density.slots() {
            self.bits.push((pixel.channel(channel) >> index) & 1 == 1);
        }
    }

    pub fn read_pixels<'a, I>(&mut self, pixels: I)
    where
        I: IntoIterator<Item = &'a Pixel>,
    {
        for pixel in pixels {
            self.read_pixel(pixel);
        }
    }

    /// 把流中的比特按顺序写入像素中 `read_pixel` 会读取的位置。
    ///
    /// 比特或像素任一用尽即停止，返回实际写入的比特数。
    pub fn write_pixels(&self, pixels: &mut [Pixel]) -> usize {
        if self.bits_per_pixel() == 0 {
            return 0;
        }

        let mut bits = self.bits.iter().copied();
        let mut written = 0;
        'pixels: for pixel in pixels.iter_mut() {
            for (channel, index) in self.density.slots() {
                let Some(bit) = bits.next() else {
                    break 'pixels;
                };
                pixel.set_bit(channel, index, bit);
                written += 1;
            }
        }
        written
    }
}

fn pack_byte(group: &[bool]) -> u8 {
    group
        .iter()
        .fold(0u8, |byte, &bit| (byte << 1) | u8::from(bit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(density: u32) -> (u8, u8, u8) {
        let allocation = ChannelDensity::allocate(density);
        (
            allocation.get(Channel::Red),
            allocation.get(Channel::Green),
            allocation.get(Channel::Blue),
        )
    }

    #[test]
    fn allocation_follows_luminance_weights() {
        let expected = [
            (0, 0, 0),
            (0, 0, 1),
            (0, 0, 2),
            (1, 0, 2),
            (1, 0, 3),
            (2, 0, 3),
            (2, 0, 4),
            (2, 1, 4),
            (3, 1, 4),
            (3, 1, 5),
            (3, 2, 5),
            (4, 2, 5),
            (4, 2, 6),
            (4, 3, 6),
            (5, 3, 6),
            (5, 3, 7),
            (5, 4, 7),
            (6, 4, 7),
            (6, 4, 8),
            (6, 5, 8),
            (7, 5, 8),
            (7, 6, 8),
            (8, 6, 8),
            (8, 7, 8),
            (8, 8, 8),
        ];
        for (density, &want) in expected.iter().enumerate() {
            assert_eq!(triple(density as u32), want, "density {density}");
        }
    }

    #[test]
    fn allocation_sums_to_clamped_density() {
        for density in 0..=40u32 {
            let allocation = ChannelDensity::allocate(density);
            assert_eq!(allocation.total(), density.min(24));
            for channel in Channel::ALL {
                assert!(allocation.get(channel) <= 8);
            }
            assert_eq!(allocation, ChannelDensity::allocate(density));
        }
    }

    #[test]
    fn slots_are_red_green_blue_lsb_first() {
        let slots: Vec<_> = ChannelDensity::allocate(7).slots().collect();
        assert_eq!(
            slots,
            vec![
                (Channel::Red, 0),
                (Channel::Red, 1),
                (Channel::Green, 0),
                (Channel::Blue, 0),
                (Channel::Blue, 1),
                (Channel::Blue, 2),
                (Channel::Blue, 3),
            ]
        );
    }

    #[test]
    fn packs_msb_first() {
        let mut stream = BitStream::new(0);
        (0..8).for_each(|_| stream.add_bit(true));
        (0..7).for_each(|_| stream.add_bit(false));
        stream.add_bit(true);
        assert_eq!(stream.data(), Ok(vec![255, 1]));
        assert_eq!(stream.byte_at(1), Some(1));
        assert_eq!(stream.byte_at(2), None);
    }

    #[test]
    fn partial_byte_is_rejected() {
        let mut stream = BitStream::new(8);
        stream.add_byte(0x42);
        stream.add_bit(true);
        assert_eq!(stream.data(), Err(StegoError::IncompleteData { bits: 9 }));
        assert_eq!(stream.byte_at(0), Some(0x42));
        assert_eq!(stream.byte_at(1), None);
    }

    #[test]
    fn empty_stream_yields_empty_data() {
        let stream = BitStream::new(0);
        assert_eq!(stream.density(), ChannelDensity::default());
        assert_eq!(stream.data(), Ok(Vec::new()));
    }

    #[test]
    fn reads_each_channel_from_its_own_bits() {
        // density 7 => r=2 g=1 b=4
        let mut stream = BitStream::new(7);
        stream.read_pixel(&Pixel::new(0b10, 0b1, 0b1010));
        assert_eq!(stream.bits(), &[false, true, true, false, true, false, true]);
    }

    #[test]
    fn full_density_reads_every_bit() {
        let mut stream = BitStream::new(24);
        stream.read_pixel(&Pixel::from_rgb(0x80_01_C3));
        assert_eq!(stream.data(), Ok(vec![0x01, 0x80, 0xC3]));
    }

    #[test]
    fn write_then_read_restores_bytes() {
        let payload = b"weighted";
        for density in 1..=24 {
            let mut source = BitStream::new(density);
            source.add_bytes(payload);

            let needed = (payload.len() * 8).div_ceil(density as usize);
            let mut pixels = vec![Pixel::from_rgb(0x80_7F_33); needed];
            assert_eq!(source.write_pixels(&mut pixels), payload.len() * 8);

            let mut sink = BitStream::new(density);
            sink.read_pixels(&pixels);
            let bytes: Vec<u8> = (0..payload.len()).filter_map(|i| sink.byte_at(i)).collect();
            assert_eq!(bytes, payload, "density {density}");
        }
    }

    #[test]
    fn write_stops_when_pixels_run_out() {
        let mut stream = BitStream::new(3);
        stream.add_bytes(&[0xFF, 0xFF]);
        let mut pixels = [Pixel::default(); 2];
        assert_eq!(stream.write_pixels(&mut pixels), 6);
        // r=1 g=0 b=2
        assert_eq!(pixels, [Pixel::new(1, 0, 3), Pixel::new(1, 0, 3)]);
    }

    #[test]
    fn zero_density_writes_nothing() {
        let mut stream = BitStream::new(0);
        stream.add_byte(0xAA);
        let mut pixels = [Pixel::from_rgb(0x123456); 4];
        assert_eq!(stream.write_pixels(&mut pixels), 0);
        assert_eq!(pixels, [Pixel::from_rgb(0x123456); 4]);
    }
}

/// 每个颜色通道的位数。
pub const BITS_PER_CHANNEL: u8 = 8;

/// 每个像素最多可写入的比特数 (3 个通道 × 8 位)。
/// 超过该值的密度会被截断到此上限。
pub const MAX_DENSITY: u32 = 24;

/// 命令行未指定 `--density` 时使用的密度。
/// 按权重分配后为 红 1 位、绿 0 位、蓝 2 位。
pub const DEFAULT_DENSITY: u32 = 3;

/// 负载长度头占用的字节数。
/// 长度以大端序 `u32` 写在负载之前。
pub const LENGTH_HEADER_BYTES: usize = 4;

/// `hide` 未指定输出路径时，结果图像文件名的前缀。
pub const HIDDEN_IMAGE_PREFIX: &str = "doctored_";

/// `recover` 未指定输出路径时，恢复文本文件名的前缀。
pub const RECOVERED_TEXT_PREFIX: &str = "recovered_";

pub struct Flag;
#[allow(dead_code)]
impl Flag {
    // MEMORY_ACCESS_CTRL bits
    pub const MADCTL_MY: u8 = 0x80;
    pub const MADCTL_MX: u8 = 0x40;
    pub const MADCTL_MV: u8 = 0x20;
    pub const MADCTL_ML: u8 = 0x10;
    pub const MADCTL_BGR: u8 = 0x08;
    pub const MADCTL_MH: u8 = 0x04;
    pub const PIXEL_FORMAT_16BIT: u8 = 0x55;
    pub const PIXEL_FORMAT_18BIT: u8 = 0x66;
    pub const GAMMA_CURVE_1: u8 = 0x01;
    // low voltage detection off, normal gate output
    pub const ENTRY_MODE_NORMAL: u8 = 0x07;
}

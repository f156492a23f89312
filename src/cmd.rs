pub struct Cmd;
#[allow(dead_code)]
impl Cmd {
    pub const NOP: u8 = 0x00;
    pub const SW_RESET: u8 = 0x01;
    pub const READ_DISPLAY_ID: u8 = 0x04;
    pub const READ_DISPLAY_STATUS: u8 = 0x09;
    pub const READ_POWER_MODE: u8 = 0x0A;
    pub const READ_MADCTL: u8 = 0x0B;
    pub const READ_PIXEL_FORMAT: u8 = 0x0C;
    pub const READ_IMAGE_FORMAT: u8 = 0x0D;
    pub const READ_SIGNAL_MODE: u8 = 0x0E;
    pub const READ_SELF_DIAGNOSTIC: u8 = 0x0F;
    pub const SLEEP_IN: u8 = 0x10;
    pub const SLEEP_OUT: u8 = 0x11;
    pub const PARTIAL_MODE_ON: u8 = 0x12;
    pub const NORMAL_MODE_ON: u8 = 0x13;
    pub const INVERSION_OFF: u8 = 0x20;
    pub const INVERSION_ON: u8 = 0x21;
    pub const GAMMA_SET: u8 = 0x26;
    pub const DISPLAY_OFF: u8 = 0x28;
    pub const DISPLAY_ON: u8 = 0x29;
    pub const COLUMN_ADDRESS_SET: u8 = 0x2A;
    pub const PAGE_ADDRESS_SET: u8 = 0x2B;
    pub const MEMORY_WRITE: u8 = 0x2C;
    pub const COLOR_SET: u8 = 0x2D;
    pub const MEMORY_READ: u8 = 0x2E;
    pub const PARTIAL_AREA: u8 = 0x30;
    pub const MEMORY_ACCESS_CTRL: u8 = 0x36;
    pub const PIXEL_FORMAT_SET: u8 = 0x3A;
    pub const RGB_INTERFACE_CTRL: u8 = 0xB0;
    pub const FRAME_RATE_CTRL_NORMAL: u8 = 0xB1;
    pub const FRAME_RATE_CTRL_IDLE: u8 = 0xB2;
    pub const FRAME_RATE_CTRL_PARTIAL: u8 = 0xB3;
    pub const INVERSION_CTRL: u8 = 0xB4;
    pub const BLANKING_PORCH_CTRL: u8 = 0xB5;
    pub const DISPLAY_FUNCTION_CTRL: u8 = 0xB6;
    pub const ENTRY_MODE_SET: u8 = 0xB7;
    pub const POWER_CTRL1: u8 = 0xC0;
    pub const POWER_CTRL2: u8 = 0xC1;
    pub const POWER_CTRL3: u8 = 0xC2;
    pub const POWER_CTRL4: u8 = 0xC3;
    pub const POWER_CTRL5: u8 = 0xC4;
    pub const VCOM_CTRL1: u8 = 0xC5;
    pub const VCOM_CTRL2: u8 = 0xC7;
    pub const READ_ID1: u8 = 0xDA;
    pub const READ_ID2: u8 = 0xDB;
    pub const READ_ID3: u8 = 0xDC;
    pub const READ_ID4: u8 = 0xDD;
    pub const POSITIVE_GAMMA_CORRECTION: u8 = 0xE0;
    pub const NEGATIVE_GAMMA_CORRECTION: u8 = 0xE1;
    pub const INTERFACE_CTRL: u8 = 0xF6;
    pub const POWER_CTRL6: u8 = 0xFC;
}

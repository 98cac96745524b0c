//! MAX14830 register map
//!
//! Per-channel registers are addressed with the 5-bit register field of the
//! command frame together with the 2-bit channel field.

/// Register addresses
pub mod reg {
    /// Receive holding register (read)
    pub const RHR: u8 = 0x00;
    /// Transmit holding register (write)
    pub const THR: u8 = 0x00;
    /// Interrupt enable
    pub const IRQEN: u8 = 0x01;
    /// Interrupt status (clears on read)
    pub const ISR: u8 = 0x02;
    /// Line status interrupt enable
    pub const LSRINTEN: u8 = 0x03;
    /// Line status (clears on read)
    pub const LSR: u8 = 0x04;
    /// Special character interrupt enable
    pub const SPCLCHRINTEN: u8 = 0x05;
    /// Special character interrupt status
    pub const SPCLCHARINT: u8 = 0x06;
    /// Status interrupt enable
    pub const STSINTEN: u8 = 0x07;
    /// Status interrupt
    pub const STSINT: u8 = 0x08;
    /// Mode 1
    pub const MODE1: u8 = 0x09;
    /// Mode 2
    pub const MODE2: u8 = 0x0A;
    /// Line control
    pub const LCR: u8 = 0x0B;
    /// Receive timeout
    pub const RXTIMEOUT: u8 = 0x0C;
    /// Half-duplex delay
    pub const HDPLXDELAY: u8 = 0x0D;
    /// IrDA
    pub const IRDA: u8 = 0x0E;
    /// Flow control levels
    pub const FLOWLVL: u8 = 0x0F;
    /// FIFO interrupt trigger levels
    pub const FIFOTRGLVL: u8 = 0x10;
    /// Transmit FIFO level
    pub const TXFIFOLVL: u8 = 0x11;
    /// Receive FIFO level
    pub const RXFIFOLVL: u8 = 0x12;
    /// Flow control
    pub const FLOWCTRL: u8 = 0x13;
    /// XON1 character
    pub const XON1: u8 = 0x14;
    /// XON2 character
    pub const XON2: u8 = 0x15;
    /// XOFF1 character
    pub const XOFF1: u8 = 0x16;
    /// XOFF2 character
    pub const XOFF2: u8 = 0x17;
    /// GPIO configuration
    pub const GPIOCONFIG: u8 = 0x18;
    /// GPIO data
    pub const GPIODATA: u8 = 0x19;
    /// PLL configuration
    pub const PLLCONFIG: u8 = 0x1A;
    /// Baud rate generator configuration (fractional divisor)
    pub const BRGCONFIG: u8 = 0x1B;
    /// Baud rate divisor, low byte
    pub const DIVLSB: u8 = 0x1C;
    /// Baud rate divisor, high byte
    pub const DIVMSB: u8 = 0x1D;
    /// Clock source
    pub const CLKSOURCE: u8 = 0x1E;
    /// Global IRQ (read) / global command (write)
    pub const GLOBALIRQ: u8 = 0x1F;
}

/// MODE2 bits
pub mod mode2 {
    pub const ECHO_SUPPRESS: u8 = 1 << 7;
    pub const MULTIDROP: u8 = 1 << 6;
    pub const LOOPBACK: u8 = 1 << 5;
    pub const SPECIAL_CHR: u8 = 1 << 4;
    pub const RX_EMPTY_INV: u8 = 1 << 3;
    pub const RX_TRIG_INV: u8 = 1 << 2;
    pub const FIFO_RST: u8 = 1 << 1;
    pub const RST: u8 = 1 << 0;
}

/// LCR bits
pub mod lcr {
    pub const RTS: u8 = 1 << 7;
    pub const TX_BREAK: u8 = 1 << 6;
    pub const FORCE_PARITY: u8 = 1 << 5;
    pub const EVEN_PARITY: u8 = 1 << 4;
    pub const PARITY_EN: u8 = 1 << 3;
    pub const STOP_BITS: u8 = 1 << 2;
    /// Word length field (bits 1:0)
    pub const LENGTH_MASK: u8 = 0x03;
}

/// LSR bits
pub mod lsr {
    pub const CTS: u8 = 1 << 7;
    pub const RX_NOISE: u8 = 1 << 5;
    pub const RX_BREAK: u8 = 1 << 4;
    pub const FRAME_ERR: u8 = 1 << 3;
    pub const RX_PARITY_ERR: u8 = 1 << 2;
    pub const RX_OVERRUN: u8 = 1 << 1;
    pub const RX_TIMEOUT: u8 = 1 << 0;
}

/// CLKSOURCE bits
pub mod clksource {
    pub const CLK_TO_RTS: u8 = 1 << 7;
    pub const PLL_BYPASS: u8 = 1 << 3;
    pub const PLL_EN: u8 = 1 << 2;
    pub const CRYSTAL_EN: u8 = 1 << 1;
}

/// STSINT bits
pub mod stsint {
    pub const CLK_READY: u8 = 1 << 5;
}

/// PLL configuration for the 4 MHz crystal
pub const PLL_CONFIG_4MHZ: u8 = 0x48;

/// Crystal frequency the divisor table is computed for
pub const CRYSTAL_HZ: u32 = 4_000_000;

/// Depth of each transmit and receive FIFO
pub const FIFO_DEPTH: u8 = 128;

/// Highest register reachable through the 5-bit address field
pub const MAX_REGISTER: u8 = 0x1F;

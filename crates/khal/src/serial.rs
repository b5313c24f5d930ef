//! COM1 UART (16550) transmitter.
//!
//! Transmit-only polled driver. This is the sink for kernel log output;
//! nothing here ever enables UART interrupts.

use core::fmt;
use spin::Mutex;
use x86_64::instructions::port::Port;

/// COM1 base I/O address.
const COM1: u16 = 0x3F8;

/// Register offsets from the base address.
const DATA: u16 = 0;
const INTERRUPT_ENABLE: u16 = 1;
const FIFO_CONTROL: u16 = 2;
const LINE_CONTROL: u16 = 3;
const MODEM_CONTROL: u16 = 4;
const LINE_STATUS: u16 = 5;

/// Line status bit: transmit holding register empty.
const LSR_THR_EMPTY: u8 = 1 << 5;

/// Polled UART transmitter.
pub struct Uart {
    base: u16,
    ready: bool,
}

impl Uart {
    const fn new(base: u16) -> Self {
        Self { base, ready: false }
    }

    #[inline]
    fn reg(&self, offset: u16) -> Port<u8> {
        Port::new(self.base + offset)
    }

    /// Configure 115200 baud, 8 data bits, no parity, one stop bit.
    fn init(&mut self) {
        unsafe {
            // Interrupts off; we poll the line status register instead.
            self.reg(INTERRUPT_ENABLE).write(0x00);

            // DLAB on, divisor 1 (115200 baud), DLAB back off with 8N1.
            self.reg(LINE_CONTROL).write(0x80);
            self.reg(DATA).write(0x01);
            self.reg(INTERRUPT_ENABLE).write(0x00);
            self.reg(LINE_CONTROL).write(0x03);

            // Enable and clear the FIFOs, 14-byte receive threshold.
            self.reg(FIFO_CONTROL).write(0xC7);

            // DTR + RTS asserted, OUT2 clear (no IRQ line to the PIC).
            self.reg(MODEM_CONTROL).write(0x03);
        }
        self.ready = true;
    }

    fn write_byte(&mut self, byte: u8) {
        if !self.ready {
            return;
        }
        unsafe {
            while self.reg(LINE_STATUS).read() & LSR_THR_EMPTY == 0 {
                core::hint::spin_loop();
            }
            self.reg(DATA).write(byte);
        }
    }
}

impl fmt::Write for Uart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        Ok(())
    }
}

/// Global COM1 instance.
static COM1_UART: Mutex<Uart> = Mutex::new(Uart::new(COM1));

/// Initialize the global COM1 transmitter.
pub fn init() {
    COM1_UART.lock().init();
}

/// Write a string to COM1.
pub fn write_str(s: &str) {
    use fmt::Write;
    let _ = COM1_UART.lock().write_str(s);
}

/// Write formatted arguments to COM1.
pub fn write_fmt(args: fmt::Arguments) {
    use fmt::Write;
    let _ = COM1_UART.lock().write_fmt(args);
}

/// Serial port driver (COM1, 0x3F8): bidirectional.
///
/// Output: shell console and log records via serial_println!
/// Input: shell keyboard via read_byte / try_read_byte
use bitflags::bitflags;
use core::fmt;
use spin::Mutex;

use crate::sys::{Console, Keyboard};

const COM1: u16 = 0x3F8;

pub static SERIAL: Mutex<Serial> = Mutex::new(Serial::new(COM1));

bitflags! {
    /// Line status register (base + 5).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct LineStatus: u8 {
        const DATA_READY = 0x01;
        const THR_EMPTY = 0x20;
    }
}

pub struct Serial {
    port: u16,
}

impl Serial {
    pub const fn new(port: u16) -> Self {
        Self { port }
    }

    /// Initialize the serial port (8N1, 115200 baud).
    pub fn init(&self) {
        super::outb(self.port + 1, 0x00); // Disable interrupts
        super::outb(self.port + 3, 0x80); // Enable DLAB (set baud rate divisor)
        super::outb(self.port, 0x01); // 115200 baud (divisor 1, low byte)
        super::outb(self.port + 1, 0x00); // (divisor 1, high byte)
        super::outb(self.port + 3, 0x03); // 8 bits, no parity, one stop bit
        super::outb(self.port + 2, 0xC7); // Enable FIFO, clear, 14-byte threshold
        super::outb(self.port + 4, 0x0B); // IRQs enabled, RTS/DSR set
    }

    fn status(&self) -> LineStatus {
        LineStatus::from_bits_truncate(super::inb(self.port + 5))
    }

    // ---- Output ----

    /// Write a single byte, waiting for the transmit buffer.
    pub fn write_byte(&self, byte: u8) {
        while !self.status().contains(LineStatus::THR_EMPTY) {
            core::hint::spin_loop();
        }
        super::outb(self.port, byte);
    }

    /// Write a string, expanding LF to CR LF.
    pub fn write_str_raw(&self, s: &str) {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
    }

    // ---- Input ----

    /// Check if a byte is available to read.
    pub fn has_data(&self) -> bool {
        self.status().contains(LineStatus::DATA_READY)
    }

    /// Read a byte, blocking until one is available.
    pub fn read_byte(&self) -> u8 {
        while !self.has_data() {
            core::hint::spin_loop();
        }
        super::inb(self.port)
    }

    /// Try to read a byte without blocking. Returns None if no data available.
    pub fn try_read_byte(&self) -> Option<u8> {
        if self.has_data() {
            Some(super::inb(self.port))
        } else {
            None
        }
    }
}

impl fmt::Write for Serial {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_str_raw(s);
        Ok(())
    }
}

/// Handle to COM1 for the shell. Locks `SERIAL` per operation, so the
/// keyboard and console halves can be held at the same time.
pub struct SerialPort;

impl Keyboard for SerialPort {
    fn read_byte(&mut self) -> Option<u8> {
        // Poll without holding the lock, so log output can interleave.
        loop {
            if let Some(byte) = SERIAL.lock().try_read_byte() {
                return Some(byte);
            }
            core::hint::spin_loop();
        }
    }

    fn try_read_byte(&mut self) -> Option<u8> {
        SERIAL.lock().try_read_byte()
    }
}

impl fmt::Write for SerialPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        SERIAL.lock().write_str_raw(s);
        Ok(())
    }
}

impl Console for SerialPort {
    fn put_byte(&mut self, byte: u8) {
        SERIAL.lock().write_byte(byte);
    }
}

/// Print to serial console.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        {
            use core::fmt::Write;
            let mut serial = $crate::arch::x86_64::serial::SERIAL.lock();
            let _ = write!(serial, $($arg)*);
        }
    };
}

/// Print to serial console with a newline.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => {
        $crate::serial_print!("{}\n", format_args!($($arg)*))
    };
}

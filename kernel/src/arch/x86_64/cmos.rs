/// CMOS real-time clock (ports 0x70/0x71).
///
/// Reads are repeated until two consecutive snapshots agree, so a read that
/// straddles the once-per-second register update is thrown away.
use super::{inb, outb};
use crate::rtc::{self, RawTime, StatusA, StatusB};
use crate::sys::{Clock, RtcTime};

const CMOS_ADDR: u16 = 0x70;
const CMOS_DATA: u16 = 0x71;

/// Keeps NMIs masked while a register is selected.
const NMI_DISABLE: u8 = 0x80;

const REG_SECONDS: u8 = 0x00;
const REG_MINUTES: u8 = 0x02;
const REG_HOURS: u8 = 0x04;
const REG_DAY: u8 = 0x07;
const REG_MONTH: u8 = 0x08;
const REG_YEAR: u8 = 0x09;
const REG_STATUS_A: u8 = 0x0A;
const REG_STATUS_B: u8 = 0x0B;

/// Conventional century register location when ACPI does not say otherwise.
pub const DEFAULT_CENTURY_REG: u8 = 0x32;

/// Give up on a stable snapshot after this many attempts.
const MAX_READS: usize = 16;

pub struct CmosRtc {
    century_reg: Option<u8>,
}

impl CmosRtc {
    pub const fn with_century(reg: u8) -> Self {
        Self { century_reg: Some(reg) }
    }

    fn read_register(reg: u8) -> u8 {
        outb(CMOS_ADDR, NMI_DISABLE | reg);
        inb(CMOS_DATA)
    }

    fn update_in_progress() -> bool {
        StatusA::from_bits_truncate(Self::read_register(REG_STATUS_A))
            .contains(StatusA::UPDATE_IN_PROGRESS)
    }

    fn snapshot(&self) -> RawTime {
        while Self::update_in_progress() {
            core::hint::spin_loop();
        }
        RawTime {
            second: Self::read_register(REG_SECONDS),
            minute: Self::read_register(REG_MINUTES),
            hour: Self::read_register(REG_HOURS),
            day: Self::read_register(REG_DAY),
            month: Self::read_register(REG_MONTH),
            year: Self::read_register(REG_YEAR),
            century: self.century_reg.map(Self::read_register),
        }
    }

    pub fn read(&self) -> RtcTime {
        let mut last = self.snapshot();
        for _ in 0..MAX_READS {
            let next = self.snapshot();
            if next == last {
                break;
            }
            last = next;
        }
        let mode = StatusB::from_bits_truncate(Self::read_register(REG_STATUS_B));
        rtc::decode(last, mode)
    }
}

impl Clock for CmosRtc {
    fn now(&mut self) -> RtcTime {
        self.read()
    }
}

/// MC146818-style real-time clock register decoding.
///
/// The CMOS clock reports each field as BCD or binary and the hour in 12-
/// or 24-hour form, depending on status register B. The port I/O lives in
/// the arch layer; this module only turns raw register values into an
/// [`RtcTime`].
use bitflags::bitflags;

use crate::sys::RtcTime;

bitflags! {
    /// Status register A.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusA: u8 {
        /// Registers are being updated; reads may be torn.
        const UPDATE_IN_PROGRESS = 0x80;
    }
}

bitflags! {
    /// Status register B.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusB: u8 {
        const HOUR_24 = 0x02;
        const BINARY = 0x04;
    }
}

/// PM flag in the hour register when the clock runs in 12-hour mode.
const HOUR_PM: u8 = 0x80;

/// Register values as read from the chip, before any decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawTime {
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    pub year: u8,
    /// Century register, if the platform has one.
    pub century: Option<u8>,
}

fn from_bcd(v: u8) -> u8 {
    (v >> 4) * 10 + (v & 0x0F)
}

/// Decode raw registers according to `mode`.
pub fn decode(raw: RawTime, mode: StatusB) -> RtcTime {
    let binary = mode.contains(StatusB::BINARY);
    let field = |v: u8| if binary { v } else { from_bcd(v) };

    let pm = raw.hour & HOUR_PM != 0;
    let mut hour = field(raw.hour & !HOUR_PM);
    if !mode.contains(StatusB::HOUR_24) {
        // 12 AM is midnight, 12 PM is noon.
        hour %= 12;
        if pm {
            hour += 12;
        }
    }

    let century = raw.century.map_or(20, field);

    RtcTime {
        year: u16::from(century) * 100 + u16::from(field(raw.year)),
        month: field(raw.month),
        day: field(raw.day),
        hour,
        minute: field(raw.minute),
        second: field(raw.second),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(hour: u8) -> RawTime {
        RawTime {
            second: 0x45,
            minute: 0x30,
            hour,
            day: 0x09,
            month: 0x12,
            year: 0x24,
            century: None,
        }
    }

    #[test]
    fn bcd_24_hour() {
        let t = decode(raw(0x17), StatusB::HOUR_24);
        assert_eq!(
            t,
            RtcTime { year: 2024, month: 12, day: 9, hour: 17, minute: 30, second: 45 }
        );
    }

    #[test]
    fn bcd_12_hour_pm_and_midnight() {
        assert_eq!(decode(raw(0x80 | 0x05), StatusB::empty()).hour, 17);
        assert_eq!(decode(raw(0x80 | 0x12), StatusB::empty()).hour, 12);
        assert_eq!(decode(raw(0x12), StatusB::empty()).hour, 0);
    }

    #[test]
    fn binary_mode() {
        let r = RawTime {
            second: 59,
            minute: 1,
            hour: 23,
            day: 31,
            month: 1,
            year: 99,
            century: Some(19),
        };
        let t = decode(r, StatusB::BINARY | StatusB::HOUR_24);
        assert_eq!(t.year, 1999);
        assert_eq!((t.hour, t.minute, t.second), (23, 1, 59));
    }

    #[test]
    fn bcd_century_register() {
        let mut r = raw(0x08);
        r.century = Some(0x21);
        assert_eq!(decode(r, StatusB::HOUR_24).year, 2124);
    }

    #[test]
    fn display_is_zero_padded() {
        let t = decode(raw(0x07), StatusB::HOUR_24);
        assert_eq!(alloc::format!("{t}"), "2024-12-09 07:30:45");
    }
}

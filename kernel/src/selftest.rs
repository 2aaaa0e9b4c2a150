/// Heap allocator self-test, run from the shell with `test kmalloc`.
///
/// Allocates blocks across the slab size classes (8..4096 bytes) plus one
/// page-backed allocation, several rounds at a time so that every block is
/// live at once. Each block gets a pattern derived from its size and round;
/// all patterns are checked before anything is freed, so two allocations
/// handed the same memory show up as corruption.
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::mem::align_of;

/// Sizes exercised on every round. The last one bypasses the slabs.
const SIZES: [usize; 11] = [8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 3 * 4096 + 5];

const ROUNDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelfTestError {
    #[error("block of {size} bytes corrupted at offset {offset}")]
    Corrupted { size: usize, offset: usize },
    #[error("block of {size} bytes not aligned to {align}")]
    Misaligned { size: usize, align: usize },
}

/// What a passing run covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmallocReport {
    pub allocations: usize,
    pub bytes: usize,
}

/// Cache-line sized, cache-line aligned block.
#[repr(align(64))]
struct Line([u8; 64]);

fn pattern(size: usize, round: usize, i: usize) -> u8 {
    (i ^ size ^ round.wrapping_mul(31)) as u8
}

fn check_aligned(ptr: usize, size: usize, align: usize) -> Result<(), SelfTestError> {
    if ptr % align == 0 {
        Ok(())
    } else {
        Err(SelfTestError::Misaligned { size, align })
    }
}

pub fn kmalloc() -> Result<KmallocReport, SelfTestError> {
    let mut blocks: Vec<(usize, Vec<u8>)> = Vec::with_capacity(ROUNDS * SIZES.len());
    let mut report = KmallocReport {
        allocations: 0,
        bytes: 0,
    };

    for round in 0..ROUNDS {
        for &size in &SIZES {
            let block: Vec<u8> = (0..size).map(|i| pattern(size, round, i)).collect();
            blocks.push((round, block));
            report.allocations += 1;
            report.bytes += size;
        }
    }

    for (round, block) in &blocks {
        let size = block.len();
        if let Some(offset) = (0..size).find(|&i| block[i] != pattern(size, *round, i)) {
            return Err(SelfTestError::Corrupted { size, offset });
        }
    }

    // Word and cache-line alignment.
    let words: Vec<u64> = Vec::with_capacity(32);
    check_aligned(words.as_ptr() as usize, 32 * 8, align_of::<u64>())?;
    let line = Box::new(Line([0xA5; 64]));
    check_aligned(&*line as *const Line as usize, 64, align_of::<Line>())?;
    if let Some(offset) = line.0.iter().position(|&b| b != 0xA5) {
        return Err(SelfTestError::Corrupted { size: 64, offset });
    }
    report.allocations += 2;
    report.bytes += 32 * 8 + 64;

    // Free newest first, the reverse of allocation order.
    while let Some(block) = blocks.pop() {
        drop(block);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_on_host_allocator() {
        let report = kmalloc().unwrap();
        assert_eq!(report.allocations, ROUNDS * SIZES.len() + 2);
        let per_round: usize = SIZES.iter().sum();
        assert_eq!(report.bytes, ROUNDS * per_round + 32 * 8 + 64);
    }

    #[test]
    fn patterns_differ_between_rounds() {
        assert_ne!(pattern(64, 0, 5), pattern(64, 1, 5));
    }

    #[test]
    fn misalignment_is_reported() {
        assert_eq!(
            check_aligned(0x1004, 16, 8),
            Err(SelfTestError::Misaligned { size: 16, align: 8 })
        );
        assert_eq!(check_aligned(0x1000, 16, 8), Ok(()));
    }
}

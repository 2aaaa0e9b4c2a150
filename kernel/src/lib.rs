#![cfg_attr(not(test), no_std)]

extern crate alloc;

// Hardware-dependent modules, only compiled for the kernel, not host-target tests
#[cfg(all(target_arch = "x86_64", not(test)))]
pub mod arch;
#[cfg(all(target_arch = "x86_64", not(test)))]
pub mod logger;

pub mod fs;
pub mod param;
pub mod rtc;
pub mod selftest;
pub mod shell;
pub mod sys;

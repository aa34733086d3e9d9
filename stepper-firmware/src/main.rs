#![no_std]
#![no_main]

#[cfg(feature = "defmt-logging")]
use defmt_rtt as _;
#[cfg(feature = "defmt-logging")]
use panic_probe as _;
#[cfg(not(feature = "defmt-logging"))]
use panic_halt as _;

pub mod engine;
pub mod firmware_task;
mod log;

#[cfg(feature = "embassy-rt")]
mod embassy_main;
#[cfg(feature = "embassy-rt")]
use embassy_main as _;

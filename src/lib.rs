/// Use mimalloc as the global allocator for all binaries.
/// Loading and merge sort make many small String and Vec allocations.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod common;
pub mod controller;
pub mod engine;
pub mod records;
pub mod report;

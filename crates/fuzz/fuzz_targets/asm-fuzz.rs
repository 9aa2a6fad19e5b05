#![no_main]

use std::hint::black_box;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    black_box(ptxk_asm::tokenize(data));
});

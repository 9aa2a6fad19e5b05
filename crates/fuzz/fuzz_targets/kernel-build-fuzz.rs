#![no_main]

use std::hint::black_box;

use libfuzzer_sys::fuzz_target;
use ptxk_kernel::{Kernel, WriteOptions};

fuzz_target!(|data: &str| {
    let output = ptxk_asm::tokenize(data);

    let Ok(mut kernel) = Kernel::from_statements(&output.statements) else {
        return;
    };

    let before = kernel.registers().len();
    let plain = kernel.display(&WriteOptions::default()).to_string();

    let _ = black_box(kernel.dfg());
    kernel.canonical_block_labels(0);
    let canonical = kernel.display(&WriteOptions::default()).to_string();

    assert_eq!(kernel.registers().len(), before);

    // canonical output has to make it through a second build.
    let reparsed = ptxk_asm::tokenize(&canonical);
    assert!(reparsed.errors.is_empty(), "{plain}\n{canonical}\n{:?}", reparsed.errors);
    assert!(Kernel::from_statements(&reparsed.statements).is_ok(), "{canonical}");
});

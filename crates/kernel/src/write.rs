use std::{fmt, io};

use fnv::{FnvHashMap, FnvHashSet};
use ptxk_core::Opcode;

use crate::Kernel;
use crate::cfg::{BasicBlock, ENTRY_LABEL, EXIT_LABEL};

#[cfg(test)]
mod tests;

pub const CANONICAL_LABEL_PREFIX: &str = "$BB";

#[derive(Debug, Default, Clone)]
pub struct WriteOptions {
    /// Printed as a block comment above `.entry`, usually a toolchain version string.
    pub banner: Option<String>,
}

pub struct KernelDisplay<'a> {
    kernel: &'a Kernel,
    options: &'a WriteOptions,
}

fn needs_label_line(block: &BasicBlock) -> bool {
    !block.is_empty() || !matches!(block.label.as_str(), "" | ENTRY_LABEL | EXIT_LABEL)
}

/// `$__Block_<position>`, suffixed with `_<n>` if a block already carries that label.
fn synthetic_label(labels: &FnvHashSet<&str>, position: usize) -> String {
    let base = format!("$__Block_{position}");
    let mut label = base.clone();

    let mut n = 0;
    while labels.contains(label.as_str()) {
        n += 1;
        label = format!("{base}_{n}");
    }

    label
}

impl fmt::Display for KernelDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kernel = self.kernel;

        if let Some(banner) = &self.options.banner {
            writeln!(f, "/* {banner} */")?;
        }

        write!(f, ".entry {}(", kernel.name)?;
        for (idx, param) in kernel.parameters.iter().enumerate() {
            if idx != 0 {
                f.write_str(", ")?;
            }

            fmt::Display::fmt(param, f)?;
        }
        writeln!(f, ")")?;

        writeln!(f, "{{")?;

        for local in kernel.locals.values() {
            writeln!(f, "    {local}")?;
        }

        for register in kernel.register_declarations() {
            writeln!(f, "    {register}")?;
        }

        let cfg = kernel.cfg();
        let labels: FnvHashSet<&str> = cfg.blocks().map(|it| it.label.as_str()).collect();

        // positions count from 1 and include blocks that don't get a label line.
        for (block, position) in cfg.executable_sequence().into_iter().filter_map(|id| cfg.block(id)).zip(1..) {
            if needs_label_line(block) {
                match block.label.is_empty() {
                    true => write!(f, "    {}:", synthetic_label(&labels, position))?,
                    false => write!(f, "    {}:", block.label)?,
                }

                if !block.comment.is_empty() {
                    write!(f, " /* {} */", block.comment)?;
                }

                writeln!(f)?;
            }

            for instruction in &block.instructions {
                writeln!(f, "        {instruction};")?;
            }
        }

        writeln!(f, "}}")
    }
}

impl Kernel {
    #[must_use]
    pub fn display<'a>(&'a self, options: &'a WriteOptions) -> KernelDisplay<'a> {
        KernelDisplay { kernel: self, options }
    }

    /// Writes the kernel as text.
    ///
    /// # Errors
    /// Only fails if `sink` does.
    pub fn write<W: io::Write>(&self, sink: &mut W, options: &WriteOptions) -> io::Result<()> {
        write!(sink, "{}", self.display(options))
    }

    /// Renames every block except entry and exit to `$BB_<kernel_id>_<block id>`.
    ///
    /// The old label moves into the block's comment and branch targets follow the rename.
    pub fn canonical_block_labels(&mut self, kernel_id: u32) {
        let cfg = &mut self.cfg;
        let (entry, exit) = (cfg.entry(), cfg.exit());
        let mut renamed = FnvHashMap::default();

        for block in cfg.blocks_mut().filter(|it| it.id != entry && it.id != exit) {
            let label = format!("{CANONICAL_LABEL_PREFIX}_{kernel_id}_{:04}", block.id.get());
            let old = std::mem::replace(&mut block.label, label.clone());

            if !old.is_empty() {
                renamed.insert(old.clone(), label);
            }

            block.comment = old;
        }

        let branches = cfg
            .blocks_mut()
            .flat_map(|block| &mut block.instructions)
            .filter(|it| it.opcode == Opcode::Bra);

        for bra in branches {
            if let Some(label) = renamed.get(&bra.d.identifier) {
                bra.d.identifier.clone_from(label);
            }
        }

        tracing::debug!(kernel = %self.name, kernel_id, renamed = renamed.len(), "canonicalized block labels");
    }
}

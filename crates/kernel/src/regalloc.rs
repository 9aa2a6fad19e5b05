use fnv::FnvHashMap;
use ptxk_core::{Operand, RegisterId, Slot};

use crate::cfg::ControlFlowGraph;

#[cfg(test)]
mod tests;

/// Symbolic register name to dense id, in first-seen order.
///
/// Append only, a name keeps its id for the lifetime of the map.
#[derive(Debug, Default, Clone)]
pub struct RegisterMap {
    ids: FnvHashMap<String, RegisterId>,
    names: Vec<String>,
}

impl RegisterMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<RegisterId> {
        self.ids.get(name).copied()
    }

    #[must_use]
    pub fn name(&self, id: RegisterId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// `(name, id)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, RegisterId)> {
        self.names.iter().zip(0..).map(|(name, id)| (name.as_str(), id))
    }

    fn allocate(&mut self, op: &mut Operand) {
        if op.identifier.is_empty() {
            return;
        }

        let name = std::mem::take(&mut op.identifier);
        op.reg = match self.ids.get(&name) {
            Some(&id) => id,
            None => {
                assert!(self.names.len() < RegisterId::MAX as usize);
                let id = self.names.len() as RegisterId;

                tracing::trace!(name = %name, id, "assigned register");

                self.names.push(name.clone());
                self.ids.insert(name, id);
                id
            }
        };
    }

    fn assign_operand(&mut self, op: &mut Operand) {
        // an unconditional guard doesn't name anything.
        if !op.is_valid() || op.is_always_true() || !op.is_register_like() {
            return;
        }

        for scalar in op.scalars_mut() {
            self.allocate(scalar);
        }
    }

    /// Replaces every symbolic register in `cfg` with its numeric id.
    ///
    /// Names already in the map keep their id. Operands that were already assigned have an
    /// empty identifier and are left alone, so running this twice is a no-op.
    pub fn assign(&mut self, cfg: &mut ControlFlowGraph) {
        let before = self.len();

        for block in cfg.blocks_mut() {
            for instruction in &mut block.instructions {
                for slot in Slot::ALL {
                    self.assign_operand(instruction.operand_mut(slot));
                }
            }
        }

        tracing::debug!(assigned = self.len() - before, total = self.len(), "assigned registers");
    }
}

/// Numbers every symbolic register in `cfg` from zero, see [`RegisterMap::assign`].
pub fn assign_registers(cfg: &mut ControlFlowGraph) -> RegisterMap {
    let mut map = RegisterMap::new();
    map.assign(cfg);
    map
}

//! The stateful sequencing layer over one method body under
//! construction.
//!
//! One emitter builds exactly one body. Operations append instructions
//! in program order; nothing already issued can be reordered or
//! inspected. Errors that are detectable at issue time (double-marked
//! label, unbalanced region bracketing) surface immediately; everything
//! else is caught by the verifier in [`BodyEmitter::finish`].

use weave_types::MethodSig;

use crate::error::EmitError;
use crate::inst::{Body, Inst, LabelId, LocalId, Region, WrapperField};
use crate::verify;
use crate::EmitResult;

/// An open protected region on the bracketing stack.
struct OpenRegion {
    try_start: usize,
    handler: Option<usize>,
}

/// Builds one method body instruction by instruction.
pub struct BodyEmitter {
    insts: Vec<Inst>,
    argc: u16,
    next_local: u16,
    /// Label id → marked instruction offset (None until marked).
    labels: Vec<Option<usize>>,
    /// Closed regions, in close order (innermost first).
    regions: Vec<Region>,
    /// Currently open regions, outermost at the bottom.
    open: Vec<OpenRegion>,
}

impl BodyEmitter {
    /// Start a body for a method taking `argc` arguments.
    pub fn new(argc: u16) -> Self {
        Self {
            insts: Vec::new(),
            argc,
            next_local: 0,
            labels: Vec::new(),
            regions: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Offset the next instruction will be emitted at.
    fn here(&self) -> usize {
        self.insts.len()
    }

    fn push(&mut self, inst: Inst) {
        self.insts.push(inst);
    }

    // ── Locals and labels ─────────────────────────────────────────────

    /// Declare a fresh local slot, valid for this body only.
    pub fn declare_local(&mut self) -> LocalId {
        let id = LocalId(self.next_local);
        self.next_local += 1;
        id
    }

    /// Define a label. It may be branched to before it is marked, but
    /// it must be marked exactly once before `finish()`.
    pub fn define_label(&mut self) -> LabelId {
        let id = LabelId(self.labels.len() as u16);
        self.labels.push(None);
        id
    }

    /// Mark a label at the current offset.
    pub fn mark_label(&mut self, label: LabelId) -> EmitResult<()> {
        let slot = self
            .labels
            .get_mut(label.0 as usize)
            .ok_or(EmitError::UnknownLabel(label.0))?;
        if slot.is_some() {
            return Err(EmitError::LabelRedefined(label.0));
        }
        *slot = Some(self.insts.len());
        Ok(())
    }

    // ── Value movement ────────────────────────────────────────────────

    pub fn load_arg(&mut self, index: u16) {
        self.push(Inst::LoadArg(index));
    }

    pub fn load_local(&mut self, local: LocalId) {
        self.push(Inst::LoadLocal(local));
    }

    pub fn store_local(&mut self, local: LocalId) {
        self.push(Inst::StoreLocal(local));
    }

    pub fn load_field(&mut self, field: WrapperField) {
        self.push(Inst::LoadField(field));
    }

    pub fn store_field(&mut self, field: WrapperField) {
        self.push(Inst::StoreField(field));
    }

    // ── Control flow ──────────────────────────────────────────────────

    /// Branch to `target` when the local holds the absent sentinel.
    pub fn branch_if_null(&mut self, local: LocalId, target: LabelId) {
        self.push(Inst::BranchIfNull { local, target });
    }

    pub fn jump(&mut self, target: LabelId) {
        self.push(Inst::Jump(target));
    }

    /// Structured exit from the innermost protected region.
    pub fn leave(&mut self, target: LabelId) {
        self.push(Inst::Leave(target));
    }

    pub fn nop(&mut self) {
        self.push(Inst::Nop);
    }

    /// Terminate the body, returning the top of stack (or unit).
    pub fn ret(&mut self) {
        self.push(Inst::Return);
    }

    // ── Protected regions ─────────────────────────────────────────────

    /// Open a protected region at the current offset.
    pub fn begin_protected(&mut self) {
        self.open.push(OpenRegion {
            try_start: self.here(),
            handler: None,
        });
    }

    /// Close the try range and open the handler of the innermost
    /// region.
    pub fn begin_handler(&mut self) -> EmitResult<()> {
        let here = self.here();
        let region = self.open.last_mut().ok_or(EmitError::NoOpenRegion(here))?;
        if region.handler.is_some() {
            return Err(EmitError::HandlerAlreadyOpen(region.try_start));
        }
        region.handler = Some(here);
        Ok(())
    }

    /// Close the innermost region at the current offset.
    pub fn end_protected(&mut self) -> EmitResult<()> {
        let here = self.here();
        let region = self.open.pop().ok_or(EmitError::NoOpenRegion(here))?;
        let handler = region.handler.ok_or(EmitError::HandlerMissing(region.try_start))?;
        self.regions.push(Region {
            try_start: region.try_start,
            handler,
            end: here,
        });
        Ok(())
    }

    // ── Calls ─────────────────────────────────────────────────────────

    /// Invoke the hook callable held in `local`.
    pub fn call_hook(&mut self, local: LocalId) {
        self.push(Inst::CallHook(local));
    }

    /// Invoke a target method by dispatch-table index, consuming
    /// `argc` arguments and the receiver beneath them.
    pub fn call_virtual(&mut self, method: u16, argc: u8) {
        self.push(Inst::CallVirtual { method, argc });
    }

    /// The forwarding composite: load the target receiver, load every
    /// argument in ascending index order, invoke by dispatch index.
    /// No argument transformation; arity comes from the signature.
    pub fn call_forwarding(&mut self, sig: &MethodSig, method_index: u16) {
        self.load_field(WrapperField::Target);
        for i in 0..sig.arity() {
            self.load_arg(i as u16);
        }
        self.call_virtual(method_index, sig.arity() as u8);
    }

    // ── Finalization ──────────────────────────────────────────────────

    /// Verify and freeze the body.
    ///
    /// Consumes the emitter; a structurally malformed body never
    /// escapes as a [`Body`].
    pub fn finish(self) -> EmitResult<Body> {
        if let Some(region) = self.open.first() {
            return Err(EmitError::RegionNotClosed(region.try_start));
        }

        let mut labels = Vec::with_capacity(self.labels.len());
        for (i, slot) in self.labels.iter().enumerate() {
            match slot {
                Some(offset) => labels.push(*offset),
                None => return Err(EmitError::LabelUnmarked(i as u16)),
            }
        }

        verify::verify(
            &self.insts,
            self.argc,
            self.next_local,
            &labels,
            &self.regions,
        )?;

        Ok(Body::new(
            self.insts,
            self.argc,
            self.next_local,
            labels,
            self.regions,
        ))
    }
}

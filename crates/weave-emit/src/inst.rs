//! The body IR: instructions, labels, locals, protected regions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a local slot within one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(pub u16);

/// Index of a label within one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelId(pub u16);

/// The three slots of the wrapper data holder every synthesized type
/// reads at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapperField {
    Target,
    BeforeHook,
    AfterHook,
}

impl fmt::Display for WrapperField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target => write!(f, "target"),
            Self::BeforeHook => write!(f, "before_hook"),
            Self::AfterHook => write!(f, "after_hook"),
        }
    }
}

/// One body instruction.
///
/// The operand model is a small stack machine: loads push, stores pop,
/// calls pop their inputs and push their result. [`Inst::BranchIfNull`]
/// and [`Inst::CallHook`] read their local slot directly and leave the
/// operand stack alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inst {
    /// No effect. Handler bodies carry one so the region ranges stay
    /// non-empty.
    Nop,
    /// Push a caller argument by index.
    LoadArg(u16),
    /// Push the value held in a local slot.
    LoadLocal(LocalId),
    /// Pop into a local slot.
    StoreLocal(LocalId),
    /// Push a wrapper-instance field.
    LoadField(WrapperField),
    /// Pop into a wrapper-instance field. Constructor bodies only.
    StoreField(WrapperField),
    /// Branch to `target` when the local holds the absent sentinel,
    /// fall through otherwise.
    BranchIfNull { local: LocalId, target: LabelId },
    /// Invoke the hook callable held in the local. A raised hook
    /// failure unwinds to the innermost protected region.
    CallHook(LocalId),
    /// Pop `argc` arguments (pushed in ascending index order) and the
    /// receiver beneath them; invoke the target method by
    /// dispatch-table index; push the result.
    CallVirtual { method: u16, argc: u8 },
    /// Unconditional branch. May not cross a protected-region
    /// boundary; regions are exited via [`Inst::Leave`].
    Jump(LabelId),
    /// Structured exit from the innermost protected region: clears the
    /// operand stack and jumps.
    Leave(LabelId),
    /// Terminate, returning the top of stack (or unit when empty).
    Return,
}

impl Inst {
    /// Whether this instruction ends control flow at its offset.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Self::Return | Self::Jump(_) | Self::Leave(_))
    }
}

/// A protected region: failures raised in `[try_start, handler)` jump
/// to `handler`; the handler runs through `[handler, end)` and falls
/// through into `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub try_start: usize,
    pub handler: usize,
    pub end: usize,
}

impl Region {
    /// Whether `offset` lies in the failure-protected range.
    pub fn protects(&self, offset: usize) -> bool {
        self.try_start <= offset && offset < self.handler
    }

    /// Whether `offset` lies anywhere inside the region.
    pub fn contains(&self, offset: usize) -> bool {
        self.try_start <= offset && offset < self.end
    }
}

/// A finished, verified method body.
///
/// Immutable after [`crate::BodyEmitter::finish`]; the runtime
/// interpreter executes it without further checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    insts: Vec<Inst>,
    argc: u16,
    locals: u16,
    labels: Vec<usize>,
    regions: Vec<Region>,
}

impl Body {
    pub(crate) fn new(
        insts: Vec<Inst>,
        argc: u16,
        locals: u16,
        labels: Vec<usize>,
        regions: Vec<Region>,
    ) -> Self {
        Self {
            insts,
            argc,
            locals,
            labels,
            regions,
        }
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn argc(&self) -> u16 {
        self.argc
    }

    pub fn locals(&self) -> u16 {
        self.locals
    }

    /// Instruction offset a label resolves to, `None` when the body
    /// carries no such label. Verified bodies resolve every label
    /// their branches name; a hand-built one may not.
    pub fn label_offset(&self, label: LabelId) -> Option<usize> {
        self.labels.get(label.0 as usize).copied()
    }

    /// Innermost region whose failure-protected range covers `offset`.
    ///
    /// Nested regions may share a `try_start`, so the tie breaks on the
    /// narrower range.
    pub fn protecting_region(&self, offset: usize) -> Option<&Region> {
        self.regions
            .iter()
            .filter(|r| r.protects(offset))
            .min_by_key(|r| (std::cmp::Reverse(r.try_start), r.end))
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }
}

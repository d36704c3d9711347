//! Emitter and verifier error types.

use thiserror::Error;

/// Errors raised while emitting or verifying a method body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// A label was defined but never marked before `finish()`.
    #[error("label {0} defined but never marked")]
    LabelUnmarked(u16),

    /// A label was marked more than once.
    #[error("label {0} marked twice")]
    LabelRedefined(u16),

    /// A branch references a label this emitter never defined.
    #[error("branch to unknown label {0}")]
    UnknownLabel(u16),

    /// A branch target does not land on an instruction.
    #[error("branch target {target} out of range at offset {offset}")]
    BadBranchTarget { target: usize, offset: usize },

    /// `begin_handler` or `end_protected` with no open region.
    #[error("no open protected region at offset {0}")]
    NoOpenRegion(usize),

    /// `begin_handler` called twice for the same region.
    #[error("handler already open for region started at offset {0}")]
    HandlerAlreadyOpen(usize),

    /// `end_protected` before `begin_handler`.
    #[error("protected region started at offset {0} closed without a handler")]
    HandlerMissing(usize),

    /// A protected region was still open at `finish()`.
    #[error("protected region started at offset {0} never closed")]
    RegionNotClosed(usize),

    /// A region with an empty try range or an empty handler.
    #[error("protected region started at offset {0} has an empty range")]
    MalformedRegion(usize),

    /// The success path falls through into the handler instead of leaving.
    #[error("fall-through into handler at offset {0}; protected regions exit via leave")]
    FallthroughIntoHandler(usize),

    /// `leave` outside any protected region.
    #[error("leave at offset {0} outside any protected region")]
    LeaveOutsideRegion(usize),

    /// A plain jump or branch crosses a protected-region boundary.
    #[error("branch at offset {0} crosses a protected-region boundary")]
    BranchCrossesRegion(usize),

    /// The body is empty or its last instruction is not a terminator.
    #[error("body has no explicit return")]
    MissingReturn,

    /// A local index is out of range.
    #[error("local {index} out of range (declared {declared}) at offset {offset}")]
    LocalOutOfRange {
        index: u16,
        declared: u16,
        offset: usize,
    },

    /// An argument index is out of range.
    #[error("argument {index} out of range (argc {argc}) at offset {offset}")]
    ArgOutOfRange { index: u16, argc: u16, offset: usize },

    /// The operand stack would underflow.
    #[error("operand stack underflow at offset {0}")]
    StackUnderflow(usize),

    /// Operands left on the stack where none may remain.
    #[error("{depth} dangling operand(s) at offset {offset}")]
    DanglingOperands { depth: usize, offset: usize },
}

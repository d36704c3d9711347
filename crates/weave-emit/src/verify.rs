//! Structural body verification.
//!
//! Runs once, at `finish()`. The checks are linear and conservative:
//! branch-target merging is not modeled, which is sufficient because
//! well-formed bodies keep the operand stack empty at every label
//! boundary.

use crate::error::EmitError;
use crate::inst::{Inst, Region};
use crate::EmitResult;

/// Verify a finished instruction sequence against its label and region
/// tables.
pub(crate) fn verify(
    insts: &[Inst],
    argc: u16,
    locals: u16,
    labels: &[usize],
    regions: &[Region],
) -> EmitResult<()> {
    verify_terminated(insts)?;
    verify_regions(insts, regions)?;
    verify_branches(insts, labels, regions)?;
    verify_slots(insts, argc, locals)?;
    verify_stack_depth(insts)?;
    Ok(())
}

/// The body must end in a terminator and contain an explicit return.
fn verify_terminated(insts: &[Inst]) -> EmitResult<()> {
    match insts.last() {
        Some(last) if last.is_terminator() => {}
        _ => return Err(EmitError::MissingReturn),
    }
    if !insts.iter().any(|i| matches!(i, Inst::Return)) {
        return Err(EmitError::MissingReturn);
    }
    Ok(())
}

/// Region ranges must be non-empty, properly nested, and unreachable by
/// fall-through on the success path.
fn verify_regions(insts: &[Inst], regions: &[Region]) -> EmitResult<()> {
    for r in regions {
        if r.try_start >= r.handler || r.handler >= r.end || r.end > insts.len() {
            return Err(EmitError::MalformedRegion(r.try_start));
        }
        // The instruction just before the handler is the last of the
        // try range; control must leave there, never fall through.
        if !insts[r.handler - 1].is_terminator() {
            return Err(EmitError::FallthroughIntoHandler(r.handler));
        }
    }
    for (i, a) in regions.iter().enumerate() {
        for b in &regions[i + 1..] {
            let disjoint = a.end <= b.try_start || b.end <= a.try_start;
            let a_in_b = b.try_start <= a.try_start && a.end <= b.end;
            let b_in_a = a.try_start <= b.try_start && b.end <= a.end;
            if !(disjoint || a_in_b || b_in_a) {
                return Err(EmitError::MalformedRegion(a.try_start));
            }
        }
    }
    Ok(())
}

/// Innermost region containing `offset`, if any. Nested regions may
/// share a `try_start`, so the tie breaks on the narrower range.
fn region_of(regions: &[Region], offset: usize) -> Option<usize> {
    regions
        .iter()
        .enumerate()
        .filter(|(_, r)| r.contains(offset))
        .min_by_key(|(_, r)| (std::cmp::Reverse(r.try_start), r.end))
        .map(|(i, _)| i)
}

/// Branch targets must resolve inside the body, plain branches must not
/// cross a region boundary, and `leave` must exit its region.
fn verify_branches(insts: &[Inst], labels: &[usize], regions: &[Region]) -> EmitResult<()> {
    for (offset, inst) in insts.iter().enumerate() {
        let label = match inst {
            Inst::BranchIfNull { target, .. } | Inst::Jump(target) | Inst::Leave(target) => {
                *target
            }
            _ => continue,
        };
        let target = *labels
            .get(label.0 as usize)
            .ok_or(EmitError::UnknownLabel(label.0))?;
        if target >= insts.len() {
            return Err(EmitError::BadBranchTarget { target, offset });
        }
        match inst {
            Inst::Leave(_) => {
                let region = region_of(regions, offset).ok_or(EmitError::LeaveOutsideRegion(offset))?;
                if regions[region].contains(target) {
                    return Err(EmitError::BranchCrossesRegion(offset));
                }
            }
            _ => {
                if region_of(regions, offset) != region_of(regions, target) {
                    return Err(EmitError::BranchCrossesRegion(offset));
                }
            }
        }
    }
    Ok(())
}

/// Local and argument indices must be in range.
fn verify_slots(insts: &[Inst], argc: u16, locals: u16) -> EmitResult<()> {
    for (offset, inst) in insts.iter().enumerate() {
        let local = match inst {
            Inst::LoadLocal(l) | Inst::StoreLocal(l) | Inst::CallHook(l) => Some(*l),
            Inst::BranchIfNull { local, .. } => Some(*local),
            Inst::LoadArg(index) => {
                if *index >= argc {
                    return Err(EmitError::ArgOutOfRange {
                        index: *index,
                        argc,
                        offset,
                    });
                }
                None
            }
            _ => None,
        };
        if let Some(l) = local {
            if l.0 >= locals {
                return Err(EmitError::LocalOutOfRange {
                    index: l.0,
                    declared: locals,
                    offset,
                });
            }
        }
    }
    Ok(())
}

/// Linear operand-stack consistency: never negative, empty at `leave`,
/// at most the return value pending at `return`.
fn verify_stack_depth(insts: &[Inst]) -> EmitResult<()> {
    let mut depth: usize = 0;
    for (offset, inst) in insts.iter().enumerate() {
        match inst {
            Inst::LoadArg(_) | Inst::LoadLocal(_) | Inst::LoadField(_) => depth += 1,
            Inst::StoreLocal(_) | Inst::StoreField(_) => {
                depth = depth.checked_sub(1).ok_or(EmitError::StackUnderflow(offset))?;
            }
            Inst::CallVirtual { argc, .. } => {
                // argc operands plus the receiver go, the result comes.
                depth = depth
                    .checked_sub(*argc as usize + 1)
                    .ok_or(EmitError::StackUnderflow(offset))?;
                depth += 1;
            }
            Inst::Leave(_) => {
                if depth != 0 {
                    return Err(EmitError::DanglingOperands { depth, offset });
                }
            }
            Inst::Return => {
                if depth > 1 {
                    return Err(EmitError::DanglingOperands { depth, offset });
                }
                depth = 0;
            }
            Inst::Jump(_) => depth = 0,
            Inst::Nop | Inst::BranchIfNull { .. } | Inst::CallHook(_) => {}
        }
    }
    Ok(())
}

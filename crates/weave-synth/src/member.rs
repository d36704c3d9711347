//! Member synthesis: one verified body per interface method, plus the
//! fixed constructor shape.
//!
//! Every method body follows the same program:
//!
//! ```text
//! guarded(before_hook)
//! result = target.method(arg0 .. argN)   // failures propagate
//! guarded(after_hook)
//! return result
//! ```
//!
//! where `guarded(field)` is a protected region that loads the hook
//! field into a local, skips an absent hook, invokes a present one, and
//! absorbs any failure the invocation raises:
//!
//! ```text
//! try   { local = field; if local is null goto skip;
//!         call local; skip: leave proceed }
//! catch { nop }                          // absorbed, never re-raised
//! proceed:
//! ```
//!
//! The forwarding call sits *between* the two regions, so its own
//! failures are never caught here and unwind to the proxy caller
//! unmodified. The forwarded result is parked in a local across the
//! after-hook phase and returned; zero-parameter methods emit the full
//! sequence with no argument loads.

use weave_emit::{Body, BodyEmitter, EmitResult, WrapperField};
use weave_types::MethodSig;

use crate::error::SynthError;
use crate::SynthResult;

/// Synthesize the fixed constructor body: store the single incoming
/// target argument into the wrapper's target slot. No hooks touched.
pub fn synthesize_ctor() -> SynthResult<Body> {
    let mut e = BodyEmitter::new(1);
    e.load_arg(0);
    e.store_field(WrapperField::Target);
    e.ret();
    e.finish().map_err(|err| SynthError::body("<ctor>", err))
}

/// Synthesize the body for one interface method.
///
/// `method_index` is the method's position in the dispatch table; the
/// forwarding call is emitted against it, not the name.
pub fn synthesize_method(sig: &MethodSig, method_index: u16) -> SynthResult<Body> {
    let mut e = BodyEmitter::new(sig.arity() as u16);
    let result = e.declare_local();

    emit_guarded_hook(&mut e, WrapperField::BeforeHook)
        .map_err(|err| SynthError::body(&sig.name, err))?;

    e.call_forwarding(sig, method_index);
    e.store_local(result);

    emit_guarded_hook(&mut e, WrapperField::AfterHook)
        .map_err(|err| SynthError::body(&sig.name, err))?;

    e.load_local(result);
    e.ret();

    e.finish().map_err(|err| SynthError::body(&sig.name, err))
}

/// Emit one null-guarded, failure-absorbing hook phase.
fn emit_guarded_hook(e: &mut BodyEmitter, field: WrapperField) -> EmitResult<()> {
    let hook = e.declare_local();
    let skip = e.define_label();
    let proceed = e.define_label();

    e.begin_protected();
    e.load_field(field);
    e.store_local(hook);
    e.branch_if_null(hook, skip);
    e.call_hook(hook);
    e.mark_label(skip)?;
    e.leave(proceed);
    e.begin_handler()?;
    e.nop();
    e.end_protected()?;
    e.mark_label(proceed)
}

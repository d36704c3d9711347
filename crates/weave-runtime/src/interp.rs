//! The body interpreter.
//!
//! Executes one verified [`Body`] at a time against a wrapper instance
//! and an argument frame. Slots (operand stack entries, locals,
//! arguments) hold either a plain value, a target reference, a hook
//! callable, or the absent sentinel — mirroring the wrapper fields the
//! bodies load.
//!
//! Failure routing:
//! - a hook failure raised under a protected region unwinds to the
//!   region handler: the operand stack is cleared, one diagnostics
//!   line is recorded, and execution continues at the handler (the
//!   absorption policy — the proxy caller never sees it);
//! - a forwarded-call failure is never caught: it leaves the
//!   interpreter immediately as [`CallError::Target`], after phase
//!   skipped;
//! - structural impossibilities (stack underflow, out-of-range slot,
//!   unresolved label, wrong slot kind) are [`CallError::Fault`]s,
//!   never panics. Verified bodies cannot reach them; hand-built ones
//!   (a body deserialized from JSON, say) get the error.
//!
//! `invoke` takes the wrapper by shared reference and no lock is held
//! while a hook or the target runs, so user code may call back into
//! the same proxy.

use std::sync::{Arc, Mutex};

use weave_emit::{Body, Inst, WrapperField};
use weave_types::{Hook, InterfaceDesc, Target, Value};

use crate::error::CallError;
use crate::wrapper::WrapperInstance;
use crate::CallResult;

/// One slot: an operand, local, or argument.
#[derive(Clone)]
enum Slot {
    /// The absent sentinel. Uninitialized locals and empty wrapper
    /// fields read as this.
    Null,
    Value(Value),
    Target(Arc<dyn Target>),
    Hook(Hook),
}

/// Wrapper access for one execution. Constructor bodies store fields;
/// method bodies only read them.
enum WrapperFrame<'a> {
    Build(&'a mut WrapperInstance),
    Call(&'a WrapperInstance),
}

impl WrapperFrame<'_> {
    fn load(&self, field: WrapperField) -> Slot {
        let wrapper: &WrapperInstance = match self {
            Self::Build(w) => w,
            Self::Call(w) => w,
        };
        match field {
            WrapperField::Target => match wrapper.target() {
                Some(t) => Slot::Target(Arc::clone(t)),
                None => Slot::Null,
            },
            WrapperField::BeforeHook => match wrapper.before_hook() {
                Some(h) => Slot::Hook(Arc::clone(h)),
                None => Slot::Null,
            },
            WrapperField::AfterHook => match wrapper.after_hook() {
                Some(h) => Slot::Hook(Arc::clone(h)),
                None => Slot::Null,
            },
        }
    }

    fn store(&mut self, field: WrapperField, slot: Slot) -> CallResult<()> {
        let wrapper = match self {
            Self::Build(w) => w,
            Self::Call(_) => {
                return Err(fault(format!("field store outside construction ({field})")));
            }
        };
        match (field, slot) {
            (WrapperField::Target, Slot::Target(t)) => wrapper.set_target(t),
            (WrapperField::BeforeHook, Slot::Hook(h)) => wrapper.set_before_hook(Some(h)),
            (WrapperField::BeforeHook, Slot::Null) => wrapper.set_before_hook(None),
            (WrapperField::AfterHook, Slot::Hook(h)) => wrapper.set_after_hook(Some(h)),
            (WrapperField::AfterHook, Slot::Null) => wrapper.set_after_hook(None),
            (field, _) => {
                return Err(fault(format!("wrong slot kind for field {field}")));
            }
        }
        Ok(())
    }
}

/// Executes synthesized bodies and captures absorbed-failure
/// diagnostics across calls.
///
/// The diagnostics log sits behind its own lock; nothing else in the
/// interpreter is stateful, so `invoke` takes `&self`.
#[derive(Default)]
pub struct Interpreter {
    /// One line per absorbed hook failure, in call order.
    diagnostics: Mutex<Vec<String>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorbed-failure diagnostics collected so far.
    pub fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.lock().expect("diagnostics lock").clone()
    }

    /// Run a constructor body: binds `target` into the wrapper.
    pub fn construct(
        &self,
        ctor: &Body,
        wrapper: &mut WrapperInstance,
        target: Arc<dyn Target>,
    ) -> CallResult<()> {
        self.exec(
            ctor,
            None,
            WrapperFrame::Build(wrapper),
            vec![Slot::Target(target)],
        )?;
        Ok(())
    }

    /// Run the method body at dispatch index `index`.
    ///
    /// Arity and argument types are checked against the signature
    /// before the body executes; the forwarded return value is checked
    /// against the declared return type after.
    pub fn invoke(
        &self,
        interface: &InterfaceDesc,
        index: usize,
        body: &Body,
        wrapper: &WrapperInstance,
        args: &[Value],
    ) -> CallResult<Value> {
        let sig = interface
            .methods()
            .get(index)
            .ok_or_else(|| CallError::Fault(format!("no method at index {index}")))?;

        if args.len() != sig.arity() {
            return Err(CallError::ArityMismatch {
                method: sig.name.clone(),
                expected: sig.arity(),
                got: args.len(),
            });
        }
        for (i, (arg, expected)) in args.iter().zip(&sig.params).enumerate() {
            if arg.ty() != *expected {
                return Err(CallError::ArgType {
                    method: sig.name.clone(),
                    index: i,
                    expected: *expected,
                    got: arg.ty(),
                });
            }
        }

        let frame = args.iter().cloned().map(Slot::Value).collect();
        let result = self.exec(body, Some(interface), WrapperFrame::Call(wrapper), frame)?;

        let value = match result {
            Slot::Value(v) => v,
            Slot::Null => Value::Unit,
            _ => return Err(CallError::Fault("body returned a non-value slot".into())),
        };
        if value.ty() != sig.ret {
            return Err(CallError::ReturnType {
                method: sig.name.clone(),
                expected: sig.ret,
                got: value.ty(),
            });
        }
        Ok(value)
    }

    /// The execution loop. Returns the top of stack at `Return` (or
    /// the null slot when the stack is empty).
    fn exec(
        &self,
        body: &Body,
        interface: Option<&InterfaceDesc>,
        mut wrapper: WrapperFrame<'_>,
        args: Vec<Slot>,
    ) -> CallResult<Slot> {
        let mut stack: Vec<Slot> = Vec::new();
        let mut locals: Vec<Slot> = vec![Slot::Null; body.locals() as usize];
        let mut pc = 0usize;

        while pc < body.len() {
            match &body.insts()[pc] {
                Inst::Nop => {}

                Inst::LoadArg(i) => {
                    let slot = args
                        .get(*i as usize)
                        .ok_or_else(|| fault(format!("argument {i} out of frame")))?;
                    stack.push(slot.clone());
                }
                Inst::LoadLocal(l) => {
                    stack.push(local(&locals, l.0)?.clone());
                }
                Inst::StoreLocal(l) => {
                    let slot = pop(&mut stack, pc)?;
                    *local_mut(&mut locals, l.0)? = slot;
                }

                Inst::LoadField(field) => {
                    stack.push(wrapper.load(*field));
                }
                Inst::StoreField(field) => {
                    let slot = pop(&mut stack, pc)?;
                    wrapper.store(*field, slot)?;
                }

                Inst::BranchIfNull { local: l, target } => {
                    if matches!(local(&locals, l.0)?, Slot::Null) {
                        pc = resolve(body, *target)?;
                        continue;
                    }
                }

                Inst::CallHook(l) => {
                    let hook = match local(&locals, l.0)? {
                        Slot::Hook(h) => Arc::clone(h),
                        _ => return Err(fault(format!("local {} is not a hook", l.0))),
                    };
                    if let Err(err) = hook() {
                        let region = body.protecting_region(pc).ok_or_else(|| {
                            fault(format!("unprotected hook failure: {err}"))
                        })?;
                        self.diagnostics
                            .lock()
                            .expect("diagnostics lock")
                            .push(format!("absorbed hook failure: {err}"));
                        stack.clear();
                        pc = region.handler;
                        continue;
                    }
                }

                Inst::CallVirtual { method, argc } => {
                    let mut call_args = Vec::with_capacity(*argc as usize);
                    for _ in 0..*argc {
                        match pop(&mut stack, pc)? {
                            Slot::Value(v) => call_args.push(v),
                            _ => return Err(fault("non-value argument operand".into())),
                        }
                    }
                    call_args.reverse();
                    let receiver = match pop(&mut stack, pc)? {
                        Slot::Target(t) => t,
                        _ => return Err(fault("receiver is not a target".into())),
                    };
                    let interface = interface
                        .ok_or_else(|| fault("forwarding call outside a method body".into()))?;
                    let sig = interface
                        .methods()
                        .get(*method as usize)
                        .ok_or_else(|| fault(format!("method index {method} out of table")))?;
                    // The target's own failure propagates unmodified.
                    let result = receiver
                        .invoke(&sig.name, &call_args)
                        .map_err(CallError::Target)?;
                    stack.push(Slot::Value(result));
                }

                Inst::Jump(target) => {
                    pc = resolve(body, *target)?;
                    continue;
                }
                Inst::Leave(target) => {
                    stack.clear();
                    pc = resolve(body, *target)?;
                    continue;
                }
                Inst::Return => {
                    return Ok(stack.pop().unwrap_or(Slot::Null));
                }
            }
            pc += 1;
        }

        // Verified bodies end in a terminator.
        Err(fault("execution fell off the end of the body".into()))
    }
}

fn fault(msg: String) -> CallError {
    CallError::Fault(msg)
}

fn pop(stack: &mut Vec<Slot>, pc: usize) -> CallResult<Slot> {
    stack
        .pop()
        .ok_or_else(|| fault(format!("operand stack underflow at offset {pc}")))
}

fn local(locals: &[Slot], index: u16) -> CallResult<&Slot> {
    locals
        .get(index as usize)
        .ok_or_else(|| fault(format!("local {index} out of frame")))
}

fn local_mut(locals: &mut [Slot], index: u16) -> CallResult<&mut Slot> {
    locals
        .get_mut(index as usize)
        .ok_or_else(|| fault(format!("local {index} out of frame")))
}

fn resolve(body: &Body, label: weave_emit::LabelId) -> CallResult<usize> {
    body.label_offset(label)
        .ok_or_else(|| fault(format!("branch to unresolved label {}", label.0)))
}

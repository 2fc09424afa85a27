//! Panic containment for handler execution.
//!
//! [`catch_fault`] runs a closure behind an unwind boundary and converts a
//! panic into a [`Fault`] carrying the panic message and the backtrace of the
//! panicking thread. The backtrace is recorded by a process-wide panic hook
//! that chains to whatever hook was installed before it.

use std::{
    any::Any,
    backtrace::Backtrace,
    cell::RefCell,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Once,
};

use thiserror::Error;

/// Wrapper that formats a panic payload when logged or displayed.
///
/// The payload is downcast to `String` or `&'static str` if possible and falls
/// back to `Debug` formatting otherwise.
///
/// ```
/// use lambdaframe::panic::format_panic;
/// assert_eq!(format_panic(Box::new("boom")).to_string(), "boom");
/// assert_eq!(
///     format_panic(Box::new(String::from("boom"))).to_string(),
///     "boom"
/// );
/// assert!(format_panic(Box::new(5_u32)).to_string().contains("Any"));
/// ```
#[derive(Debug)]
#[must_use]
pub struct PanicMessage(Box<dyn Any + Send>);

impl fmt::Display for PanicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.0.downcast_ref::<String>() {
            f.write_str(s)
        } else if let Some(s) = self.0.downcast_ref::<&'static str>() {
            f.write_str(s)
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

/// Create a [`PanicMessage`] for the given payload.
pub fn format_panic(panic: Box<dyn Any + Send>) -> PanicMessage { PanicMessage(panic) }

/// A panic caught while translating or handling an invocation.
#[derive(Debug, Error)]
#[error("panic: {message}\n{backtrace}")]
pub struct Fault {
    message: String,
    backtrace: String,
}

impl Fault {
    /// Construct a fault from a message and a rendered backtrace.
    #[must_use]
    pub fn new(message: impl Into<String>, backtrace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            backtrace: backtrace.into(),
        }
    }

    /// The panic payload rendered as text.
    #[must_use]
    pub fn message(&self) -> &str { &self.message }

    /// The backtrace captured at the panic site, or empty if none was recorded.
    #[must_use]
    pub fn backtrace(&self) -> &str { &self.backtrace }
}

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static BACKTRACE_HOOK: Once = Once::new();

fn install_backtrace_hook() {
    BACKTRACE_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(Backtrace::force_capture()));
            previous(info);
        }));
    });
}

/// Run `f`, converting any panic it raises into a [`Fault`].
///
/// # Errors
///
/// Returns a [`Fault`] describing the panic if `f` unwinds.
///
/// ```
/// use lambdaframe::panic::catch_fault;
///
/// assert_eq!(catch_fault(|| 2 + 2).ok(), Some(4));
///
/// let fault = catch_fault(|| -> u8 { panic!("boom") }).unwrap_err();
/// assert_eq!(fault.message(), "boom");
/// ```
pub fn catch_fault<T>(f: impl FnOnce() -> T) -> Result<T, Fault> {
    install_backtrace_hook();
    LAST_BACKTRACE.with(|slot| slot.borrow_mut().take());
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let backtrace = LAST_BACKTRACE
            .with(|slot| slot.borrow_mut().take())
            .map(|trace| trace.to_string())
            .unwrap_or_default();
        Fault::new(format_panic(payload).to_string(), backtrace)
    })
}

//! Non-owning callback references.
//!
//! The dispatcher never owns a subscriber's callback. It stores a [`WeakRef`]
//! and resolves it at publish time; if the owner is gone the subscription is
//! purged instead of invoked.
//!
//! # Kinds
//!
//! | Kind       | Built from                    | Alive while                     |
//! |------------|-------------------------------|---------------------------------|
//! | `Function` | `fn(P)`                       | always                          |
//! | `Closure`  | `&Rc<F>` / `&Callback<P>`     | the subscriber holds the `Rc`   |
//! | `Method`   | `&Rc<T>` + `fn(&T, P)`        | the receiver `T` is alive       |
//!
//! A closure or receiver `Rc` is the control block: the subscriber keeps the
//! only strong reference and dropping it ends the subscription without an
//! explicit unsubscribe.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use pubmarine::WeakRef;
//!
//! struct Display { shown: Cell<u32> }
//!
//! impl Display {
//!     fn show(&self, beat: u32) { self.shown.set(beat); }
//! }
//!
//! let display = Rc::new(Display { shown: Cell::new(0) });
//! let weak = WeakRef::method(&display, Display::show);
//!
//! (weak.resolve().unwrap())(7);
//! assert_eq!(display.shown.get(), 7);
//!
//! drop(display);
//! assert!(weak.resolve().is_none());
//! ```

use std::fmt;
use std::rc::{Rc, Weak};

/// A strong, invocable callback.
pub type Callback<P> = Rc<dyn Fn(P)>;

/// What a [`WeakRef`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeakKind {
    /// A plain function pointer.
    Function,
    /// A reference-counted closure owned by the subscriber.
    Closure,
    /// A method bound to a reference-counted receiver.
    Method,
}

/// Type-erased weak bound method.
trait WeakMethod<P> {
    fn is_alive(&self) -> bool;
    fn resolve(&self) -> Option<Callback<P>>;
}

struct BoundMethod<T, P> {
    receiver: Weak<T>,
    method: fn(&T, P),
}

impl<T: 'static, P: 'static> WeakMethod<P> for BoundMethod<T, P> {
    fn is_alive(&self) -> bool {
        self.receiver.strong_count() > 0
    }

    fn resolve(&self) -> Option<Callback<P>> {
        let receiver = self.receiver.upgrade()?;
        let method = self.method;
        Some(Rc::new(move |payload: P| method(&receiver, payload)))
    }
}

enum Target<P> {
    Function(fn(P)),
    Closure(Weak<dyn Fn(P)>),
    Method(Box<dyn WeakMethod<P>>),
}

/// Weak reference to a subscriber's callback.
pub struct WeakRef<P> {
    target: Target<P>,
}

impl<P: 'static> WeakRef<P> {
    /// Reference a plain function. Functions never expire.
    pub fn function(f: fn(P)) -> Self {
        Self {
            target: Target::Function(f),
        }
    }

    /// Reference a closure owned by the caller.
    pub fn closure<F>(callback: &Rc<F>) -> Self
    where
        F: Fn(P) + 'static,
    {
        let weak: Weak<F> = Rc::downgrade(callback);
        Self {
            target: Target::Closure(weak),
        }
    }

    /// Reference an already type-erased [`Callback`].
    pub fn callback(callback: &Callback<P>) -> Self {
        Self {
            target: Target::Closure(Rc::downgrade(callback)),
        }
    }

    /// Reference `method` bound to `receiver`.
    ///
    /// Only a weak pointer to `receiver` is kept; the reference dies with it.
    pub fn method<T: 'static>(receiver: &Rc<T>, method: fn(&T, P)) -> Self {
        Self {
            target: Target::Method(Box::new(BoundMethod {
                receiver: Rc::downgrade(receiver),
                method,
            })),
        }
    }

    /// The kind of callable behind this reference.
    pub fn kind(&self) -> WeakKind {
        match self.target {
            Target::Function(_) => WeakKind::Function,
            Target::Closure(_) => WeakKind::Closure,
            Target::Method(_) => WeakKind::Method,
        }
    }

    /// True while the referent can still be resolved.
    pub fn is_alive(&self) -> bool {
        match &self.target {
            Target::Function(_) => true,
            Target::Closure(weak) => weak.strong_count() > 0,
            Target::Method(method) => method.is_alive(),
        }
    }

    /// Recover a strong callback, or `None` if the owner is gone.
    ///
    /// The returned callback keeps its closure (or bound receiver) alive
    /// until it is dropped, so a resolved invocation always completes.
    pub fn resolve(&self) -> Option<Callback<P>> {
        match &self.target {
            Target::Function(f) => {
                let f = *f;
                Some(Rc::new(f))
            }
            Target::Closure(weak) => weak.upgrade(),
            Target::Method(method) => method.resolve(),
        }
    }
}

impl<P: 'static> From<fn(P)> for WeakRef<P> {
    fn from(f: fn(P)) -> Self {
        WeakRef::function(f)
    }
}

impl<P: 'static, F: Fn(P) + 'static> From<&Rc<F>> for WeakRef<P> {
    fn from(callback: &Rc<F>) -> Self {
        WeakRef::closure(callback)
    }
}

impl<P: 'static> From<&Callback<P>> for WeakRef<P> {
    fn from(callback: &Callback<P>) -> Self {
        WeakRef::callback(callback)
    }
}

impl<P: 'static> fmt::Debug for WeakRef<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRef")
            .field("kind", &self.kind())
            .field("alive", &self.is_alive())
            .finish()
    }
}

//! Process-wide interned names.
//!
//! Dialect, op, attribute and type names are compared constantly during
//! matching, so they are interned once into a shared [`lasso::Rodeo`].

use std::fmt;
use std::sync::LazyLock;

use lasso::{Rodeo, Spur};
use parking_lot::RwLock;

static NAMES: LazyLock<RwLock<Rodeo>> = LazyLock::new(|| RwLock::new(Rodeo::new()));

/// An interned name. Copy, four bytes, compared by key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Spur);

impl Symbol {
    pub fn new(text: &'static str) -> Self {
        Self::lookup(text).unwrap_or_else(|| Symbol(NAMES.write().get_or_intern_static(text)))
    }

    /// Intern a name that only lives as long as `text`, such as parsed input.
    pub fn from_dynamic(text: &str) -> Self {
        Self::lookup(text).unwrap_or_else(|| Symbol(NAMES.write().get_or_intern(text)))
    }

    fn lookup(text: &str) -> Option<Self> {
        NAMES.read_recursive().get(text).map(Symbol)
    }

    /// Borrow the text for the duration of `f`. Recursive reads keep nested
    /// symbol formatting inside `f` from deadlocking against a queued writer.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(NAMES.read_recursive().resolve(&self.0))
    }
}

/// Declare `pub fn NAME() -> Symbol` accessors for fixed names.
///
/// ```
/// tensor_ir::symbols! {
///     ATTR_SHAPE => "shape",
/// }
///
/// assert_eq!(ATTR_SHAPE(), "shape");
/// ```
#[macro_export]
macro_rules! symbols {
    ($($(#[$doc:meta])* $name:ident => $text:literal),* $(,)?) => {$(
        $(#[$doc])*
        #[allow(non_snake_case)]
        #[inline]
        pub fn $name() -> $crate::Symbol {
            $crate::Symbol::new($text)
        }
    )*};
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|text| text == other)
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl PartialEq<Symbol> for &str {
    fn eq(&self, other: &Symbol) -> bool {
        *other == **self
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|text| f.write_str(text))
    }
}

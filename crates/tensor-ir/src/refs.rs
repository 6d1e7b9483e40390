//! Typed handles into the arenas of an [`IrContext`](crate::IrContext).

use cranelift_entity::entity_impl;

macro_rules! handles {
    ($($(#[$doc:meta])* $name:ident => $prefix:literal;)*) => {$(
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);
        entity_impl!($name, $prefix);
    )*};
}

handles! {
    OpRef => "op";
    /// An op result or a block argument.
    ValueRef => "v";
    BlockRef => "block";
    RegionRef => "region";
    /// A hash-consed type; equal `TypeData` always gives the same handle.
    TypeRef => "ty";
}

/// The producer of an SSA value, with the value's position in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueDef {
    OpResult(OpRef, u32),
    BlockArg(BlockRef, u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use cranelift_entity::EntityRef;

    #[test]
    fn handles_display_with_their_prefix() {
        assert_eq!(OpRef::new(0).to_string(), "op0");
        assert_eq!(ValueRef::new(5).to_string(), "v5");
        assert_eq!(format!("{:?}", BlockRef::new(2)), "block2");
        assert_eq!(TypeRef::new(3).to_string(), "ty3");
    }
}

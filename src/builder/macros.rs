//! Macros for ergonomic state machine construction.

/// Generate a state identifier enum together with its `StateId`
/// implementation. Each variant's name is its display name.
///
/// # Example
///
/// ```
/// use tickwise::core::StateId;
/// use tickwise::state_enum;
///
/// state_enum! {
///     pub enum Locomotion {
///         Idle,
///         Walk,
///         Run,
///     }
/// }
///
/// assert_eq!(Locomotion::Walk.name(), "Walk");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::StateId for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

//! Macros to reduce boilerplate in the codebase

/// Macro to generate `as_str`, `ALL`, Display and FromStr for closed string enums
///
/// Parsing is case-insensitive and ignores surrounding whitespace; display always
/// uses the canonical spelling, which must match the enum's serde names.
///
/// # Usage
///
/// ```rust,ignore
/// use crate::error::BugHiveError;
///
/// enum_display_fromstr!(
///     MyEnum,
///     BugHiveError::InvalidStatus,
///     {
///         Variant1 => "variant1",
///         Variant2 => "variant-2",
///     }
/// );
/// ```
#[macro_export]
macro_rules! enum_display_fromstr {
    (
        $enum_name:ident,
        $make_error:expr,
        { $($variant:ident => $str:expr),+ $(,)? }
    ) => {
        impl $enum_name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$enum_name] = &[$($enum_name::$variant),+];

            /// Canonical wire spelling
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($enum_name::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::BugHiveError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok($enum_name::$variant);
                    }
                )+
                Err(($make_error)(s.to_string()))
            }
        }
    };
}

//! Constructor macro for error variants whose fields are all strings
//!
//! Each domain sub-module lists `fn_name => Variant { fields }` pairs and gets
//! one `pub fn fn_name(field: impl Into<String>, ...) -> ModstrapError` each.
//!
//! ```rust,ignore
//! error_constructors! {
//!     clone_failed => GitCloneFailed { url, reason },
//! }
//! ```

macro_rules! error_constructors {
    ($($fn_name:ident => $variant:ident { $($field:ident),* $(,)? }),* $(,)?) => {
        $(
            #[allow(dead_code)]
            pub fn $fn_name($($field: impl Into<String>),*) -> $crate::error::ModstrapError {
                $crate::error::ModstrapError::$variant {
                    $($field: $field.into()),*
                }
            }
        )*
    };
}

pub(crate) use error_constructors;

//! `define_port_error!`: boundary error enums with one constructor per
//! variant.
//!
//! Every variant carries named fields. The generated constructor is the
//! variant name in snake_case and takes each field as `impl Into<T>`, so
//! adapters can write `CaseRepositoryError::not_found(id.as_ref())`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = "Build [`" $name "::" $variant "`]."]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum SampleError {
            Rejected { status: u16, message: String } => "rejected ({status}): {message}",
            NotFound { id: String } => "{id} not found",
        }
    }

    #[test]
    fn constructors_convert_into_field_types() {
        let err = SampleError::rejected(401_u16, "bad token");
        assert_eq!(err.to_string(), "rejected (401): bad token");
    }

    #[test]
    fn multi_word_variants_get_snake_case_constructors() {
        let borrowed = SampleError::not_found("case-7");
        let owned = SampleError::not_found(String::from("case-7"));
        assert_eq!(borrowed, owned);
        assert_eq!(borrowed.to_string(), "case-7 not found");
    }
}

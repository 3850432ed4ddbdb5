//! Helper macro generating port error enums.
//!
//! Every variant carries an adapter-supplied `message` and displays as
//! `"<prefix>: <message>"`. The macro derives `thiserror::Error`, one
//! snake_case constructor per variant accepting `impl Into<String>`, and the
//! `message`/`kind` accessors used for structured logging.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $prefix:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error("{prefix}: {message}", prefix = $prefix)]
                $variant { message: String },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Construct the `", stringify!($variant), "` variant.")]
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant {
                            message: message.into(),
                        }
                    }
                }
            )*

            /// Adapter-supplied detail without the variant prefix.
            pub fn message(&self) -> &str {
                match self {
                    $( Self::$variant { message } => message, )*
                }
            }

            /// Variant name in snake_case.
            pub fn kind(&self) -> &'static str {
                match self {
                    $( Self::$variant { .. } => ::paste::paste! { stringify!([<$variant:snake>]) }, )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

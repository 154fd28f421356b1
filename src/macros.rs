/// Declares the store's property set from one table.
///
/// Each row `Marker => field: Type` produces a `Property::Marker` variant,
/// an `AppState.field` slot, and a zero-sized `props::Marker` type that
/// implements `StoreProperty<Value = Type>`, so property ids and value
/// types cannot drift apart.
///
/// Usage:
/// `store_properties! {
///     /// docs
///     Watchlist => watchlist: Vec<Stock>,
/// }`
#[macro_export]
macro_rules! store_properties {
    ( $( $(#[$meta:meta])* $marker:ident => $field:ident : $ty:ty ),+ $(,)? ) => {
        /// Closed set of store property identifiers.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            ::strum::Display, ::strum::EnumIter, ::strum::AsRefStr,
        )]
        #[strum(serialize_all = "camelCase")]
        pub enum Property {
            $( $marker ),+
        }

        /// Every store-held value, one slot per [`Property`].
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct AppState {
            $( $(#[$meta])* pub $field: $ty ),+
        }

        /// Typed handles for [`Property`] variants.
        pub mod props {
            use super::*;

            $(
                $(#[$meta])*
                #[derive(Debug, Clone, Copy, Default)]
                pub struct $marker;

                impl StoreProperty for $marker {
                    type Value = $ty;
                    const ID: Property = Property::$marker;

                    fn read(state: &AppState) -> &Self::Value {
                        &state.$field
                    }

                    fn slot(state: &mut AppState) -> &mut Self::Value {
                        &mut state.$field
                    }
                }
            )+
        }
    };
}

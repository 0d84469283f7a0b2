//! Helper macros for generating domain port error enums and record handler
//! ports.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        $crate::domain::ports::define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        $crate::domain::ports::define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                $crate::domain::ports::define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

/// Generate an entity-scoped record handler port.
///
/// Expands to an error enum (via [`define_port_error!`]), an async trait with
/// the five record operations, and the implementation of that trait for
/// [`RecordHandler`](crate::domain::RecordHandler) instantiated at the entity
/// type. Only retrieve reports unexpected store failures, so generic
/// `Unexpected` errors become the entity's `Retrieve` kind.
macro_rules! define_record_handler_port {
    (
        $(#[$trait_meta:meta])*
        pub trait $port:ident for $entity:ident;
        $(#[$error_meta:meta])*
        pub enum $error:ident;
    ) => {
        $crate::domain::ports::define_port_error! {
            $(#[$error_meta])*
            pub enum $error {
                /// The request was rejected before reaching the store.
                RequestInvalid { reasons: $crate::domain::Reasons } =>
                    "request invalid: {reasons}",
                /// No record matched under the caller's claims.
                NotFound => "record not found",
                /// Creating the record failed.
                Create { reasons: $crate::domain::Reasons } => "create failed: {reasons}",
                /// Retrieving the record failed for a reason other than absence.
                Retrieve { reasons: $crate::domain::Reasons } => "retrieve failed: {reasons}",
                /// Replacing the record failed.
                Update { reasons: $crate::domain::Reasons } => "update failed: {reasons}",
                /// Removing the record failed.
                Delete { reasons: $crate::domain::Reasons } => "delete failed: {reasons}",
                /// Reading a page of records failed.
                Collect { reasons: $crate::domain::Reasons } => "collect failed: {reasons}",
            }
        }

        impl From<$crate::domain::RecordHandlerError> for $error {
            fn from(error: $crate::domain::RecordHandlerError) -> Self {
                use $crate::domain::RecordHandlerError as Generic;
                match error {
                    Generic::RequestInvalid { reasons } => Self::RequestInvalid { reasons },
                    Generic::NotFound => Self::NotFound,
                    Generic::Create { reasons } | Generic::UuidGeneration { reasons } => {
                        Self::Create { reasons }
                    }
                    Generic::Unexpected { reasons } => Self::Retrieve { reasons },
                    Generic::Update { reasons } => Self::Update { reasons },
                    Generic::Delete { reasons } => Self::Delete { reasons },
                    Generic::Collect { reasons } => Self::Collect { reasons },
                }
            }
        }

        $(#[$trait_meta])*
        #[cfg_attr(test, mockall::automock)]
        #[async_trait::async_trait]
        pub trait $port: Send + Sync {
            /// Persist a new record under a freshly assigned identity.
            async fn create(&self, entity: $entity) -> Result<$entity, $error>;

            /// Fetch the record the identifier names, as the claims see it.
            async fn retrieve(
                &self,
                request: $crate::domain::RetrieveRequest,
            ) -> Result<$entity, $error>;

            /// Replace the record the identifier names.
            async fn update(
                &self,
                request: $crate::domain::UpdateRequest<$entity>,
            ) -> Result<(), $error>;

            /// Remove the records the identifier names.
            async fn delete(&self, request: $crate::domain::DeleteRequest) -> Result<(), $error>;

            /// Read one page of records matching every criterion.
            async fn collect(
                &self,
                request: $crate::domain::CollectRequest,
            ) -> Result<::pagination::Page<$entity>, $error>;
        }

        #[async_trait::async_trait]
        impl $port for $crate::domain::RecordHandler<$entity> {
            async fn create(&self, entity: $entity) -> Result<$entity, $error> {
                Ok($crate::domain::RecordHandler::create(self, entity).await?)
            }

            async fn retrieve(
                &self,
                request: $crate::domain::RetrieveRequest,
            ) -> Result<$entity, $error> {
                Ok($crate::domain::RecordHandler::retrieve(self, request).await?)
            }

            async fn update(
                &self,
                request: $crate::domain::UpdateRequest<$entity>,
            ) -> Result<(), $error> {
                Ok($crate::domain::RecordHandler::update(self, request).await?)
            }

            async fn delete(&self, request: $crate::domain::DeleteRequest) -> Result<(), $error> {
                Ok($crate::domain::RecordHandler::delete(self, request).await?)
            }

            async fn collect(
                &self,
                request: $crate::domain::CollectRequest,
            ) -> Result<::pagination::Page<$entity>, $error> {
                Ok($crate::domain::RecordHandler::collect(self, request).await?)
            }
        }
    };
}

pub(crate) use define_port_error;
pub(crate) use define_record_handler_port;

/// Read and change-feed methods shared by every store-backed client.
///
/// The client type needs an `inner: ResourceClient<$entity>` field and the
/// error type a `from_store(FrameworkError)` constructor.
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: String) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await.map_err(<$error>::from_store)
                }

                /// Opens a change-feed subscription on the table.
                #[tracing::instrument(skip(self))]
                pub async fn subscribe(&self) -> Result<$crate::actor_framework::Subscription<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.subscribe().await.map_err(<$error>::from_store)
                }

                /// Idempotent; also succeeds once the store has shut down.
                #[tracing::instrument(skip(self))]
                pub async fn unsubscribe(&self, id: $crate::actor_framework::SubscriptionId) -> Result<(), $error> {
                    tracing::debug!("Sending request");
                    self.inner.unsubscribe(id).await.map_err(<$error>::from_store)
                }
            }
        }
    };
}

macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }
    };
}

macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        impl_client_new!($client_name, $entity);
        impl_client_methods!($client_name, $entity, $error, $entity_name_snake);
    };
}

/// Request/response method over a hand-written service's message enum.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| <$error_type>::ActorCommunicationError("Actor closed".to_string()))?;

                response.await.map_err(|_| <$error_type>::ActorCommunicationError("Actor dropped".to_string()))?
            }
        }
    };
}

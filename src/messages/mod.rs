use tokio::sync::oneshot;

use crate::actors::AssetError;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Messages understood by the asset bucket service. Each variant carries its
/// parameters and a oneshot channel for the response.
#[derive(Debug)]
pub enum AssetRequest {
    Upload {
        path_hint: String,
        file_name: String,
        bytes: Vec<u8>,
        respond_to: ServiceResponse<String, AssetError>,
    },
    Fetch {
        path: String,
        respond_to: ServiceResponse<Option<Vec<u8>>, AssetError>,
    },
    Shutdown,
}

use tokio::sync::mpsc;

use crate::actors::AssetError;
use crate::messages::AssetRequest;

/// Client for the asset bucket service.
#[derive(Clone)]
pub struct AssetClient {
    sender: mpsc::Sender<AssetRequest>,
}

impl AssetClient {
    pub fn new(sender: mpsc::Sender<AssetRequest>) -> Self {
        Self { sender }
    }

    /// Asks the service to stop. Pending requests queued before this are still served.
    pub async fn shutdown(&self) -> Result<(), AssetError> {
        self.sender
            .send(AssetRequest::Shutdown)
            .await
            .map_err(|_| AssetError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(AssetClient => fn upload(path_hint: String, file_name: String, bytes: Vec<u8>) -> String as AssetRequest::Upload, Error = AssetError);
client_method!(AssetClient => fn fetch(path: String) -> Option<Vec<u8>> as AssetRequest::Fetch, Error = AssetError);

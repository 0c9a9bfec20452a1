use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::clients::AssetClient;
use crate::clock::{Clock, SystemClock};
use crate::messages::{AssetRequest, ServiceResponse};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("Empty upload: {0}")]
    EmptyUpload(String),
    #[error("Invalid asset path: {0}")]
    InvalidPath(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Where uploaded assets are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBucket {
    pub base_url: String,
    pub bucket: String,
}

impl AssetBucket {
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.bucket,
            path
        )
    }
}

/// In-memory stand-in for the hosted storage bucket holding product images.
pub struct AssetService {
    receiver: mpsc::Receiver<AssetRequest>,
    bucket: AssetBucket,
    objects: HashMap<String, Vec<u8>>,
    clock: Arc<dyn Clock>,
}

impl AssetService {
    pub fn new(buffer_size: usize, bucket: AssetBucket) -> (Self, AssetClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            bucket,
            objects: HashMap::new(),
            clock: Arc::new(SystemClock),
        };
        (service, AssetClient::new(sender))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[instrument(name = "asset_service", skip(self), fields(bucket = %self.bucket.bucket))]
    pub async fn run(mut self) {
        info!("AssetService starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                AssetRequest::Upload {
                    path_hint,
                    file_name,
                    bytes,
                    respond_to,
                } => self.handle_upload(path_hint, file_name, bytes, respond_to),
                AssetRequest::Fetch { path, respond_to } => {
                    let _ = respond_to.send(Ok(self.objects.get(&path).cloned()));
                }
                AssetRequest::Shutdown => {
                    info!("AssetService shutting down");
                    break;
                }
            }
        }
        info!("AssetService stopped");
    }

    #[instrument(skip(self, bytes, respond_to), fields(size = bytes.len()))]
    fn handle_upload(
        &mut self,
        path_hint: String,
        file_name: String,
        bytes: Vec<u8>,
        respond_to: ServiceResponse<String, AssetError>,
    ) {
        if bytes.is_empty() {
            warn!("Rejected empty upload");
            let _ = respond_to.send(Err(AssetError::EmptyUpload(file_name)));
            return;
        }
        let path = match object_path(&path_hint, &file_name, self.clock.now().timestamp_millis()) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Rejected upload path");
                let _ = respond_to.send(Err(e));
                return;
            }
        };
        let url = self.bucket.public_url(&path);
        self.objects.insert(path.clone(), bytes);
        debug!(%path, "Asset stored");
        let _ = respond_to.send(Ok(url));
    }
}

/// `products/product_{hint}_{millis}.{ext}`; files without an extension get `bin`.
pub fn object_path(path_hint: &str, file_name: &str, millis: i64) -> Result<String, AssetError> {
    let hint = path_hint.trim();
    if hint.is_empty() || hint.contains('/') {
        return Err(AssetError::InvalidPath(path_hint.to_string()));
    }
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "bin".to_string());
    Ok(format!("products/product_{hint}_{millis}.{ext}"))
}

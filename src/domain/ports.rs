use crate::domain::model::Record;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Byte-level file access for uploads and exports.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// String key-value persistence, the client's equivalent of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_url(&self) -> &str;
    fn state_dir(&self) -> &str;
    fn output_path(&self) -> &str;
    fn per_row_schema(&self) -> bool;
    fn zip_output(&self) -> bool;
    fn request_timeout_secs(&self) -> u64;
}

/// Completion handler for a validated upload.
///
/// The upload workflow hands over the full validated record set and does not
/// look at what happens afterwards.
#[async_trait]
pub trait BatchSubmitter: Send + Sync {
    type Output: Send;

    async fn submit(&self, records: Vec<Record>) -> Result<Self::Output>;
}

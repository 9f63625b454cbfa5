use async_trait::async_trait;
use domain::{Comment, NewComment};

use crate::columns::ColumnSet;
use crate::error::StoreError;

#[async_trait]
pub trait CommentBackend: Send + Sync {
    async fn select(&self, columns: &ColumnSet) -> Result<Vec<Comment>, StoreError>;

    async fn insert(&self, row: &NewComment, access_token: &str) -> Result<Vec<Comment>, StoreError>;
}

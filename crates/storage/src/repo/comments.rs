use async_trait::async_trait;
use domain::{Comment, NewComment};
use reqwest::{RequestBuilder, Response};
use tracing::debug;

use crate::{
    backend::CommentBackend, columns::ColumnSet, error::StoreError, models::PostgrestError,
    RestStore, COMMENTS_TABLE,
};

impl RestStore {
    fn authorized(&self, req: RequestBuilder, bearer: &str) -> RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .header("Accept", "application/json")
    }
}

async fn read_rows(resp: Response) -> Result<Vec<Comment>, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<Vec<Comment>>().await?);
    }

    let text = resp.text().await.unwrap_or_default();
    let body: PostgrestError = serde_json::from_str(&text).unwrap_or_default();
    let message = if body.message.is_none() && !text.is_empty() {
        text
    } else {
        body.summary()
    };
    Err(StoreError::Rejected {
        status: status.as_u16(),
        code: body.code,
        message,
    })
}

#[async_trait]
impl CommentBackend for RestStore {
    async fn select(&self, columns: &ColumnSet) -> Result<Vec<Comment>, StoreError> {
        let select = columns.select_clause();
        debug!("Selecting comments with columns [{}]", select);

        let req = self
            .http
            .get(self.table_url(COMMENTS_TABLE))
            .query(&[("select", select.as_str()), ("order", "created_at.desc")]);
        let resp = self.authorized(req, &self.anon_key).send().await?;
        read_rows(resp).await
    }

    async fn insert(&self, row: &NewComment, access_token: &str) -> Result<Vec<Comment>, StoreError> {
        let req = self
            .http
            .post(self.table_url(COMMENTS_TABLE))
            .header("Prefer", "return=representation")
            .json(row);
        let resp = self.authorized(req, access_token).send().await?;
        read_rows(resp).await
    }
}

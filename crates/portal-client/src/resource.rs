//! Generic CRUD access to one backend resource.
//!
//! Every portal entity lives under a uniform path prefix
//! (`/departments`, `/complaints`, ...) with the same set of endpoints.
//! [`ResourceApi`] implements them once; per-resource APIs wrap it and add
//! their own endpoints through the `custom_*` helpers.

use std::fmt::Display;
use std::marker::PhantomData;

use reqwest::multipart::Form;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiResult;
use crate::pagination::PaginatedResult;
use crate::query::{build_query, query_string, Filters};
use crate::transport::{ExportedFile, Transport};

/// CRUD client for `/{resource}`.
///
/// Type parameters: entity `T`, create payload `C`, update payload `U`,
/// filter type `F`.
pub struct ResourceApi<T, C = T, U = C, F = Filters> {
    transport: Transport,
    resource: String,
    _marker: PhantomData<fn() -> (T, C, U, F)>,
}

impl<T, C, U, F> Clone for ResourceApi<T, C, U, F> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            resource: self.resource.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, C, U, F> std::fmt::Debug for ResourceApi<T, C, U, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceApi")
            .field("resource", &self.resource)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusChange {
    is_active: bool,
}

#[derive(Serialize)]
struct BulkDelete<'a, I> {
    ids: &'a [I],
}

/// `?term=..&pageNumber=..&pageSize=..`, with `term` present even when empty.
fn search_query(term: &str, page_number: u32, page_size: u32) -> String {
    let page_number = page_number.to_string();
    let page_size = page_size.to_string();
    query_string([
        ("term", term),
        ("pageNumber", page_number.as_str()),
        ("pageSize", page_size.as_str()),
    ])
}

impl<T, C, U, F> ResourceApi<T, C, U, F>
where
    T: DeserializeOwned,
    C: Serialize,
    U: Serialize,
    F: Serialize,
{
    /// API for `/{resource}`. Surrounding slashes are ignored.
    pub fn new(transport: Transport, resource: &str) -> Self {
        Self {
            transport,
            resource: resource.trim_matches('/').to_string(),
            _marker: PhantomData,
        }
    }

    /// Resource name without slashes.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Underlying transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `/{resource}` or `/{resource}/{suffix}`.
    pub fn path(&self, suffix: &str) -> String {
        let suffix = suffix.trim_start_matches('/');
        if suffix.is_empty() {
            format!("/{}", self.resource)
        } else {
            format!("/{}/{}", self.resource, suffix)
        }
    }

    /// Paginated listing: `GET /{resource}/pagination`.
    pub async fn get_all(&self, filters: &F) -> ApiResult<PaginatedResult<T>> {
        self.custom_get_with_query("pagination", filters).await
    }

    /// Unpaginated listing: `GET /{resource}`.
    pub async fn get_list(&self, filters: &F) -> ApiResult<Vec<T>> {
        self.custom_get_with_query("", filters).await
    }

    /// `GET /{resource}/{id}`.
    pub async fn get_by_id(&self, id: impl Display) -> ApiResult<T> {
        self.custom_get(&id.to_string()).await
    }

    /// `POST /{resource}`.
    pub async fn create(&self, payload: &C) -> ApiResult<T> {
        self.custom_post("", payload).await
    }

    /// `PUT /{resource}/{id}`.
    pub async fn update(&self, id: impl Display, payload: &U) -> ApiResult<T> {
        self.custom_put(&id.to_string(), payload).await
    }

    /// `PATCH /{resource}/{id}` with any subset of the update fields.
    pub async fn patch<P: Serialize + ?Sized>(&self, id: impl Display, partial: &P) -> ApiResult<T> {
        self.custom_patch(&id.to_string(), partial).await
    }

    /// `DELETE /{resource}/{id}`.
    pub async fn delete(&self, id: impl Display) -> ApiResult<()> {
        let _: IgnoredAny = self.custom_delete(&id.to_string()).await?;
        Ok(())
    }

    /// `PATCH /{resource}/{id}/status` with `{"isActive": bool}`.
    pub async fn toggle_status(&self, id: impl Display, is_active: bool) -> ApiResult<()> {
        let _: IgnoredAny = self
            .custom_patch(&format!("{}/status", id), &StatusChange { is_active })
            .await?;
        Ok(())
    }

    /// `DELETE /{resource}/bulk-delete` with `{"ids": [...]}`.
    pub async fn bulk_delete<I: Serialize>(&self, ids: &[I]) -> ApiResult<()> {
        debug!(resource = %self.resource, count = ids.len(), "Bulk delete");
        let _: IgnoredAny = self
            .transport
            .delete_with_body(&self.path("bulk-delete"), &BulkDelete { ids })
            .await?;
        Ok(())
    }

    /// `GET /{resource}/export` as a binary file.
    pub async fn export(&self, filters: &F) -> ApiResult<ExportedFile> {
        let path = format!("{}{}", self.path("export"), build_query(filters)?);
        self.transport.get_bytes(&path).await
    }

    /// `GET /{resource}/search?term=..&pageNumber=..&pageSize=..`.
    pub async fn search(
        &self,
        term: &str,
        page_number: u32,
        page_size: u32,
    ) -> ApiResult<PaginatedResult<T>> {
        let path = format!(
            "{}{}",
            self.path("search"),
            search_query(term, page_number, page_size)
        );
        self.transport.get(&path).await
    }

    /// Multipart `POST /{resource}/upload`.
    pub async fn upload_file<R: DeserializeOwned>(&self, form: Form) -> ApiResult<R> {
        self.transport.post_multipart(&self.path("upload"), form).await
    }

    /// `GET /{resource}/{suffix}`.
    pub async fn custom_get<R: DeserializeOwned>(&self, suffix: &str) -> ApiResult<R> {
        self.transport.get(&self.path(suffix)).await
    }

    /// `GET /{resource}/{suffix}?<query>`.
    pub async fn custom_get_with_query<R, Q>(&self, suffix: &str, query: &Q) -> ApiResult<R>
    where
        R: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let path = format!("{}{}", self.path(suffix), build_query(query)?);
        self.transport.get(&path).await
    }

    /// `POST /{resource}/{suffix}`.
    pub async fn custom_post<R, B>(&self, suffix: &str, body: &B) -> ApiResult<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.transport.post(&self.path(suffix), body).await
    }

    /// `PUT /{resource}/{suffix}`.
    pub async fn custom_put<R, B>(&self, suffix: &str, body: &B) -> ApiResult<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.transport.put(&self.path(suffix), body).await
    }

    /// `PATCH /{resource}/{suffix}`.
    pub async fn custom_patch<R, B>(&self, suffix: &str, body: &B) -> ApiResult<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.transport.patch(&self.path(suffix), body).await
    }

    /// `DELETE /{resource}/{suffix}`.
    pub async fn custom_delete<R: DeserializeOwned>(&self, suffix: &str) -> ApiResult<R> {
        self.transport.delete(&self.path(suffix)).await
    }
}

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::Path;
use axum::extract::rejection::PathRejection;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use tfreg_errors::Problem;

use super::dto::{ModulePath, ModuleVersionsResponseDto, ServiceDiscoveryDto, VersionPath};
use super::error::{domain_error_to_problem, path_rejection_to_problem, route_not_found};
use super::links::Links;
use crate::domain::error::DomainError;
use crate::domain::model::{ModuleCoordinate, ModuleVersion};
use crate::domain::service::RegistryService;

/// Header Terraform follows to fetch the archive bytes.
pub const X_TERRAFORM_GET: HeaderName = HeaderName::from_static("x-terraform-get");

const APPLICATION_ZIP: &str = "application/zip";
const UPLOAD_SUCCESS: &str = "Success!";

type ApiResult<T> = Result<T, Problem>;

impl ModulePath {
    fn coordinate(&self) -> Result<ModuleCoordinate, DomainError> {
        ModuleCoordinate::new(&*self.namespace, &*self.name, &*self.system)
    }
}

impl VersionPath {
    fn coordinate(&self) -> Result<(ModuleCoordinate, ModuleVersion), DomainError> {
        let module = ModuleCoordinate::new(&*self.namespace, &*self.name, &*self.system)?;
        let version = ModuleVersion::new(&*self.version)?;
        Ok((module, version))
    }
}

/// Path parameters, or a problem body when they cannot be decoded.
fn path_params<T>(path: Result<Path<T>, PathRejection>, uri: &Uri) -> ApiResult<T> {
    path.map(|Path(params)| params)
        .map_err(|rejection| path_rejection_to_problem(&rejection, uri.path()))
}

fn problem(uri: &Uri) -> impl Fn(DomainError) -> Problem + '_ {
    move |e| domain_error_to_problem(&e, uri.path())
}

/// `GET /.well-known/terraform.json`
pub async fn discovery(
    Extension(links): Extension<Arc<Links>>,
    uri: Uri,
    headers: HeaderMap,
) -> Json<ServiceDiscoveryDto> {
    Json(ServiceDiscoveryDto {
        modules_v1: links.modules_v1(&uri, &headers).into(),
    })
}

/// `GET /v1/modules/{namespace}/{name}/{system}/versions`
pub async fn list_versions(
    Extension(svc): Extension<Arc<RegistryService>>,
    path: Result<Path<ModulePath>, PathRejection>,
    uri: Uri,
) -> ApiResult<Json<ModuleVersionsResponseDto>> {
    let module = path_params(path, &uri)?
        .coordinate()
        .map_err(problem(&uri))?;
    let versions = svc.list_versions(&module).await.map_err(problem(&uri))?;
    Ok(Json(versions.into()))
}

/// `GET /v1/modules/{namespace}/{name}/{system}/{version}/download`
///
/// Answers 204 and points the client at the `file.zip` route; the archive
/// itself is never sent from here.
pub async fn download(
    Extension(svc): Extension<Arc<RegistryService>>,
    Extension(links): Extension<Arc<Links>>,
    path: Result<Path<VersionPath>, PathRejection>,
    uri: Uri,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let (module, version) = path_params(path, &uri)?
        .coordinate()
        .map_err(problem(&uri))?;
    svc.ensure_version(&module, &version)
        .await
        .map_err(problem(&uri))?;

    let location = links.archive(&uri, &headers, &module, &version);
    let location = HeaderValue::from_str(location.as_str()).map_err(|e| {
        domain_error_to_problem(&DomainError::Internal(e.to_string()), uri.path())
    })?;

    Ok((StatusCode::NO_CONTENT, [(X_TERRAFORM_GET, location)]).into_response())
}

/// `GET /v1/modules/{namespace}/{name}/{system}/{version}/file.zip`
pub async fn archive_file(
    Extension(svc): Extension<Arc<RegistryService>>,
    path: Result<Path<VersionPath>, PathRejection>,
    uri: Uri,
) -> ApiResult<Response> {
    let (module, version) = path_params(path, &uri)?
        .coordinate()
        .map_err(problem(&uri))?;
    let archive = svc
        .open_archive(&module, &version)
        .await
        .map_err(problem(&uri))?;

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static(APPLICATION_ZIP)),
            (CONTENT_LENGTH, HeaderValue::from(archive.len)),
        ],
        Body::from_stream(archive.body),
    )
        .into_response())
}

/// `POST /v1/modules/{namespace}/{name}/{system}/{version}/upload`
pub async fn upload(
    Extension(svc): Extension<Arc<RegistryService>>,
    path: Result<Path<VersionPath>, PathRejection>,
    uri: Uri,
    body: Bytes,
) -> ApiResult<&'static str> {
    let (module, version) = path_params(path, &uri)?
        .coordinate()
        .map_err(problem(&uri))?;
    svc.publish(&module, &version, body)
        .await
        .map_err(problem(&uri))?;
    Ok(UPLOAD_SUCCESS)
}

/// Fallback for unknown routes and unsupported methods.
pub async fn not_found(uri: Uri) -> Problem {
    route_not_found(uri.path())
}

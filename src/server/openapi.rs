//! OpenAPI document for the HTTP surface

use utoipa::OpenApi;

use crate::server::api;

/// Generated OpenAPI document
#[derive(OpenApi)]
#[openapi(
    paths(api::process, api::health_check, api::list_languages),
    components(schemas(
        api::ProcessRequest,
        api::ProcessResponse,
        api::HealthResponse,
        api::LanguagesResponse,
        api::PairInfo,
        api::ErrorResponse,
        api::ErrorDetail
    )),
    tags((name = "langbridge", description = "Translation and transliteration dispatcher"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/process"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));
        assert!(paths.iter().any(|p| p.as_str() == "/v1/languages"));
    }
}

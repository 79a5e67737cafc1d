use crate::routes::generate::GenerateApi;
use crate::routes::health::HealthApi;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "adgen-server",
    description = "Advertisement image generation ingestion API",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(HealthApi::openapi());
    root.merge(GenerateApi::openapi());
    root
}

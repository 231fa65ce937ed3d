//! OpenAPI documentation for the `/api` surface.
//!
//! [`ApiDoc`] collects the annotated handlers in [`crate::api::handlers`]. It is served
//! as JSON at `/api/openapi.json` and rendered with Scalar at `/api/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Security schemes accepted by the write-route gate.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("API Token")
                        .description(Some(
                            "Static API token configured in `auth.api_tokens`. Include it in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```\n\n\
                            Only routes that change state require it.",
                        ))
                        .build(),
                ),
            );
            components.security_schemes.insert(
                "ApiKeyHeader".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Api-Key"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wharf API",
        description = "File upload and download for the logistics admin dashboard"
    ),
    servers(
        (url = "/api", description = "Wharf API server")
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::files::upload_files,
        api::handlers::files::download_file,
        api::handlers::files::get_file_metadata,
        api::handlers::files::delete_file,
        api::handlers::folders::list_folders,
        api::handlers::folders::create_folder,
        api::handlers::folders::get_folder,
        api::handlers::folders::list_folder_files,
        api::handlers::users::list_users,
        api::handlers::users::create_user,
    ),
    components(
        schemas(
            api::envelope::FailureEnvelope,
            api::models::files::FileResponse,
            api::models::files::UploadResponse,
            api::models::files::FileDeleteResponse,
            api::models::folders::FolderCreate,
            api::models::folders::FolderResponse,
            api::models::users::UserCreate,
            api::models::users::UserResponse,
        )
    ),
    tags(
        (name = "files", description = "Upload, download and manage files"),
        (name = "folders", description = "Folders files are uploaded into"),
        (name = "users", description = "Owners of uploaded files"),
    )
)]
pub struct ApiDoc;

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::access_logs::{dtos as access_logs_dtos, handlers as access_logs_handlers};
use crate::features::delivery::handlers as delivery_handlers;
use crate::features::files::{
    dtos as files_dtos, handlers as files_handlers, models as files_models,
};
use crate::features::links::{
    dtos as links_dtos, handlers as links_handlers, models as links_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Delivery
        delivery_handlers::download,
        delivery_handlers::stream_page,
        // Links
        links_handlers::request_link,
        links_handlers::postback,
        links_handlers::postback_query,
        links_handlers::current_links,
        // Admin
        files_handlers::register_file,
        files_handlers::list_files,
        files_handlers::get_file,
        files_handlers::revoke_file,
        files_handlers::delete_file,
        access_logs_handlers::list_access_logs,
        links_handlers::list_link_transactions,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Links
            links_models::CallbackMethod,
            links_dtos::LinkRequestDto,
            links_dtos::PostbackDto,
            links_dtos::LinkRequestResponseDto,
            links_dtos::LinksResponseDto,
            links_dtos::PostbackResponseDto,
            links_dtos::LinkTransactionResponseDto,
            ApiResponse<links_dtos::LinkRequestResponseDto>,
            ApiResponse<links_dtos::LinksResponseDto>,
            ApiResponse<links_dtos::PostbackResponseDto>,
            ApiResponse<Vec<links_dtos::LinkTransactionResponseDto>>,
            // Files
            files_models::LinkState,
            files_dtos::RegisterFileDto,
            files_dtos::FileResponseDto,
            files_dtos::DeleteFileResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
            ApiResponse<files_dtos::DeleteFileResponseDto>,
            // Access logs
            access_logs_dtos::AccessLogResponseDto,
            ApiResponse<Vec<access_logs_dtos::AccessLogResponseDto>>,
        )
    ),
    tags(
        (name = "delivery", description = "Token-guarded file download and player page"),
        (name = "links", description = "Device binding and link issuance"),
        (name = "admin", description = "File registration and audit (basic auth)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Mediagate API",
        version = "0.1.0",
        description = "Time-limited access links for channel-hosted media files",
    )
)]
pub struct ApiDoc;

/// Adds the admin basic auth scheme to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_basic",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{LoginPayload, RegisterPayload};
use crate::models::{ClassPayload, FitnessClass, Role};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::register,
        crate::handlers::login,
        crate::handlers::list_classes,
        crate::handlers::create_class,
        crate::handlers::get_class,
        crate::handlers::update_class,
        crate::handlers::get_participants,
        crate::handlers::book_class
    ),
    components(schemas(FitnessClass, ClassPayload, Role, RegisterPayload, LoginPayload)),
    tags(
        (name = "auth", description = "Authentication operations"),
        (name = "classes", description = "Fitness class management and booking"),
        (name = "health", description = "Liveness and readiness probes")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Service API",
        version = "1.0.0",
        description = "CRUD endpoints for schema-free user documents stored in MongoDB, plus a profile endpoint that forwards the stored `role` to an external REST API.\n\nUser ids are 24-character hexadecimal MongoDB ObjectIds. Every error body is `{\"error\": \"...\"}`."
    ),
    paths(
        // Health
        crate::api::health::root,
        crate::api::health::health_check,

        // Users
        crate::api::users::create_user,
        crate::api::users::get_all_users,
        crate::api::users::get_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,
        crate::api::users::get_user_profile,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::models::CreateUserResponse,
            crate::models::UsersResponse,
            crate::models::ResultResponse,
            crate::models::ProfileResponse,
            crate::models::ExternalResult,
            crate::utils::ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness endpoints."),
        (name = "Users", description = "User documents and the external profile lookup."),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in ["/", "/health", "/user", "/user/all/", "/user/{id}", "/user/{id}/profile"] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {} in {:?}",
                expected,
                paths
            );
        }
    }
}

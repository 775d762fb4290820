use actix_web::{delete, get, post, put, web, HttpResponse};
use crate::models::{
    document_from_body, document_to_json, parse_user_id, role_of, CreateUserResponse,
    ProfileResponse, ResultResponse, UsersResponse,
};
use crate::services::{ProfileClient, UserRepository};
use crate::utils::AppError;

/// Registers the user routes. `/user/all/` goes before `/user/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_user)
        .service(get_all_users)
        .service(get_user_profile)
        .service(get_user)
        .service(update_user)
        .service(delete_user);
}

/// POST /user - Stores any non-empty JSON object
#[utoipa::path(
    post,
    path = "/user",
    tag = "Users",
    request_body(
        content = Object,
        content_type = "application/json",
        description = "Any non-empty JSON object; a client `_id` is ignored"
    ),
    responses(
        (status = 201, description = "User stored", body = CreateUserResponse),
        (status = 400, description = "Missing or malformed body", body = crate::utils::ErrorResponse)
    )
)]
#[post("/user")]
pub async fn create_user(
    repo: web::Data<dyn UserRepository>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let document = document_from_body(&body)?;

    log::info!("📝 POST /user - {} fields", document.len());

    let id = repo.create(document).await?;

    log::info!("✅ User created: {}", id);

    Ok(HttpResponse::Created().json(CreateUserResponse {
        result: "success".to_string(),
        document_id: id.to_hex(),
    }))
}

/// GET /user/{id} - Stored document with `_id` as hex string
#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "24-character hex user id")),
    responses(
        (status = 200, description = "Stored user document"),
        (status = 400, description = "Invalid ID format", body = crate::utils::ErrorResponse),
        (status = 404, description = "User not found", body = crate::utils::ErrorResponse)
    )
)]
#[get("/user/{id}")]
pub async fn get_user(
    repo: web::Data<dyn UserRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_user_id(&path)?;

    log::info!("🔍 GET /user/{}", id);

    let document = repo.find_one(id).await?.ok_or(AppError::UserNotFound)?;

    Ok(HttpResponse::Ok().json(document_to_json(document)))
}

/// GET /user/all/ - Every stored user, possibly none
#[utoipa::path(
    get,
    path = "/user/all/",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = UsersResponse)
    )
)]
#[get("/user/all/")]
pub async fn get_all_users(repo: web::Data<dyn UserRepository>) -> Result<HttpResponse, AppError> {
    let users: Vec<_> = repo
        .find_all()
        .await?
        .into_iter()
        .map(document_to_json)
        .collect();

    log::info!("📋 GET /user/all/ - {} users", users.len());

    Ok(HttpResponse::Ok().json(UsersResponse { users }))
}

/// PUT /user/{id} - Merge-patch: present fields overwrite, absent fields stay
#[utoipa::path(
    put,
    path = "/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "24-character hex user id")),
    request_body(
        content = Object,
        content_type = "application/json",
        description = "Fields to overwrite; absent fields are left untouched"
    ),
    responses(
        (status = 200, description = "User matched and updated", body = ResultResponse),
        (status = 400, description = "Missing body or invalid ID format", body = crate::utils::ErrorResponse),
        (status = 404, description = "User not found", body = crate::utils::ErrorResponse)
    )
)]
#[put("/user/{id}")]
pub async fn update_user(
    repo: web::Data<dyn UserRepository>,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    // Body is checked before the id so an empty update never reaches the store
    let patch = document_from_body(&body).map_err(|e| match e {
        AppError::MissingData => AppError::DataNotProvided,
        other => other,
    })?;
    let id = parse_user_id(&path)?;

    log::info!("🔧 PUT /user/{} - {} fields", id, patch.len());

    // matched, not modified: rewriting identical values is still a success
    if repo.update(id, patch).await? == 0 {
        return Err(AppError::UserNotFound);
    }

    Ok(HttpResponse::Ok().json(ResultResponse {
        result: "Success updating user data".to_string(),
    }))
}

/// DELETE /user/{id} - Permanent removal
#[utoipa::path(
    delete,
    path = "/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "24-character hex user id")),
    responses(
        (status = 200, description = "User deleted", body = ResultResponse),
        (status = 400, description = "Invalid ID format", body = crate::utils::ErrorResponse),
        (status = 404, description = "User not found", body = crate::utils::ErrorResponse)
    )
)]
#[delete("/user/{id}")]
pub async fn delete_user(
    repo: web::Data<dyn UserRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_user_id(&path)?;

    log::info!("🗑️  DELETE /user/{}", id);

    if repo.delete(id).await? == 0 {
        return Err(AppError::UserNotFound);
    }

    Ok(HttpResponse::Ok().json(ResultResponse {
        result: "Success at deleting the user".to_string(),
    }))
}

/// GET /user/{id}/profile - Forwards the stored role to the external profile API
#[utoipa::path(
    get,
    path = "/user/{id}/profile",
    tag = "Users",
    params(("id" = String, Path, description = "24-character hex user id")),
    responses(
        (status = 200, description = "External API answered", body = ProfileResponse),
        (status = 400, description = "Invalid ID format", body = crate::utils::ErrorResponse),
        (status = 404, description = "User not found", body = crate::utils::ErrorResponse),
        (status = 422, description = "User has no role", body = crate::utils::ErrorResponse),
        (status = 500, description = "External API unreachable", body = crate::utils::ErrorResponse)
    )
)]
#[get("/user/{id}/profile")]
pub async fn get_user_profile(
    repo: web::Data<dyn UserRepository>,
    profiles: web::Data<ProfileClient>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_user_id(&path)?;

    log::info!("👤 GET /user/{}/profile", id);

    let document = repo.find_one(id).await?.ok_or(AppError::UserNotFound)?;
    let role = role_of(&document)?;

    let external_api_response = profiles.fetch(role).await?;

    log::info!("✅ Profile fetched for role '{}'", role);

    Ok(HttpResponse::Ok().json(ProfileResponse {
        status: "success".to_string(),
        external_api_response,
    }))
}

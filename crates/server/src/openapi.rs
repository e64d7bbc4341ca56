use utoipa::OpenApi;

use crate::routes::attributes::AttributeRequest;
use crate::routes::recipes::RecipeRequest;
use crate::routes::user::{ProfileRequest, RegisterRequest, TokenRequest, TokenResponse, UserResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::user::create_user,
        crate::routes::user::create_token,
        crate::routes::user::me,
        crate::routes::user::update_me,
        crate::routes::attributes::list_tags,
        crate::routes::attributes::create_tag,
        crate::routes::attributes::list_ingredients,
        crate::routes::attributes::create_ingredient,
        crate::routes::recipes::list,
        crate::routes::recipes::create,
        crate::routes::recipes::retrieve,
        crate::routes::recipes::replace,
        crate::routes::recipes::partial_update,
        crate::routes::recipes::destroy,
        crate::routes::recipes::upload_image,
    ),
    components(
        schemas(
            RegisterRequest,
            TokenRequest,
            ProfileRequest,
            UserResponse,
            TokenResponse,
            AttributeRequest,
            RecipeRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "user"),
        (name = "recipe")
    )
)]
pub struct ApiDoc;

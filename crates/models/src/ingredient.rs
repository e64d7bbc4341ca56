use sea_orm::{entity::prelude::*, sea_query::Query, ConnectionTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{self, ModelError};
use crate::{recipe, recipe_ingredient, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingredient")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Uuid,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    RecipeIngredient,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::RecipeIngredient => Entity::has_many(recipe_ingredient::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<recipe::Entity> for Entity {
    fn to() -> RelationDef { recipe_ingredient::Relation::Recipe.def() }

    fn via() -> Option<RelationDef> { Some(recipe_ingredient::Relation::Ingredient.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

pub const MAX_NAME_LEN: usize = 255;

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    errors::validate_text("name", name, MAX_NAME_LEN)
}

pub async fn create<C: ConnectionTrait>(db: &C, user_id: Uuid, name: &str) -> Result<Model, ModelError> {
    validate_name(name)?;
    let am = ActiveModel {
        user_id: Set(user_id),
        name: Set(name.trim().to_string()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

/// The user's ingredients, name descending. With `assigned_only` only those
/// linked to at least one recipe are returned, each once.
pub async fn list_for_user<C: ConnectionTrait>(db: &C, user_id: Uuid, assigned_only: bool) -> Result<Vec<Model>, ModelError> {
    let mut query = Entity::find().filter(Column::UserId.eq(user_id));
    if assigned_only {
        query = query.filter(
            Column::Id.in_subquery(
                Query::select()
                    .column(recipe_ingredient::Column::IngredientId)
                    .from(recipe_ingredient::Entity)
                    .to_owned(),
            ),
        );
    }
    Ok(query.order_by_desc(Column::Name).order_by_desc(Column::Id).all(db).await?)
}

/// The subset of `ids` that exists and belongs to `user_id`.
pub async fn find_owned<C: ConnectionTrait>(db: &C, user_id: Uuid, ids: &[i32]) -> Result<Vec<Model>, ModelError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Id.is_in(ids.to_vec()))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

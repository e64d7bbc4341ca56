use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{recipe, tag};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe_tag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub recipe_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Recipe,
    Tag,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Recipe => Entity::belongs_to(recipe::Entity)
                .from(Column::RecipeId)
                .to(recipe::Column::Id)
                .into(),
            Relation::Tag => Entity::belongs_to(tag::Entity)
                .from(Column::TagId)
                .to(tag::Column::Id)
                .into(),
        }
    }
}

impl Related<recipe::Entity> for Entity {
    fn to() -> RelationDef { Relation::Recipe.def() }
}

impl Related<tag::Entity> for Entity {
    fn to() -> RelationDef { Relation::Tag.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Make `tag_ids` the complete tag set of the recipe.
pub async fn replace_for_recipe<C: ConnectionTrait>(db: &C, recipe_id: i32, tag_ids: &[i32]) -> Result<(), ModelError> {
    Entity::delete_many()
        .filter(Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    if tag_ids.is_empty() {
        return Ok(());
    }
    let rows = tag_ids.iter().map(|id| ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(*id),
    });
    Entity::insert_many(rows).exec_without_returning(db).await?;
    Ok(())
}

/// Link rows for the given recipes, ordered by recipe then tag id.
pub async fn for_recipes<C: ConnectionTrait>(db: &C, recipe_ids: &[i32]) -> Result<Vec<Model>, ModelError> {
    if recipe_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Entity::find()
        .filter(Column::RecipeId.is_in(recipe_ids.to_vec()))
        .order_by_asc(Column::RecipeId)
        .order_by_asc(Column::TagId)
        .all(db)
        .await?)
}

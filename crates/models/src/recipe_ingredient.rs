use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{recipe, ingredient};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe_ingredient")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub recipe_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub ingredient_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Recipe,
    Ingredient,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Recipe => Entity::belongs_to(recipe::Entity)
                .from(Column::RecipeId)
                .to(recipe::Column::Id)
                .into(),
            Relation::Ingredient => Entity::belongs_to(ingredient::Entity)
                .from(Column::IngredientId)
                .to(ingredient::Column::Id)
                .into(),
        }
    }
}

impl Related<recipe::Entity> for Entity {
    fn to() -> RelationDef { Relation::Recipe.def() }
}

impl Related<ingredient::Entity> for Entity {
    fn to() -> RelationDef { Relation::Ingredient.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Make `ingredient_ids` the complete ingredient set of the recipe.
pub async fn replace_for_recipe<C: ConnectionTrait>(db: &C, recipe_id: i32, ingredient_ids: &[i32]) -> Result<(), ModelError> {
    Entity::delete_many()
        .filter(Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    if ingredient_ids.is_empty() {
        return Ok(());
    }
    let rows = ingredient_ids.iter().map(|id| ActiveModel {
        recipe_id: Set(recipe_id),
        ingredient_id: Set(*id),
    });
    Entity::insert_many(rows).exec_without_returning(db).await?;
    Ok(())
}

/// Link rows for the given recipes, ordered by recipe then ingredient id.
pub async fn for_recipes<C: ConnectionTrait>(db: &C, recipe_ids: &[i32]) -> Result<Vec<Model>, ModelError> {
    if recipe_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Entity::find()
        .filter(Column::RecipeId.is_in(recipe_ids.to_vec()))
        .order_by_asc(Column::RecipeId)
        .order_by_asc(Column::IngredientId)
        .all(db)
        .await?)
}

use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{self, ModelError};
use crate::{ingredient, recipe_ingredient, recipe_tag, tag, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    /// Path relative to the media root.
    pub image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    RecipeTag,
    RecipeIngredient,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::RecipeTag => Entity::has_many(recipe_tag::Entity).into(),
            Relation::RecipeIngredient => Entity::has_many(recipe_ingredient::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<tag::Entity> for Entity {
    fn to() -> RelationDef { recipe_tag::Relation::Tag.def() }

    fn via() -> Option<RelationDef> { Some(recipe_tag::Relation::Recipe.def().rev()) }
}

impl Related<ingredient::Entity> for Entity {
    fn to() -> RelationDef { recipe_ingredient::Relation::Ingredient.def() }

    fn via() -> Option<RelationDef> { Some(recipe_ingredient::Relation::Recipe.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

pub const MAX_TITLE_LEN: usize = 255;
pub const PRICE_SCALE: u32 = 2;

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    errors::validate_text("title", title, MAX_TITLE_LEN)
}

pub fn validate_time_minutes(minutes: i32) -> Result<(), ModelError> {
    if minutes < 0 {
        return Err(ModelError::invalid("time_minutes", "Ensure this value is greater than or equal to 0."));
    }
    Ok(())
}

/// `decimal(5, 2)`: non-negative, below 1000, at most two decimal places.
pub fn validate_price(price: Decimal) -> Result<(), ModelError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ModelError::invalid("price", "Ensure this value is greater than or equal to 0."));
    }
    if price >= Decimal::ONE_THOUSAND {
        return Err(ModelError::invalid("price", "Ensure that there are no more than 3 digits before the decimal point."));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(ModelError::invalid("price", "Ensure that there are no more than 2 decimal places."));
    }
    Ok(())
}

/// Price with exactly two decimal places, whatever scale the backend returned.
pub fn display_price(price: Decimal) -> Decimal {
    let mut price = price.round_dp(PRICE_SCALE);
    price.rescale(PRICE_SCALE);
    price
}

/// Field values for a new recipe row.
#[derive(Clone, Debug)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
}

impl NewRecipe {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_title(&self.title)?;
        validate_time_minutes(self.time_minutes)?;
        validate_price(self.price)
    }
}

pub async fn create<C: ConnectionTrait>(db: &C, user_id: Uuid, input: &NewRecipe) -> Result<Model, ModelError> {
    input.validate()?;
    let now = Utc::now().into();
    let am = ActiveModel {
        user_id: Set(user_id),
        title: Set(input.title.trim().to_string()),
        time_minutes: Set(input.time_minutes),
        price: Set(display_price(input.price)),
        image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

/// Owner-scoped lookup; another user's recipe is indistinguishable from a missing one.
pub async fn find_owned<C: ConnectionTrait>(db: &C, user_id: Uuid, id: i32) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id)
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

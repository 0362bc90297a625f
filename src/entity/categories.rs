use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What kind of merchandise a category holds. Decides whether its products
/// track stock per size or through a single counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    #[sea_orm(string_value = "polera")]
    Polera,
    #[sea_orm(string_value = "pantalon")]
    Pantalon,
    #[sea_orm(string_value = "accesorio")]
    Accesorio,
    #[sea_orm(string_value = "otro")]
    Otro,
}

impl CategoryKind {
    pub fn is_sized(self) -> bool {
        matches!(self, CategoryKind::Polera | CategoryKind::Pantalon)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub kind: CategoryKind,
    pub description: String,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::products::Entity")]
    Products,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

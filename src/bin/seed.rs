use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    ActiveValue::NotSet, sea_query::Expr,
};
use tienda_online::{
    db::{create_orm_conn, run_migrations},
    entity::{
        categories::{self, CategoryKind, Column as CatCol, Entity as Categories},
        product_images,
        products::{self, Column as ProdCol, Entity as Products},
        stock_sizes::{Column as StockCol, Entity as StockSizes, Size},
    },
    services::stock_service::ensure_size_rows,
    slug::slugify,
};

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
    featured: bool,
    sizes: [i32; 4],
    accessory_stock: i32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let poleras = ensure_category(&orm, "Poleras", CategoryKind::Polera, 1).await?;
    let pantalones = ensure_category(&orm, "Pantalones", CategoryKind::Pantalon, 2).await?;
    let accesorios = ensure_category(&orm, "Accesorios", CategoryKind::Accesorio, 3).await?;

    let catalog = [
        (
            poleras.clone(),
            SeedProduct {
                name: "Polera Básica Blanca",
                description: "Polera de algodón peinado, corte recto",
                price: 9990,
                featured: true,
                sizes: [4, 10, 6, 0],
                accessory_stock: 0,
            },
        ),
        (
            poleras,
            SeedProduct {
                name: "Polera Estampada Cordillera",
                description: "Estampado frontal, algodón orgánico",
                price: 14990,
                featured: true,
                sizes: [0, 3, 2, 1],
                accessory_stock: 0,
            },
        ),
        (
            pantalones,
            SeedProduct {
                name: "Pantalón Cargo Verde",
                description: "Pantalón cargo con seis bolsillos",
                price: 24990,
                featured: false,
                sizes: [2, 5, 5, 2],
                accessory_stock: 0,
            },
        ),
        (
            accesorios,
            SeedProduct {
                name: "Gorro de Lana",
                description: "Gorro tejido a mano",
                price: 7990,
                featured: true,
                sizes: [0; 4],
                accessory_stock: 12,
            },
        ),
    ];

    for (category, seed) in catalog {
        seed_product(&orm, category, seed).await?;
    }

    println!("Seed completed");
    Ok(())
}

async fn ensure_category(
    orm: &DatabaseConnection,
    name: &str,
    kind: CategoryKind,
    display_order: i32,
) -> anyhow::Result<categories::Model> {
    if let Some(existing) = Categories::find()
        .filter(CatCol::Name.eq(name))
        .one(orm)
        .await?
    {
        return Ok(existing);
    }
    let category = categories::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        kind: Set(kind),
        description: Set(String::new()),
        is_active: Set(true),
        display_order: Set(display_order),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;
    Ok(category)
}

async fn seed_product(
    orm: &DatabaseConnection,
    category: categories::Model,
    seed: SeedProduct,
) -> anyhow::Result<()> {
    let slug = slugify(seed.name);
    if Products::find()
        .filter(ProdCol::Slug.eq(slug.as_str()))
        .one(orm)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let now = Utc::now();
    let product = products::ActiveModel {
        id: NotSet,
        name: Set(seed.name.to_string()),
        slug: Set(slug.clone()),
        description: Set(seed.description.to_string()),
        price: Set(seed.price),
        category_id: Set(category.id),
        is_active: Set(true),
        is_featured: Set(seed.featured),
        pants_type: Set((category.kind == CategoryKind::Pantalon).then(|| "cargo".to_string())),
        material: Set((category.kind == CategoryKind::Accesorio).then(|| "lana".to_string())),
        dimensions: Set(None),
        accessory_stock: Set(seed.accessory_stock),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(orm)
    .await?;

    if category.kind.is_sized() {
        ensure_size_rows(orm, product.id).await?;
        for (size, quantity) in Size::ALL.into_iter().zip(seed.sizes) {
            StockSizes::update_many()
                .col_expr(StockCol::Quantity, Expr::value(quantity))
                .filter(StockCol::ProductId.eq(product.id))
                .filter(StockCol::Size.eq(size))
                .exec(orm)
                .await?;
        }
    }

    product_images::ActiveModel {
        id: NotSet,
        product_id: Set(product.id),
        url: Set(format!("/media/productos/{slug}.jpg")),
        display_order: Set(0),
        is_primary: Set(true),
        created_at: Set(now.into()),
    }
    .insert(orm)
    .await?;

    Ok(())
}

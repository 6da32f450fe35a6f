use std::collections::HashMap;

use electro_storefront::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    gateway::{DbGateway, Gateway, NewCategory, NewProduct, ProductFilter},
    identity::{LocalAuth, Registration},
    models::Role,
    store::fallback,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(config.require_database()?).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;
    let gateway = DbGateway::new(orm);
    let auth = LocalAuth::new(gateway.clone(), &config.jwt_secret, config.jwt_ttl_hours);

    let admin_id =
        ensure_account(&gateway, &auth, "admin@example.com", "admin123", Role::Admin).await?;
    let staff_id =
        ensure_account(&gateway, &auth, "staff@example.com", "staff123", Role::Staff).await?;
    let user_id = ensure_account(&gateway, &auth, "user@example.com", "user123", Role::User).await?;
    seed_catalog(&gateway).await?;

    println!("Seed completed. Admin ID: {admin_id}, Staff ID: {staff_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_account(
    gateway: &DbGateway,
    auth: &LocalAuth<DbGateway>,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let profile = match gateway.credentials_by_email(email).await? {
        Some(stored) => stored.profile,
        None => {
            auth.register(Registration {
                email: email.to_string(),
                full_name: String::new(),
                password: password.to_string(),
                confirm_password: password.to_string(),
            })
            .await?
        }
    };
    if profile.role != role {
        gateway.set_role(profile.id, role).await?;
    }

    println!("Ensured user {email} (role={role})");
    Ok(profile.id)
}

async fn seed_catalog(gateway: &DbGateway) -> anyhow::Result<()> {
    let mut stored_ids: HashMap<Uuid, Uuid> = HashMap::new();
    for sample in fallback::sample_categories() {
        let stored = match gateway.category_by_slug(&sample.slug).await? {
            Some(category) => category,
            None => {
                gateway
                    .insert_category(NewCategory {
                        name: sample.name,
                        slug: sample.slug,
                        description: sample.description,
                        image_url: sample.image_url,
                    })
                    .await?
            }
        };
        stored_ids.insert(sample.id, stored.id);
    }

    let existing = gateway.list_products(&ProductFilter::default()).await?;
    let mut inserted = 0;
    for sample in fallback::sample_products() {
        if existing.iter().any(|p| p.name == sample.name) {
            continue;
        }
        gateway
            .insert_product(NewProduct {
                name: sample.name,
                description: sample.description,
                price: sample.price,
                category_id: sample.category_id.and_then(|id| stored_ids.get(&id).copied()),
                image_url: sample.image_url,
                specifications: sample.specifications,
                stock: sample.stock,
                featured: sample.featured,
            })
            .await?;
        inserted += 1;
    }

    println!("Seeded catalog ({inserted} new products)");
    Ok(())
}

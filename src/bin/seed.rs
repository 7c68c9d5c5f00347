use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_restaurant_api::{config::AppConfig, db::create_pool};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let _admin_id = ensure_user(&pool, "admin@example.com", "admin123", "admin").await?;
    let owner_id = ensure_user(&pool, "owner@example.com", "owner123", "owner").await?;
    let _customer_id = ensure_user(&pool, "customer@example.com", "customer123", "customer").await?;

    let restaurant_id = ensure_restaurant(&pool, owner_id, "Ferris Diner").await?;
    seed_tables(&pool, restaurant_id).await?;
    seed_catalog(&pool, restaurant_id).await?;

    println!("Seed completed. Owner ID: {owner_id}, Restaurant ID: {restaurant_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_restaurant(
    pool: &sqlx::PgPool,
    owner_id: Uuid,
    name: &str,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM restaurants WHERE owner_id = $1 AND name = $2")
            .bind(owner_id)
            .bind(name)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO restaurants (id, owner_id, name, description, address, phone)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .bind(name)
    .bind("Rustic food, quickly served")
    .bind("1 Crab Street")
    .bind("555-0100")
    .execute(pool)
    .await?;

    println!("Seeded restaurant {name}");
    Ok(id)
}

async fn seed_tables(pool: &sqlx::PgPool, restaurant_id: Uuid) -> anyhow::Result<()> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tables WHERE restaurant_id = $1")
        .bind(restaurant_id)
        .fetch_one(pool)
        .await?;
    if count.0 > 0 {
        return Ok(());
    }

    for (name, seats) in [("Table 1", 4), ("Table 2", 2), ("Patio 1", 6)] {
        sqlx::query(
            "INSERT INTO tables (id, restaurant_id, name, seats, token) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(restaurant_id)
        .bind(name)
        .bind(seats)
        .bind(Uuid::new_v4())
        .execute(pool)
        .await?;
    }

    println!("Seeded tables");
    Ok(())
}

async fn seed_catalog(pool: &sqlx::PgPool, restaurant_id: Uuid) -> anyhow::Result<()> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM menus WHERE restaurant_id = $1")
        .bind(restaurant_id)
        .fetch_one(pool)
        .await?;
    if count.0 > 0 {
        return Ok(());
    }

    let menu_id = Uuid::new_v4();
    sqlx::query("INSERT INTO menus (id, restaurant_id, name, description) VALUES ($1, $2, $3, $4)")
        .bind(menu_id)
        .bind(restaurant_id)
        .bind("All Day")
        .bind("Served from open to close")
        .execute(pool)
        .await?;

    let categories = [
        ("Starters", 0, vec![("Garlic Bread", "4.50"), ("Soup of the Day", "6.00")]),
        ("Mains", 1, vec![("Crab Linguine", "18.50"), ("Margherita Pizza", "12.00")]),
        ("Drinks", 2, vec![("Espresso", "3.00"), ("House Lemonade", "5.00")]),
    ];

    for (name, position, items) in categories {
        let category_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO categories (id, menu_id, name, position) VALUES ($1, $2, $3, $4)",
        )
        .bind(category_id)
        .bind(menu_id)
        .bind(name)
        .bind(position)
        .execute(pool)
        .await?;

        for (item_name, price) in items {
            sqlx::query(
                "INSERT INTO menu_items (id, category_id, name, price) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(category_id)
            .bind(item_name)
            .bind(price.parse::<Decimal>()?)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded menu");
    Ok(())
}

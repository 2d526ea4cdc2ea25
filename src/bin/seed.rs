use movie_store::{
    config::database_url,
    db::{create_pool, orm_from_pool, run_migrations},
    models::{ROLE_ADMIN, ROLE_USER},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let pool = create_pool(&database_url()?).await?;
    // Ensure migrations are applied.
    run_migrations(&orm_from_pool(&pool)).await?;

    let admin_id = ensure_user(&pool, "movieStoreAdmin", "adminpassword", ROLE_ADMIN).await?;
    let user_id = ensure_user(&pool, "moviefan", "moviefan123", ROLE_USER).await?;
    seed_movies(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {username} (role={role})");
    Ok(user_id)
}

async fn seed_movies(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        println!("Movies already present, skipping");
        return Ok(());
    }

    let movies = vec![
        ("The Matrix", "A hacker learns the truth about his reality.", 1000),
        ("The Matrix Reloaded", "Neo and the rebels fight on.", 900),
        ("Spirited Away", "A girl wanders into a world of spirits.", 1200),
        ("Heat", "A detective hunts a crew of professional thieves.", 500),
    ];

    for (title, description, price) in movies {
        sqlx::query(
            r#"
            INSERT INTO movies (id, title, description, price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .bind(price as i64)
        .execute(pool)
        .await?;
    }

    println!("Seeded movies");
    Ok(())
}

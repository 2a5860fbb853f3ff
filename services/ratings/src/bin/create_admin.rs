//! Seeds an administrator account. Admins cannot sign up through the API, so the
//! first one has to come from here.

use clap::Parser;
use sea_orm::Database;
use tracing::info;

use storerate_core::tracing::init_tracing;
use storerate_domain::user::UserRole;
use storerate_ratings::infra::db::{DbStoreRepository, DbUserRepository};
use storerate_ratings::infra::password::Argon2Passwords;
use storerate_ratings::usecase::user::{CreateUserInput, CreateUserUseCase};

#[derive(Parser, Debug)]
#[command(name = "create-admin", about = "Create an admin account")]
struct Args {
    /// Display name, 20-60 characters.
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// 8-16 characters with an uppercase letter and a special character.
    #[arg(long)]
    password: String,
    #[arg(long)]
    address: String,
    /// Falls back to the `DATABASE_URL` environment variable.
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();

    let database_url = args
        .database_url
        .unwrap_or_else(|| std::env::var("DATABASE_URL").expect("DATABASE_URL"));
    let db = Database::connect(&database_url)
        .await
        .expect("failed to connect to database");

    let usecase = CreateUserUseCase {
        users: DbUserRepository { db: db.clone() },
        stores: DbStoreRepository { db },
        passwords: Argon2Passwords,
    };
    let admin = usecase
        .execute(CreateUserInput {
            name: args.name,
            email: args.email,
            password: args.password,
            address: args.address,
            role: UserRole::Admin,
            store_id: None,
        })
        .await
        .expect("failed to create admin");

    info!(user_id = %admin.id, email = %admin.email, "admin seeded");
}

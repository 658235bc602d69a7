//! Account creation command handler

use anyhow::Context;
use std::io::{self, BufRead, Write};

use crate::config::Config;
use crate::db::Store;
use crate::domain::Role;
use crate::models::user::NewUser;
use crate::services::{SeaOrmUserService, UserService};

pub async fn cmd_create_user(
    config: &Config,
    username: &str,
    email: &str,
    password: Option<String>,
    admin: bool,
) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_password()?,
    };

    let store = Store::new(&config.general.database_path).await?;
    let users = SeaOrmUserService::new(store, config.security.clone());

    let role = if admin { Role::Admin } else { Role::User };
    let user = users
        .register(NewUser {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password,
            role,
        })
        .await?;

    println!("✓ Created {} account '{}' (ID: {})", user.role, user.username, user.id);
    Ok(())
}

fn read_password() -> anyhow::Result<String> {
    print!("Password: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

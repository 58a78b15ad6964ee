use std::path::PathBuf;

use anyhow::Context;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::server;

pub fn hash_password(password: &str, cost: u32, output_format: OutputFormat) -> anyhow::Result<()> {
    let hash = bcrypt::hash(password, cost).context("failed to hash password")?;
    match output_format {
        OutputFormat::Json => println!("{}", json!({ "password_hash": hash, "cost": cost })),
        OutputFormat::Text => println!("{}", hash),
    }
    Ok(())
}

pub fn list(file: Option<PathBuf>, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if file.is_some() {
        config.security.users_file = file;
    }
    let directory = server::load_users(&config)?;

    let mut users: Vec<_> = directory
        .records()
        .map(|r| (r.username.clone(), r.roles.clone()))
        .collect();
    users.sort();

    match output_format {
        OutputFormat::Json => {
            let entries: Vec<_> = users
                .iter()
                .map(|(username, roles)| json!({ "username": username, "roles": roles }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            for (username, roles) in users {
                println!("{:<24} {}", username, roles.join(","));
            }
        }
    }
    Ok(())
}

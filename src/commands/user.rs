use owo_colors::OwoColorize;

use super::{Workspace, print_json};
use crate::display::user_table;
use crate::entity::UserDraft;
use crate::error::{BugHiveError, Result};
use crate::form::FieldErrors;

pub async fn cmd_user_ls(output_json: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let users = ws.users().await?;

    if output_json {
        return print_json(&users);
    }
    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }
    println!("{}", user_table(&users));
    Ok(())
}

pub async fn cmd_user_create(
    name: &str,
    email: Option<String>,
    role: Option<String>,
    output_json: bool,
) -> Result<()> {
    if name.trim().is_empty() {
        let mut errors = FieldErrors::default();
        errors.insert("name", "Name is required");
        return Err(BugHiveError::Validation(errors));
    }

    let ws = Workspace::open()?;
    let user = ws
        .services
        .users
        .create(UserDraft {
            name: name.trim().to_string(),
            email: email.unwrap_or_default(),
            role: role.unwrap_or_default(),
            avatar: None,
        })
        .await?;
    ws.persist()?;

    if output_json {
        return print_json(&user);
    }
    println!("{} user {} ({})", "Created".green(), user.name, user.id.cyan());
    Ok(())
}

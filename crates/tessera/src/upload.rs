//! Ownership and naming rules for managing stored badges.
//!
//! Owners may only modify their own scope; the default scope is read-only through this
//! module. A name is unique across the owner's scope and the default scope, so a lookup never
//! has to choose between two badges with the same name.

use crate::{BadgeConfig, BadgeStore, Error, Result, clip_id_for};

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidName {
        message: message.into(),
    }
}

/// Checks that `owner` names a writable scope.
pub fn check_owner<'a>(config: &BadgeConfig, owner: &'a str) -> Result<&'a str> {
    let owner = owner.trim();
    if owner.is_empty() {
        return Err(invalid("an owner is required"));
    }
    if config.is_default_scope(owner) {
        return Err(invalid("the default badges cannot be modified"));
    }
    check_path_segment(owner, "owner")?;
    Ok(owner)
}

/// Checks that `name` can be used as a stored badge name.
pub fn check_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("a badge name is required"));
    }
    if name.contains(',') {
        return Err(invalid(format!("\"{name}\" must not contain ','")));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid(format!("\"{name}\" must not contain whitespace")));
    }
    check_path_segment(name, "badge name")?;
    Ok(name)
}

// Scopes and names become `<scope>/<name>.svg` in file-backed stores.
fn check_path_segment(value: &str, what: &str) -> Result<()> {
    if value.starts_with('.') || value.contains(['/', '\\']) || value.contains('\0') {
        return Err(invalid(format!("{what} \"{value}\" is not a valid path segment")));
    }
    Ok(())
}

fn check_available(
    store: &dyn BadgeStore,
    config: &BadgeConfig,
    owner: &str,
    name: &str,
) -> Result<()> {
    if store.contains(&config.default_scope, name)? {
        return Err(Error::NameTaken {
            scope: config.default_scope.clone(),
            name: name.to_string(),
        });
    }
    if store.contains(owner, name)? {
        return Err(Error::NameTaken {
            scope: owner.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Runs every check an upload must pass before the image is normalized.
pub fn check_new_badge(
    store: &dyn BadgeStore,
    config: &BadgeConfig,
    owner: &str,
    name: &str,
) -> Result<()> {
    let owner = check_owner(config, owner)?;
    let name = check_name(name)?;
    check_available(store, config, owner, name)
}

/// Renames one of `owner`'s badges, rewriting its clip path identifier to match.
pub fn rename(
    store: &dyn BadgeStore,
    config: &BadgeConfig,
    owner: &str,
    old_name: &str,
    new_name: &str,
) -> Result<()> {
    let owner = check_owner(config, owner)?;
    let old_name = old_name.trim();
    if old_name.is_empty() {
        return Err(invalid("the current badge name is required"));
    }
    let new_name = check_name(new_name)?;
    check_available(store, config, owner, new_name)?;

    let Some(stored) = store.fetch(owner, old_name)? else {
        return Err(Error::FragmentNotFound {
            name: old_name.to_string(),
        });
    };
    let markup = String::from_utf8(stored.bytes).map_err(|e| Error::MalformedMarkup {
        message: format!("badge \"{old_name}\" is not valid UTF-8: {e}"),
    })?;

    let old_clip = clip_id_for(old_name);
    let new_clip = clip_id_for(new_name);
    let markup = markup
        .replace(&format!("id=\"{old_clip}\""), &format!("id=\"{new_clip}\""))
        .replace(&format!("url(#{old_clip})"), &format!("url(#{new_clip})"));

    store.put(owner, new_name, &markup)?;
    store.remove(owner, old_name)?;
    tracing::info!(owner, from = old_name, to = new_name, "renamed badge");
    Ok(())
}

pub fn delete(store: &dyn BadgeStore, config: &BadgeConfig, owner: &str, name: &str) -> Result<()> {
    let owner = check_owner(config, owner)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("a badge name is required"));
    }
    if !store.remove(owner, name)? {
        return Err(Error::FragmentNotFound {
            name: name.to_string(),
        });
    }
    tracing::info!(owner, name, "deleted badge");
    Ok(())
}

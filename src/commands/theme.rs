use serde_json::json;

use super::print_json;
use crate::config::Config;
use crate::error::Result;
use crate::preferences::{Theme, ThemeStore};

fn store() -> Result<(ThemeStore, Option<Theme>)> {
    let config = Config::load()?;
    Ok((ThemeStore::from_config(&config)?, config.default_theme))
}

fn report(theme: Theme, store: &ThemeStore, output_json: bool) -> Result<()> {
    if output_json {
        return print_json(&json!({
            "theme": theme,
            "stored": store.stored(),
            "path": store.path().display().to_string(),
        }));
    }
    println!("{}", theme);
    Ok(())
}

/// Print the effective theme
pub fn cmd_theme_show(output_json: bool) -> Result<()> {
    let (store, fallback) = store()?;
    report(store.load(fallback), &store, output_json)
}

pub fn cmd_theme_toggle(output_json: bool) -> Result<()> {
    let (store, fallback) = store()?;
    let theme = store.toggle(fallback)?;
    report(theme, &store, output_json)
}

pub fn cmd_theme_set(theme: Theme, output_json: bool) -> Result<()> {
    let (store, _) = store()?;
    store.save(theme)?;
    report(theme, &store, output_json)
}

use anyhow::Result;

use daybook::config::DaybookConfig;
use daybook::summary;
use daybook::time;

/// Print a daily (or weekly) digest in the terminal, as text or JSON.
pub fn summary(config: &DaybookConfig, date: Option<&str>, weekly: bool, json: bool) -> Result<()> {
    let (db, diary) = daybook::server::setup_shared_state(config)?;
    let today = time::today();

    let digest = if weekly {
        summary::weekly(&db, &diary, today)
    } else {
        let date = time::parse_date_or(date, today)?;
        summary::daily(&db, &diary, date, today)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&digest)?);
    } else {
        println!("{}", digest.render());
    }
    Ok(())
}

use crate::cmd::load_engine;
use crate::output::print_json;
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

pub fn run(data_dir: &Path, user: Option<Uuid>, json: bool) -> anyhow::Result<()> {
    let (_, engine) = load_engine(data_dir)?;
    let user_id = user.unwrap_or_else(Uuid::new_v4);
    let now = Utc::now();
    let progress = engine.enroll(user_id, now.date_naive(), now)?;

    if json {
        return print_json(&progress);
    }

    println!("Enrolled: {user_id}");
    println!("Stage:    {}", progress.current_stage);
    println!("Since:    {}", progress.stage_start_date);
    Ok(())
}

//! Instructor Hub
//!
//! Operator entry point: checks Strapi connectivity and prints a user's
//! groups or invitations.

use anyhow::{bail, Context};
use tracing::{info, warn};

use instructor_hub::{
    config::Settings,
    utils::{helpers::format_relative_time, logging},
    EntityRef, ServiceFactory,
};

const USAGE: &str = "usage: instructor-hub [health | groups <user> | invitations <user> | sent <user>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}", instructor_hub::info());

    let services = ServiceFactory::new(settings)?;

    let health = services.health_check().await;
    for issue in health.get_issues() {
        warn!(issue = %issue, "Service health issue");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("health") => {
            println!("strapi: {}", if health.strapi_healthy { "ok" } else { "unreachable" });
            println!("interactions: {}", if health.interactions_enabled { "enabled" } else { "disabled" });
        }
        Some("groups") => {
            let user = user_arg(&args)?;
            let groups = services.group_service.list_user_groups(&user).await?;
            let check = services.capacity_service.check_group_limit(&user).await?;
            println!("groups: {}", check.summary());
            for group in groups {
                println!("  {} ({}) members={}", group.name, group.document_id, group.instructors.len());
            }
        }
        Some("invitations") => {
            let user = user_arg(&args)?;
            for invitation in services.invitation_service.list_received(&user).await? {
                let when = invitation.invited_at.map(format_relative_time).unwrap_or_default();
                let marker = if invitation.read { " " } else { "*" };
                println!("{} {} {} {}", marker, invitation.document_id, invitation.invitation_status, when);
            }
        }
        Some("sent") => {
            let user = user_arg(&args)?;
            for invitation in services.invitation_service.list_sent(&user).await? {
                let when = invitation.invited_at.map(format_relative_time).unwrap_or_default();
                println!("  {} {} {}", invitation.document_id, invitation.invitation_status, when);
            }
        }
        Some(other) => bail!("unknown command '{}'\n{}", other, USAGE),
    }

    Ok(())
}

fn user_arg(args: &[String]) -> anyhow::Result<EntityRef> {
    let raw = args.get(1).with_context(|| USAGE.to_string())?;
    Ok(EntityRef::parse(raw)?)
}

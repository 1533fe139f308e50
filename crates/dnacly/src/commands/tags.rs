//! Tag command handlers.

use tabled::Tabled;

use dnacly_core::Session;
use dnacly_core::models::{Tag, TagMember};

use crate::cli::{GlobalOpts, TagsArgs, TagsCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn tag_row(t: &Tag) -> TagRow {
    TagRow {
        name: t.name.clone(),
        description: or_dash(t.description.as_deref()),
        id: t.id.clone(),
    }
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Mgmt IP")]
    ip: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn member_row(m: &TagMember) -> MemberRow {
    MemberRow {
        hostname: or_dash(m.hostname.as_deref()),
        ip: or_dash(m.management_ip_address.as_deref()),
        id: m.instance_uuid.clone(),
    }
}

async fn tag_named(session: &Session, name: &str) -> Result<Tag, CliError> {
    session
        .client()
        .find_tag(name)
        .await?
        .ok_or_else(|| CliError::NotFound {
            resource_type: "tag".into(),
            identifier: name.into(),
            list_command: "tags list".into(),
        })
}

pub async fn handle(session: &Session, args: TagsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = session.client();
    match args.command {
        TagsCommand::List => {
            let tags = client.list_tags().await?;
            let out = output::render_list(&global.output, &tags, tag_row, |t| t.name.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TagsCommand::Create { name } => {
            let handle = client.create_tag(&name).await?;
            if !global.quiet {
                eprintln!("Tag '{name}' submitted (task {})", handle.task_id);
            }
            Ok(())
        }

        TagsCommand::Members { name } => {
            let tag = tag_named(session, &name).await?;
            let members = client.tag_members(&tag.id).await?;
            let out = output::render_list(&global.output, &members, member_row, |m| {
                m.instance_uuid.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TagsCommand::AddMember { name, device_ids } => {
            let tag = tag_named(session, &name).await?;
            let handle = client.add_tag_members(&tag.id, &device_ids).await?;
            if !global.quiet {
                eprintln!(
                    "{} device(s) added to '{name}' (task {})",
                    device_ids.len(),
                    handle.task_id
                );
            }
            Ok(())
        }
    }
}

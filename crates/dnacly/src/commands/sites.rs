//! Site command handlers.

use tabled::Tabled;

use dnacly_core::Session;
use dnacly_core::models::Site;
use dnacly_core::sites::{ClaimableSite, claimable_sites};

use crate::cli::{GlobalOpts, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "Hierarchy")]
    hierarchy: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn site_row(s: &Site) -> SiteRow {
    let kind = s.location_types().collect::<Vec<_>>().join(", ");
    SiteRow {
        hierarchy: if s.site_name_hierarchy.is_empty() {
            or_dash(s.name.as_deref())
        } else {
            s.site_name_hierarchy.clone()
        },
        kind: if kind.is_empty() { "-".into() } else { kind },
        id: s.id.clone(),
    }
}

#[derive(Tabled)]
struct ClaimableRow {
    #[tabled(rename = "Hierarchy")]
    hierarchy: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn claimable_row(s: &ClaimableSite) -> ClaimableRow {
    ClaimableRow {
        hierarchy: s.hierarchy.clone(),
        id: s.id.clone(),
    }
}

pub async fn handle(session: &Session, args: SitesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SitesCommand::List { claimable } => {
            let sites = session.client().list_sites().await?;
            let out = if claimable {
                let sites = claimable_sites(&sites);
                output::render_list(&global.output, &sites, claimable_row, |s| s.id.clone())?
            } else {
                output::render_list(&global.output, &sites, site_row, |s| s.id.clone())?
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

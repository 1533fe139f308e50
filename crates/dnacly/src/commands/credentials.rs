//! Global credential listing.

use std::str::FromStr;

use serde::Serialize;
use tabled::Tabled;

use dnacly_core::models::GlobalCredential;
use dnacly_core::{CredentialSubtype, Session};

use crate::cli::{CredentialsArgs, CredentialsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, or_dash};

/// A credential tagged with the subtype it was listed under.
#[derive(Debug, Serialize)]
struct SubtypedCredential {
    subtype: String,
    #[serde(flatten)]
    credential: GlobalCredential,
}

#[derive(Tabled)]
struct CredentialRow {
    #[tabled(rename = "Subtype")]
    subtype: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn credential_row(c: &SubtypedCredential) -> CredentialRow {
    CredentialRow {
        subtype: c.subtype.clone(),
        description: or_dash(c.credential.description.as_deref()),
        username: or_dash(c.credential.username.as_deref()),
        id: c.credential.id.clone(),
    }
}

fn parse_subtypes(raw: &[String]) -> Result<Vec<CredentialSubtype>, CliError> {
    raw.iter()
        .map(|s| {
            CredentialSubtype::from_str(s).map_err(|_| CliError::Validation {
                field: "subtype".into(),
                reason: format!(
                    "unknown credential subtype '{s}' (expected CLI, SNMPV2_READ_COMMUNITY, \
                     SNMPV2_WRITE_COMMUNITY, SNMPV3, HTTP_READ, HTTP_WRITE or NETCONF)"
                ),
            })
        })
        .collect()
}

pub async fn handle(
    session: &Session,
    args: CredentialsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CredentialsCommand::List { subtypes } => {
            let mut all = Vec::new();
            for subtype in parse_subtypes(&subtypes)? {
                let creds = session.client().global_credentials(subtype).await?;
                all.extend(creds.into_iter().map(|credential| SubtypedCredential {
                    subtype: subtype.to_string(),
                    credential,
                }));
            }
            let out = output::render_list(&global.output, &all, credential_row, |c| {
                c.credential.id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtypes_parse_case_insensitively() {
        let parsed = parse_subtypes(&["cli".into(), "SNMPV3".into()]).expect("valid");
        assert_eq!(parsed, vec![CredentialSubtype::Cli, CredentialSubtype::Snmpv3]);
    }

    #[test]
    fn unknown_subtype_is_a_usage_error() {
        let err = parse_subtypes(&["TELNET".into()]).expect_err("invalid");
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "subtype"));
    }
}

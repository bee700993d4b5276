// src/extract.rs
//! Best-effort field extraction from spawn notification embeds.
//!
//! Nothing in here fails loudly: a missing field means "no spawn", an
//! unreadable player count means [`UNKNOWN_PLAYERS`].

use crate::gateway::types::Embed;
use crate::model::{Spawn, UNKNOWN_PLAYERS};

pub const JOB_ID_LABEL: &str = "Job ID";
pub const SERVER_INFO_LABEL: &str = "Server Information";
pub const PLAYERS_MARKER: &str = "Players:";

/// Pull the player count out of a "Server Information" blob.
///
/// `"Players: 7/12 | Region: US"` -> `"7/12"`. Anything unparseable -> `"Unknown"`.
pub fn parse_occupancy(server_info: &str) -> String {
    server_info
        .split(PLAYERS_MARKER)
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or(UNKNOWN_PLAYERS)
        .to_string()
}

/// Scan the embed's fields for a job id and server info.
///
/// Returns `None` unless both are present and non-empty after trimming.
pub fn extract_spawn(embed: &Embed) -> Option<Spawn> {
    let mut job_id: Option<&str> = None;
    let mut server_info: Option<&str> = None;

    for field in &embed.fields {
        if field.name.contains(JOB_ID_LABEL) {
            job_id = Some(field.value.trim());
        } else if field.name.contains(SERVER_INFO_LABEL) {
            server_info = Some(field.value.trim());
        }
    }

    let job_id = job_id.filter(|s| !s.is_empty())?;
    let server_info = server_info.filter(|s| !s.is_empty())?;

    Some(Spawn {
        job_id: job_id.to_string(),
        players: parse_occupancy(server_info),
        server_info: server_info.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::EmbedField;

    fn embed(fields: &[(&str, &str)]) -> Embed {
        Embed {
            title: None,
            fields: fields
                .iter()
                .map(|(n, v)| EmbedField {
                    name: n.to_string(),
                    value: v.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn occupancy_takes_first_token_after_marker() {
        assert_eq!(parse_occupancy("Players: 7/12 | Region: US"), "7/12");
        assert_eq!(parse_occupancy("Region: EU\nPlayers:   12/12"), "12/12");
    }

    #[test]
    fn occupancy_falls_back_to_unknown() {
        assert_eq!(parse_occupancy("Region: US"), "Unknown");
        assert_eq!(parse_occupancy("Players:"), "Unknown");
        assert_eq!(parse_occupancy("Players:    "), "Unknown");
        assert_eq!(parse_occupancy(""), "Unknown");
    }

    #[test]
    fn occupancy_stops_at_next_marker() {
        // text between the first and second marker is empty
        assert_eq!(parse_occupancy("Players:Players: 3/12"), "Unknown");
    }

    #[test]
    fn extracts_trimmed_fields_by_label_substring() {
        let e = embed(&[
            ("🆔 Job ID (PC)", "  abc-123 \n"),
            ("📊 Server Information", " Players: 3/12 | Sea: 3 "),
        ]);
        let spawn = extract_spawn(&e).expect("spawn");
        assert_eq!(spawn.job_id, "abc-123");
        assert_eq!(spawn.players, "3/12");
        assert_eq!(spawn.server_info, "Players: 3/12 | Sea: 3");
    }

    #[test]
    fn missing_or_blank_fields_yield_nothing() {
        assert!(extract_spawn(&embed(&[("Job ID", "x")])).is_none());
        assert!(extract_spawn(&embed(&[("Server Information", "Players: 1/2")])).is_none());
        assert!(extract_spawn(&embed(&[("Job ID", "   "), ("Server Information", "y")])).is_none());
        assert!(extract_spawn(&embed(&[])).is_none());
    }

    #[test]
    fn server_info_without_marker_is_unknown_players() {
        let e = embed(&[("Job ID", "j"), ("Server Information", "Region: US")]);
        assert_eq!(extract_spawn(&e).unwrap().players, "Unknown");
    }

    #[test]
    fn later_field_overrides_earlier_match() {
        let e = embed(&[
            ("Job ID", "first"),
            ("Server Information", "Players: 1/12"),
            ("Job ID (Mobile)", "second"),
        ]);
        assert_eq!(extract_spawn(&e).unwrap().job_id, "second");
    }
}

//! Parsing of raw status replies into the row table shown to the user.
//!
//! A reply carries backslash-delimited metadata pairs, a `\\` boundary,
//! then `score ping name` player triples separated by backslashes:
//!
//! ```text
//! \sv_hostname\Vega Core\mapname\atcs\clients\2\\5 48 Alice\0 112 Bob
//! ```
//!
//! Metadata rows leave the score and ping columns empty; a row with a
//! non-empty ping column is player data. Well-known metadata keys are
//! pulled to the top of the table in a fixed order, everything else is
//! sorted by key.

use shared::MAX_STATUS_ROWS;

/// Well-known metadata keys in display order, with optional display
/// aliases. Unlisted keys follow these, sorted lexicographically.
const STATUS_FIELDS: &[(&str, &str)] = &[
    ("sv_hostname", "Name"),
    ("Address", ""),
    ("gamename", "Game name"),
    ("mapname", "Map"),
    ("version", ""),
    ("protocol", ""),
    ("timelimit", ""),
];

/// One row of the status table: metadata (`label`/`value`) or a player
/// line (`label` is the player's index, `value` the name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub label: String,
    pub score: String,
    pub ping: String,
    pub value: String,
}

impl StatusRow {
    fn meta(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            score: String::new(),
            ping: String::new(),
            value: value.to_string(),
        }
    }
}

/// Fully parsed status of one host, rebuilt on every successful poll.
#[derive(Debug, Clone, Default)]
pub struct ServerStatusInfo {
    pub address: String,
    pub rows: Vec<StatusRow>,
    pub text: String,
}

/// Decodes `text` into the capped row table. Malformed input terminates
/// parsing at the last good row rather than failing.
pub fn parse(address: &str, text: &str) -> ServerStatusInfo {
    let mut rows = Vec::new();
    rows.push(StatusRow::meta("Address", address));

    let mut rest = text;

    // metadata section
    loop {
        let bs = match rest.find('\\') {
            Some(i) => i,
            None => {
                rest = "";
                break;
            }
        };
        rest = &rest[bs + 1..];

        // a doubled backslash ends the metadata section
        if rest.starts_with('\\') {
            rest = &rest[1..];
            break;
        }

        let key_end = match rest.find('\\') {
            Some(i) => i,
            None => {
                rest = "";
                break;
            }
        };
        let key = &rest[..key_end];
        rest = &rest[key_end + 1..];

        let value_end = rest.find('\\').unwrap_or(rest.len());
        rows.push(StatusRow::meta(key, &rest[..value_end]));
        rest = &rest[value_end..];

        if rows.len() >= MAX_STATUS_ROWS {
            rest = "";
            break;
        }
    }

    reorder_metadata(&mut rows);

    // player section, if enough of the table is left for it
    if rows.len() < MAX_STATUS_ROWS - 3 {
        rows.push(StatusRow::meta("", ""));
        rows.push(StatusRow {
            label: "num".to_string(),
            score: "score".to_string(),
            ping: "ping".to_string(),
            value: "name".to_string(),
        });

        let mut index = 0;
        while !rest.is_empty() && rows.len() < MAX_STATUS_ROWS {
            if let Some(stripped) = rest.strip_prefix('\\') {
                rest = stripped;
            }

            let score_end = match rest.find(' ') {
                Some(i) => i,
                None => break,
            };
            let score = &rest[..score_end];
            rest = &rest[score_end + 1..];

            let ping_end = match rest.find(' ') {
                Some(i) => i,
                None => break,
            };
            let ping = &rest[..ping_end];
            rest = &rest[ping_end + 1..];

            let name_end = rest.find('\\').unwrap_or(rest.len());
            let name = &rest[..name_end];
            rest = &rest[name_end..];

            rows.push(StatusRow {
                label: index.to_string(),
                score: score.to_string(),
                ping: ping.to_string(),
                value: name.to_string(),
            });
            index += 1;
        }
    }

    ServerStatusInfo {
        address: address.to_string(),
        rows,
        text: text.to_string(),
    }
}

/// Moves the well-known keys to the front in table order, applying their
/// aliases, then sorts the remaining metadata rows by key. Only rows with
/// an empty score column take part; player rows never exist yet when this
/// runs.
fn reorder_metadata(rows: &mut [StatusRow]) {
    let mut index = 0;

    for (name, alias) in STATUS_FIELDS {
        for j in index..rows.len() {
            if !rows[j].score.is_empty() {
                continue;
            }
            if rows[j].label.eq_ignore_ascii_case(name) {
                rows.swap(index, j);
                if !alias.is_empty() {
                    rows[index].label = alias.to_string();
                }
                index += 1;
            }
        }
    }

    rows[index..].sort_by(|a, b| a.label.cmp(&b.label));
}

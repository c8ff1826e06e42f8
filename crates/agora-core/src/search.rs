//! Case-insensitive substring search over everything the caller can read.

use agora_types::api::MessageView;

use crate::Messaging;
use crate::error::{MessagingError, Result};
use crate::messages::view;

/// Queries must be shorter than this many characters.
pub const MAX_QUERY_CHARS: usize = 1000;

fn check_query(query: &str) -> Result<()> {
    let len = query.chars().count();
    if len == 0 {
        return Err(MessagingError::invalid("query string is empty"));
    }
    if len >= MAX_QUERY_CHARS {
        return Err(MessagingError::invalid(
            "query string must be shorter than 1000 characters",
        ));
    }
    Ok(())
}

impl Messaging {
    /// Messages containing `query`, ignoring case, from every channel and
    /// then every DM the caller belongs to. Each container contributes its
    /// messages newest first.
    pub fn search(&self, token: &str, query: &str) -> Result<Vec<MessageView>> {
        self.read_as(token, |ws, caller| {
            check_query(query)?;
            let needle = query.to_lowercase();

            Ok(ws
                .containers()
                .filter(|c| c.is_member(caller))
                .flat_map(|c| c.messages())
                .filter(|m| m.text.to_lowercase().contains(&needle))
                .map(|m| view(m, caller))
                .collect())
        })
    }
}

//! Logical document locations for one game's scoring data.

use std::fmt;

use crate::state::game::TeamSide;

/// Path of a single document, segments separated by `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath(String);

/// Path of an ordered collection of documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl DocumentPath {
    /// Wrap a raw path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Borrow the raw path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CollectionPath {
    /// Wrap a raw path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Borrow the raw path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the member document identified by `id`.
    pub fn document(&self, id: &str) -> DocumentPath {
        DocumentPath(format!("{}/{}", self.0, id))
    }

    /// Prefix shared by every member document path.
    pub fn member_prefix(&self) -> String {
        format!("{}/", self.0)
    }

    /// True when `path` is a direct member of this collection.
    pub fn contains(&self, path: &str) -> bool {
        path.strip_prefix(&self.member_prefix())
            .is_some_and(|id| !id.is_empty() && !id.contains('/'))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Live scoring state of a game.
pub fn game_state(game_id: &str) -> DocumentPath {
    DocumentPath(format!("games/{game_id}/scoring/gameState"))
}

/// Play-by-play log of a game.
pub fn plays(game_id: &str) -> CollectionPath {
    CollectionPath(format!("games/{game_id}/plays"))
}

/// Lineup of one side of a game.
pub fn roster(game_id: &str, side: TeamSide) -> DocumentPath {
    DocumentPath(format!("games/{game_id}/roster/{}", side.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_paths_are_scoped_by_game() {
        assert_eq!(game_state("g1").as_str(), "games/g1/scoring/gameState");
        assert_eq!(plays("g1").as_str(), "games/g1/plays");
        assert_eq!(roster("g1", TeamSide::Away).as_str(), "games/g1/roster/away");
    }

    #[test]
    fn collection_membership_is_direct_only() {
        let plays = plays("g1");
        assert!(plays.contains("games/g1/plays/abc"));
        assert!(!plays.contains("games/g1/plays/"));
        assert!(!plays.contains("games/g1/plays/abc/nested"));
        assert!(!plays.contains("games/g10/plays/abc"));
        assert_eq!(plays.document("abc").as_str(), "games/g1/plays/abc");
    }
}

use std::cmp::Ordering;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::schema::quals_matches;

/// Ranking points awarded to the winner of a qualification match.
pub const WIN_RP: i32 = 3;
/// Ranking points awarded to each side on a tie.
pub const TIE_RP: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = quals_matches)]
pub struct QualsMatch {
    pub id: i32,
    pub red_player_id: i32,
    pub blue_player_id: i32,
    pub red_auto_score: i32,
    pub blue_auto_score: i32,
    pub red_teleop_score: i32,
    pub blue_teleop_score: i32,
    pub red_endgame_score: i32,
    pub blue_endgame_score: i32,
    pub red_score: i32,
    pub blue_score: i32,
    pub red_win_rp: i32,
    pub blue_win_rp: i32,
    pub red_bonus_rp: i32,
    pub blue_bonus_rp: i32,
}

/// A scheduled pairing of two matchmaker ids, before any scores exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Insertable, Deserialize, ToSchema)]
#[diesel(table_name = quals_matches)]
pub struct NewQualsMatch {
    pub red_player_id: i32,
    pub blue_player_id: i32,
}

/// Scores entered for a qualification match.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ScoreSheet {
    pub red_player_id: i32,
    pub blue_player_id: i32,
    pub red_auto_score: i32,
    pub blue_auto_score: i32,
    pub red_teleop_score: i32,
    pub blue_teleop_score: i32,
    pub red_endgame_score: i32,
    pub blue_endgame_score: i32,
    pub red_bonus_rp: i32,
    pub blue_bonus_rp: i32,
}

/// Fully derived column values written back for a scored match.
#[derive(Debug, Clone, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = quals_matches)]
pub struct MatchResult {
    pub red_player_id: i32,
    pub blue_player_id: i32,
    pub red_auto_score: i32,
    pub blue_auto_score: i32,
    pub red_teleop_score: i32,
    pub blue_teleop_score: i32,
    pub red_endgame_score: i32,
    pub blue_endgame_score: i32,
    pub red_score: i32,
    pub blue_score: i32,
    pub red_win_rp: i32,
    pub blue_win_rp: i32,
    pub red_bonus_rp: i32,
    pub blue_bonus_rp: i32,
}

impl ScoreSheet {
    /// Derive totals and win RP: 3/0 for a decided match, 1/1 for a tie.
    pub fn into_result(self) -> MatchResult {
        let red_score = self.red_auto_score + self.red_teleop_score + self.red_endgame_score;
        let blue_score = self.blue_auto_score + self.blue_teleop_score + self.blue_endgame_score;
        let (red_win_rp, blue_win_rp) = match red_score.cmp(&blue_score) {
            Ordering::Greater => (WIN_RP, 0),
            Ordering::Less => (0, WIN_RP),
            Ordering::Equal => (TIE_RP, TIE_RP),
        };

        MatchResult {
            red_player_id: self.red_player_id,
            blue_player_id: self.blue_player_id,
            red_auto_score: self.red_auto_score,
            blue_auto_score: self.blue_auto_score,
            red_teleop_score: self.red_teleop_score,
            blue_teleop_score: self.blue_teleop_score,
            red_endgame_score: self.red_endgame_score,
            blue_endgame_score: self.blue_endgame_score,
            red_score,
            blue_score,
            red_win_rp,
            blue_win_rp,
            red_bonus_rp: self.red_bonus_rp,
            blue_bonus_rp: self.blue_bonus_rp,
        }
    }
}

impl QualsMatch {
    /// Apply a derived result to this row in place.
    pub fn apply(&mut self, result: &MatchResult) {
        self.red_player_id = result.red_player_id;
        self.blue_player_id = result.blue_player_id;
        self.red_auto_score = result.red_auto_score;
        self.blue_auto_score = result.blue_auto_score;
        self.red_teleop_score = result.red_teleop_score;
        self.blue_teleop_score = result.blue_teleop_score;
        self.red_endgame_score = result.red_endgame_score;
        self.blue_endgame_score = result.blue_endgame_score;
        self.red_score = result.red_score;
        self.blue_score = result.blue_score;
        self.red_win_rp = result.red_win_rp;
        self.blue_win_rp = result.blue_win_rp;
        self.red_bonus_rp = result.red_bonus_rp;
        self.blue_bonus_rp = result.blue_bonus_rp;
    }

    /// An unscored match between two matchmaker ids.
    pub fn scheduled(id: i32, red_player_id: i32, blue_player_id: i32) -> Self {
        Self {
            id,
            red_player_id,
            blue_player_id,
            red_auto_score: 0,
            blue_auto_score: 0,
            red_teleop_score: 0,
            blue_teleop_score: 0,
            red_endgame_score: 0,
            blue_endgame_score: 0,
            red_score: 0,
            blue_score: 0,
            red_win_rp: 0,
            blue_win_rp: 0,
            red_bonus_rp: 0,
            blue_bonus_rp: 0,
        }
    }
}

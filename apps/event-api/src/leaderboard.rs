//! Qualification standings computed from persisted match rows.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::participant::Participant;
use crate::models::quals_match::QualsMatch;

/// One ranked row of the leaderboard, as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub id: i32,
    pub display_name: String,
    /// 1-based position after sorting.
    pub rank: u32,
    pub total_rp: i32,
    pub win_rp: i32,
    pub bonus_rp: i32,
    pub total_points: i32,
    pub auto_points: i32,
    pub teleop_points: i32,
    pub endgame_points: i32,
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    win_rp: i32,
    bonus_rp: i32,
    auto: i32,
    teleop: i32,
    endgame: i32,
}

impl Tally {
    /// Win RP counts only for a strict win; bonus and points always count.
    fn add_side(&mut self, m: &QualsMatch, red: bool) {
        let (ours, theirs) = if red {
            (m.red_score, m.blue_score)
        } else {
            (m.blue_score, m.red_score)
        };
        if ours > theirs {
            self.win_rp += if red { m.red_win_rp } else { m.blue_win_rp };
        }
        if red {
            self.bonus_rp += m.red_bonus_rp;
            self.auto += m.red_auto_score;
            self.teleop += m.red_teleop_score;
            self.endgame += m.red_endgame_score;
        } else {
            self.bonus_rp += m.blue_bonus_rp;
            self.auto += m.blue_auto_score;
            self.teleop += m.blue_teleop_score;
            self.endgame += m.blue_endgame_score;
        }
    }
}

/// Rank every participant by total ranking points.
///
/// Stable sort by `total_rp` descending; ties go to the lower participant id.
pub fn rank(participants: &[Participant], matches: &[QualsMatch]) -> Vec<LeaderboardEntry> {
    let mut tallies: HashMap<i32, Tally> = HashMap::new();
    for m in matches {
        tallies.entry(m.red_player_id).or_default().add_side(m, true);
        if m.blue_player_id != m.red_player_id {
            tallies.entry(m.blue_player_id).or_default().add_side(m, false);
        }
    }

    let mut rows: Vec<LeaderboardEntry> = participants
        .iter()
        .map(|p| {
            let t = tallies.get(&p.mm_id).copied().unwrap_or_default();
            LeaderboardEntry {
                id: p.id,
                display_name: p.display_name().to_string(),
                rank: 0,
                total_rp: t.win_rp + t.bonus_rp,
                win_rp: t.win_rp,
                bonus_rp: t.bonus_rp,
                total_points: t.auto + t.teleop + t.endgame,
                auto_points: t.auto,
                teleop_points: t.teleop,
                endgame_points: t.endgame,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.total_rp.cmp(&a.total_rp).then(a.id.cmp(&b.id)));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as u32 + 1;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: i32, name: &str) -> Participant {
        Participant {
            id,
            username: name.to_string(),
            preferred_username: None,
            mm_id: id * 10,
        }
    }

    fn played(id: i32, red: i32, blue: i32, red_score: i32, blue_score: i32) -> QualsMatch {
        let mut m = QualsMatch::scheduled(id, red, blue);
        m.red_auto_score = red_score;
        m.blue_auto_score = blue_score;
        m.red_score = red_score;
        m.blue_score = blue_score;
        match red_score.cmp(&blue_score) {
            std::cmp::Ordering::Greater => m.red_win_rp = 3,
            std::cmp::Ordering::Less => m.blue_win_rp = 3,
            std::cmp::Ordering::Equal => {
                m.red_win_rp = 1;
                m.blue_win_rp = 1;
            }
        }
        m
    }

    #[test]
    fn ranks_by_total_rp_descending() {
        let participants = vec![participant(1, "a"), participant(2, "b"), participant(3, "c")];
        let mut m1 = played(1, 10, 20, 5, 30);
        m1.red_bonus_rp = 1;
        let m2 = played(2, 30, 20, 50, 10);
        let rows = rank(&participants, &[m1, m2]);

        let order: Vec<&str> = rows.iter().map(|r| r.display_name.as_str()).collect();
        // b: 3 win RP, c: 3 win RP, a: 1 bonus RP. b and c tie → lower id first.
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(rows.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(rows[0].total_rp, 3);
        assert_eq!(rows[0].total_points, 40);
        assert_eq!(rows[2].bonus_rp, 1);
    }

    #[test]
    fn equal_scores_break_ties_by_participant_id() {
        let participants = vec![participant(9, "late"), participant(4, "early")];
        let rows = rank(&participants, &[]);
        assert_eq!(rows[0].id, 4);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].id, 9);
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn tied_match_awards_no_win_rp() {
        let participants = vec![participant(1, "a"), participant(2, "b")];
        let rows = rank(&participants, &[played(1, 10, 20, 7, 7)]);
        assert!(rows.iter().all(|r| r.win_rp == 0));
        assert!(rows.iter().all(|r| r.auto_points == 7));
    }

    #[test]
    fn participant_without_matches_has_zero_totals() {
        let rows = rank(&[participant(1, "solo")], &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_rp, 0);
        assert_eq!(rows[0].total_points, 0);
    }
}

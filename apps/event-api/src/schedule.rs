//! Plain-text qualification schedule import.
//!
//! One line per round, whitespace separated. Fields 2 and 4 hold the red and
//! blue matchmaker ids of the round's first match, fields 6 and 8 those of
//! the second; the remaining fields are labels and are ignored:
//!
//! ```text
//! 1  101  vs  102  |  103  vs  104
//! ```
//!
//! Blank lines and lines with fewer than eight fields are skipped.

use crate::error::FieldError;
use crate::models::quals_match::NewQualsMatch;

/// Fields a line needs before it is treated as a round.
pub const FIELDS_PER_LINE: usize = 8;

/// (red, blue) field positions of each match within a line.
const PAIRINGS: [(usize, usize); 2] = [(1, 3), (5, 7)];

/// Parse a schedule into pairings, in file order.
///
/// Every id that is not an integer is reported, each with its line number.
pub fn parse_schedule(text: &str) -> Result<Vec<NewQualsMatch>, Vec<FieldError>> {
    let mut pairings = Vec::new();
    let mut errors = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < FIELDS_PER_LINE {
            continue;
        }

        for (red, blue) in PAIRINGS {
            let red = parse_id(fields[red], index + 1, &mut errors);
            let blue = parse_id(fields[blue], index + 1, &mut errors);
            if let (Some(red_player_id), Some(blue_player_id)) = (red, blue) {
                pairings.push(NewQualsMatch {
                    red_player_id,
                    blue_player_id,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(pairings)
    } else {
        Err(errors)
    }
}

fn parse_id(field: &str, line: usize, errors: &mut Vec<FieldError>) -> Option<i32> {
    match field.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(FieldError {
                field: "schedule".to_string(),
                message: format!("line {line}: '{field}' is not a matchmaker id"),
            });
            None
        }
    }
}
